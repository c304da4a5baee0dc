//! The language model provider trait and response helpers.
//!
//! Implemented by the `solquiz-providers` crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for LLM backends that answer assessment and question prompts.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Send one prompt and return the model's reply.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List available models for this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request sent to an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gpt-4o-mini").
    pub model: String,
    /// The user prompt.
    pub prompt: String,
    /// Optional system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Ask the backend to constrain output to a JSON object when it can.
    #[serde(default)]
    pub json_mode: bool,
}

/// Response from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw response content.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub estimated_cost_usd: f64,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
        self.estimated_cost_usd += other.estimated_cost_usd;
    }
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
    /// Cost per 1K input tokens in USD.
    pub cost_per_1k_input: f64,
    /// Cost per 1K output tokens in USD.
    pub cost_per_1k_output: f64,
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

/// Pull the JSON object out of an LLM reply.
///
/// Handles:
/// - a ```json fenced block (preferred over other fences)
/// - a generic ``` fenced block
/// - prose around a bare object (the outermost `{ ... }` span is taken)
/// - a bare object (returned as-is)
pub fn extract_json_object(response: &str) -> String {
    let mut json_blocks = Vec::new();
    let mut generic_blocks = Vec::new();
    let mut in_block = false;
    let mut is_json_block = false;
    let mut is_generic_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            is_generic_block = lang.is_empty();
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block {
                json_blocks.push(current_block.clone());
            } else if is_generic_block {
                generic_blocks.push(current_block.clone());
            }
            current_block.clear();
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    // Truncated (unclosed) fence: keep what was collected
    if in_block && !current_block.is_empty() {
        if is_json_block {
            json_blocks.push(current_block);
        } else if is_generic_block {
            generic_blocks.push(current_block);
        }
    }

    let candidate = json_blocks
        .into_iter()
        .next()
        .or_else(|| generic_blocks.into_iter().next())
        .unwrap_or_else(|| response.to_string());

    outermost_object(&candidate)
        .map(str::to_string)
        .unwrap_or_else(|| candidate.trim().to_string())
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object_is_returned() {
        let input = r#"{"feasibility": "feasible"}"#;
        assert_eq!(extract_json_object(input), input);
    }

    #[test]
    fn json_fence_is_unwrapped() {
        let input = "Here you go:\n\n```json\n{\"a\": 1}\n```\n\nEnjoy!";
        assert_eq!(extract_json_object(input), "{\"a\": 1}");
    }

    #[test]
    fn json_fence_preferred_over_generic() {
        let input = "```\n{\"generic\": true}\n```\n\n```json\n{\"specific\": true}\n```";
        assert_eq!(extract_json_object(input), "{\"specific\": true}");
    }

    #[test]
    fn prose_around_object_is_stripped() {
        let input = "Sure! {\"question_text\": \"Q\"} Hope that helps.";
        assert_eq!(extract_json_object(input), "{\"question_text\": \"Q\"}");
    }

    #[test]
    fn truncated_fence_is_kept() {
        let input = "```json\n{\"a\": 1}";
        assert_eq!(extract_json_object(input), "{\"a\": 1}");
    }

    #[test]
    fn no_object_returns_trimmed_text() {
        assert_eq!(extract_json_object("  sorry, I can't  "), "sorry, I can't");
    }

    #[test]
    fn token_usage_accumulates() {
        let mut total = TokenUsage::default();
        total.add(&TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
            estimated_cost_usd: 0.5,
        });
        total.add(&TokenUsage {
            prompt_tokens: 1,
            completion_tokens: 1,
            total_tokens: 2,
            estimated_cost_usd: 0.25,
        });
        assert_eq!(total.total_tokens, 17);
        assert!((total.estimated_cost_usd - 0.75).abs() < f64::EPSILON);
    }
}
