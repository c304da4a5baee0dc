//! Feasibility assessment and question generation against an LLM provider.
//!
//! Provider calls are awaited one at a time. Transient provider errors are
//! retried with exponential backoff; a failed question is recorded on its
//! batch and generation moves on to the next one.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ProviderError, QuizError};
use crate::model::{Assessment, Difficulty, DocumentInfo, Feasibility, Question, QuestionType};
use crate::prompt::{
    feasibility_prompt, question_prompt, ASSESSMENT_SYSTEM_PROMPT, QUESTION_SYSTEM_PROMPT,
};
use crate::standards::{Objective, Standard, StandardsDocument};
use crate::traits::{extract_json_object, GenerateRequest, GenerateResponse, LlmProvider, TokenUsage};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Configuration for the question generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    pub assessment_temperature: f64,
    pub generation_temperature: f64,
    pub max_tokens: u32,
    /// Retries on transient provider errors.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further attempt.
    pub retry_delay: Duration,
    /// Generate questions even for standards assessed as not feasible.
    pub force: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            assessment_temperature: 0.3,
            generation_temperature: 0.7,
            max_tokens: 1024,
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            force: false,
        }
    }
}

/// A question that could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFailure {
    /// Zero-based position within the standard's batch.
    pub index: usize,
    pub question_type: QuestionType,
    /// The `QuizError` kind, e.g. `"validation_failure"`.
    pub kind: String,
    pub message: String,
}

/// The outcome of generating questions for one standard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardBatch {
    pub standard_id: String,
    pub assessment: Assessment,
    pub questions: Vec<Question>,
    /// How many questions were attempted.
    pub requested: usize,
    pub failures: Vec<QuestionFailure>,
    /// Set when generation was skipped entirely.
    pub skipped_reason: Option<String>,
}

impl StandardBatch {
    pub fn succeeded(&self) -> usize {
        self.questions.len()
    }
}

/// A standard whose assessment could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardFailure {
    pub standard_id: String,
    pub kind: String,
    pub message: String,
}

/// The outcome of processing a whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentBatch {
    pub run_id: Uuid,
    pub document_info: DocumentInfo,
    pub standards: Vec<StandardBatch>,
    pub failed_standards: Vec<StandardFailure>,
    pub duration_ms: u64,
}

impl DocumentBatch {
    pub fn requested(&self) -> usize {
        self.standards.iter().map(|s| s.requested).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.standards.iter().map(StandardBatch::succeeded).sum()
    }
}

/// Progress reporting trait.
pub trait GenerationProgress: Send + Sync {
    /// `position` is 1-based.
    fn on_standard_start(&self, standard_id: &str, position: usize, total: usize);
    fn on_question_done(&self, standard_id: &str, index: usize, question: &Question);
    fn on_question_failed(&self, standard_id: &str, index: usize, error: &QuizError);
    fn on_standard_failed(&self, standard_id: &str, error: &QuizError);
    fn on_standard_done(&self, batch: &StandardBatch);
}

/// No-op progress reporter.
pub struct NoopProgress;

impl GenerationProgress for NoopProgress {
    fn on_standard_start(&self, _: &str, _: usize, _: usize) {}
    fn on_question_done(&self, _: &str, _: usize, _: &Question) {}
    fn on_question_failed(&self, _: &str, _: usize, _: &QuizError) {}
    fn on_standard_failed(&self, _: &str, _: &QuizError) {}
    fn on_standard_done(&self, _: &StandardBatch) {}
}

// ---------------------------------------------------------------------------
// Raw LLM reply shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawAssessment {
    feasibility: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    suggested_question_types: Vec<String>,
    #[serde(default)]
    requires_visual_aids: Option<bool>,
    #[serde(default)]
    requires_hands_on: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    question_text: Option<String>,
    correct_answer: Option<serde_json::Value>,
    #[serde(default)]
    options: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    difficulty_level: Option<String>,
}

/// Render a scalar JSON value as answer text. Models sometimes answer
/// `4` or `true` instead of `"4"` or `"True"`.
fn scalar_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(true) => Some("True".into()),
        serde_json::Value::Bool(false) => Some("False".into()),
        _ => None,
    }
}

/// Drives assessment and question generation for standards.
pub struct QuizGenerator {
    provider: Arc<dyn LlmProvider>,
    config: GeneratorConfig,
    usage: Mutex<TokenUsage>,
}

impl QuizGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: GeneratorConfig) -> Self {
        Self {
            provider,
            config,
            usage: Mutex::new(TokenUsage::default()),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Token usage accumulated over every successful provider call.
    pub fn token_usage(&self) -> TokenUsage {
        self.usage
            .lock()
            .map(|usage| usage.clone())
            .unwrap_or_default()
    }

    /// Ask the model whether a standard can be assessed with text questions.
    pub async fn assess_feasibility(
        &self,
        standard: &Standard,
        grade_level: &str,
    ) -> Result<Assessment, QuizError> {
        let fail = |message: String| QuizError::GenerationFailure {
            standard_id: standard.id.clone(),
            question_index: None,
            message,
        };

        let request = self.request(
            feasibility_prompt(standard, grade_level),
            ASSESSMENT_SYSTEM_PROMPT,
            self.config.assessment_temperature,
        );
        let response = self
            .call(&request)
            .await
            .map_err(|e| fail(format!("{e:#}")))?;

        let raw: RawAssessment = serde_json::from_str(&extract_json_object(&response.content))
            .map_err(|e| fail(format!("unparsable assessment: {e}")))?;

        let feasibility = raw
            .feasibility
            .ok_or_else(|| fail("assessment is missing `feasibility`".into()))?
            .parse::<Feasibility>()
            .map_err(fail)?;

        let mut suggested_question_types: Vec<QuestionType> = Vec::new();
        for name in &raw.suggested_question_types {
            match name.parse::<QuestionType>() {
                Ok(t) if !suggested_question_types.contains(&t) => suggested_question_types.push(t),
                Ok(_) => {}
                Err(e) => tracing::warn!(standard = %standard.id, "ignoring suggestion: {e}"),
            }
        }

        let assessment = Assessment {
            standard_id: standard.id.clone(),
            feasibility,
            reasoning: raw.reasoning.unwrap_or_default(),
            suggested_question_types,
            requires_visual_aids: raw.requires_visual_aids.unwrap_or(false),
            requires_hands_on: raw.requires_hands_on.unwrap_or(false),
        };
        tracing::debug!(standard = %standard.id, feasibility = %assessment.feasibility, "assessed");
        Ok(assessment)
    }

    /// Generate one question of the given type.
    pub async fn generate_question(
        &self,
        standard: &Standard,
        grade_level: &str,
        question_type: QuestionType,
        objective: Option<&Objective>,
    ) -> Result<Question, QuizError> {
        let fail = |message: String| QuizError::GenerationFailure {
            standard_id: standard.id.clone(),
            question_index: None,
            message,
        };

        let request = self.request(
            question_prompt(standard, grade_level, question_type, objective),
            QUESTION_SYSTEM_PROMPT,
            self.config.generation_temperature,
        );
        let response = self
            .call(&request)
            .await
            .map_err(|e| fail(format!("{e:#}")))?;

        let raw: RawQuestion = serde_json::from_str(&extract_json_object(&response.content))
            .map_err(|e| fail(format!("unparsable question: {e}")))?;

        let question_text = raw
            .question_text
            .ok_or_else(|| fail("question is missing `question_text`".into()))?;
        let correct_answer = raw
            .correct_answer
            .and_then(scalar_text)
            .ok_or_else(|| fail("question is missing `correct_answer`".into()))?;

        let options = match question_type {
            QuestionType::MultipleChoice => raw
                .options
                .map(|opts| opts.into_iter().filter_map(scalar_text).collect()),
            _ => None,
        };

        let difficulty_level = raw.difficulty_level.and_then(|d| match d.parse::<Difficulty>() {
            Ok(level) => Some(level),
            Err(e) => {
                tracing::warn!(standard = %standard.id, "dropping difficulty: {e}");
                None
            }
        });

        let question = Question {
            standard_id: standard.id.clone(),
            question_type,
            question_text,
            correct_answer,
            options,
            explanation: raw.explanation.filter(|e| !e.trim().is_empty()),
            difficulty_level,
        };
        question.validate()?;
        Ok(question)
    }

    /// Assess a standard and generate up to `num_questions` questions for it.
    ///
    /// Only a failed assessment is an error; question failures are recorded
    /// on the returned batch.
    pub async fn generate_questions_for_standard(
        &self,
        standard: &Standard,
        grade_level: &str,
        num_questions: usize,
        question_types: Option<&[QuestionType]>,
    ) -> Result<StandardBatch, QuizError> {
        self.run_standard(
            standard,
            grade_level,
            num_questions,
            question_types,
            &NoopProgress,
        )
        .await
    }

    /// Walk a document's standards in strand order and generate for each.
    pub async fn process_document(
        &self,
        doc: &StandardsDocument,
        max_standards: Option<usize>,
        per_standard: usize,
        question_types: Option<&[QuestionType]>,
        progress: &dyn GenerationProgress,
    ) -> DocumentBatch {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let standards: Vec<&Standard> = doc
            .standards()
            .take(max_standards.unwrap_or(usize::MAX))
            .collect();
        let total = standards.len();

        tracing::info!(
            %run_id,
            document = %doc.document_key(),
            standards = total,
            "processing document"
        );

        let mut batch = DocumentBatch {
            run_id,
            document_info: doc.document_info(),
            standards: Vec::new(),
            failed_standards: Vec::new(),
            duration_ms: 0,
        };

        for (position, standard) in standards.into_iter().enumerate() {
            progress.on_standard_start(&standard.id, position + 1, total);
            match self
                .run_standard(
                    standard,
                    &doc.grade_level,
                    per_standard,
                    question_types,
                    progress,
                )
                .await
            {
                Ok(standard_batch) => batch.standards.push(standard_batch),
                Err(e) => {
                    tracing::warn!(standard = %standard.id, "assessment failed: {e}");
                    progress.on_standard_failed(&standard.id, &e);
                    batch.failed_standards.push(StandardFailure {
                        standard_id: standard.id.clone(),
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        batch.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            %run_id,
            requested = batch.requested(),
            succeeded = batch.succeeded(),
            failed_standards = batch.failed_standards.len(),
            "document done in {}ms",
            batch.duration_ms
        );
        batch
    }

    async fn run_standard(
        &self,
        standard: &Standard,
        grade_level: &str,
        num_questions: usize,
        question_types: Option<&[QuestionType]>,
        progress: &dyn GenerationProgress,
    ) -> Result<StandardBatch, QuizError> {
        let assessment = self.assess_feasibility(standard, grade_level).await?;

        if assessment.feasibility == Feasibility::NotFeasible && !self.config.force {
            let batch = StandardBatch {
                standard_id: standard.id.clone(),
                skipped_reason: Some(format!(
                    "assessed as not feasible: {}",
                    assessment.reasoning
                )),
                assessment,
                questions: Vec::new(),
                requested: 0,
                failures: Vec::new(),
            };
            tracing::info!(standard = %standard.id, "skipping not feasible standard");
            progress.on_standard_done(&batch);
            return Ok(batch);
        }

        let types: Vec<QuestionType> = match question_types {
            Some(types) if !types.is_empty() => types.to_vec(),
            _ if !assessment.suggested_question_types.is_empty() => {
                assessment.suggested_question_types.clone()
            }
            _ => vec![QuestionType::MultipleChoice],
        };
        let requested = num_questions.min(types.len());

        let mut questions = Vec::with_capacity(requested);
        let mut failures = Vec::new();

        for (index, question_type) in types.into_iter().take(requested).enumerate() {
            let objective = standard.objectives.get(index);
            match self
                .generate_question(standard, grade_level, question_type, objective)
                .await
            {
                Ok(question) => {
                    progress.on_question_done(&standard.id, index, &question);
                    questions.push(question);
                }
                Err(e) => {
                    let e = e.at_question(index);
                    tracing::warn!(standard = %standard.id, "{e}");
                    progress.on_question_failed(&standard.id, index, &e);
                    failures.push(QuestionFailure {
                        index,
                        question_type,
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let batch = StandardBatch {
            standard_id: standard.id.clone(),
            assessment,
            questions,
            requested,
            failures,
            skipped_reason: None,
        };
        tracing::info!(
            standard = %standard.id,
            "generated {}/{} questions",
            batch.succeeded(),
            batch.requested
        );
        progress.on_standard_done(&batch);
        Ok(batch)
    }

    fn request(&self, prompt: String, system_prompt: &str, temperature: f64) -> GenerateRequest {
        GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            system_prompt: Some(system_prompt.to_string()),
            max_tokens: self.config.max_tokens,
            temperature,
            json_mode: true,
        }
    }

    /// Call the provider, retrying transient errors with exponential backoff.
    async fn call(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let mut last_error = None;
        let mut retry_delay = self.config.retry_delay;

        for retry in 0..=self.config.max_retries {
            if retry > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
            }
            match self.provider.generate(request).await {
                Ok(response) => {
                    if let Ok(mut usage) = self.usage.lock() {
                        usage.add(&response.token_usage);
                    }
                    return Ok(response);
                }
                Err(e) => {
                    if let Some(provider_error) = e.downcast_ref::<ProviderError>() {
                        if provider_error.is_permanent() {
                            return Err(e);
                        }
                        if let Some(ms) = provider_error.retry_after_ms() {
                            retry_delay = Duration::from_millis(ms);
                        }
                    }
                    tracing::warn!(
                        provider = self.provider.name(),
                        attempt = retry + 1,
                        "provider call failed: {e:#}"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("provider returned no response")))
    }
}
