//! Error types for the question collection and the generation pipeline.
//!
//! `ProviderError` is defined here rather than in `solquiz-providers` so the
//! generator can downcast and classify failures for retry decisions without
//! string matching.

use thiserror::Error;

/// Errors raised by collection operations, input parsing, and generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// The standards document (or an import file) is structurally invalid.
    #[error("malformed input at {context}: {message}")]
    MalformedInput { context: String, message: String },

    /// The language model call failed or returned unparsable content.
    #[error("generation failed for {standard_id}{}: {message}", fmt_index(.question_index))]
    GenerationFailure {
        standard_id: String,
        question_index: Option<usize>,
        message: String,
    },

    /// A question violates the question invariants.
    #[error("invalid question for {standard_id}{}: {reason}", fmt_index(.question_index))]
    ValidationFailure {
        standard_id: String,
        question_index: Option<usize>,
        reason: String,
    },

    /// A deletion referenced a position that does not exist.
    #[error("question index {index} out of range for {document_key}/{standard_id} ({len} questions)")]
    IndexOutOfRange {
        document_key: String,
        standard_id: String,
        index: usize,
        len: usize,
    },

    #[error("unknown document: {0}")]
    UnknownDocument(String),

    #[error("unknown standard {standard_id} in {document_key}")]
    UnknownStandard {
        document_key: String,
        standard_id: String,
    },
}

fn fmt_index(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" (question {})", i + 1),
        None => String::new(),
    }
}

impl QuizError {
    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            QuizError::MalformedInput { .. } => "malformed_input",
            QuizError::GenerationFailure { .. } => "generation_failure",
            QuizError::ValidationFailure { .. } => "validation_failure",
            QuizError::IndexOutOfRange { .. } => "index_out_of_range",
            QuizError::UnknownDocument(_) => "unknown_document",
            QuizError::UnknownStandard { .. } => "unknown_standard",
        }
    }

    /// Attach a question position to generation and validation failures.
    pub fn at_question(self, index: usize) -> Self {
        match self {
            QuizError::GenerationFailure {
                standard_id,
                message,
                ..
            } => QuizError::GenerationFailure {
                standard_id,
                question_index: Some(index),
                message,
            },
            QuizError::ValidationFailure {
                standard_id,
                reason,
                ..
            } => QuizError::ValidationFailure {
                standard_id,
                question_index: Some(index),
                reason,
            },
            other => other,
        }
    }
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_question_position() {
        let err = QuizError::ValidationFailure {
            standard_id: "1.NS.1".into(),
            question_index: Some(2),
            reason: "correct answer not among options".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid question for 1.NS.1 (question 3): correct answer not among options"
        );
    }

    #[test]
    fn at_question_only_touches_generation_kinds() {
        let err = QuizError::GenerationFailure {
            standard_id: "1.NS.1".into(),
            question_index: None,
            message: "bad json".into(),
        }
        .at_question(0);
        assert!(matches!(
            err,
            QuizError::GenerationFailure {
                question_index: Some(0),
                ..
            }
        ));

        let err = QuizError::UnknownDocument("x".into()).at_question(4);
        assert_eq!(err, QuizError::UnknownDocument("x".into()));
    }

    #[test]
    fn permanent_provider_errors() {
        assert!(ProviderError::AuthenticationFailed("nope".into()).is_permanent());
        assert!(ProviderError::ModelNotFound("gpt-x".into()).is_permanent());
        assert!(!ProviderError::Timeout(30).is_permanent());
        assert_eq!(
            ProviderError::RateLimited {
                retry_after_ms: 2000
            }
            .retry_after_ms(),
            Some(2000)
        );
    }
}
