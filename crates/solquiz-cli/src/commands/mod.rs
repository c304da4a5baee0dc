//! Subcommand implementations and the helpers they share.

pub mod assess;
pub mod browse;
pub mod clear;
pub mod delete;
pub mod export;
pub mod generate;
pub mod init;
pub mod list_models;
pub mod merge;
pub mod review;
pub mod stats;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use solquiz_core::collection::{QuestionCollection, QuestionFilter};
use solquiz_core::generator::QuizGenerator;
use solquiz_core::model::{Difficulty, Feasibility, QuestionType};
use solquiz_core::standards::{StandardsDocument, StandardsFile};
use solquiz_providers::config::load_config_from;
use solquiz_providers::{create_provider, SolquizConfig};

/// Collection filtering flags shared by `review` and `export`.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Keep only these question types (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub types: Vec<QuestionType>,

    /// Keep only these difficulty levels (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub difficulties: Vec<Difficulty>,

    /// Keep only standards with these feasibility verdicts (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub feasibilities: Vec<Feasibility>,

    /// Keep questions mentioning this term
    #[arg(long)]
    pub search: Option<String>,

    /// Match the search term case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,
}

impl FilterArgs {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.difficulties.is_empty()
            && self.feasibilities.is_empty()
            && self.search.is_none()
    }

    /// Filter first, then search the survivors.
    pub fn apply(&self, collection: &QuestionCollection) -> QuestionCollection {
        let filter = QuestionFilter {
            question_types: self.types.iter().copied().collect(),
            difficulty_levels: self.difficulties.iter().copied().collect(),
            feasibilities: self.feasibilities.iter().copied().collect(),
        };
        let filtered = collection.filter(&filter);
        match &self.search {
            Some(term) => filtered.search(term, !self.case_sensitive),
            None => filtered,
        }
    }
}

/// The collection file to use: the explicit one, else the configured one.
pub fn collection_path(explicit: Option<PathBuf>, config_path: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(load_config_from(config_path)?.collection_file),
    }
}

/// Look up a document by key or index, listing the choices on a miss.
pub fn find_document<'a>(file: &'a StandardsFile, selector: &str) -> Result<&'a StandardsDocument> {
    file.find_document(selector).with_context(|| {
        let available: Vec<String> = file.documents.iter().map(|d| d.document_key()).collect();
        format!("document '{selector}' not found. Available: {available:?}")
    })
}

/// Build a generator for `model` (or the configured default).
pub fn build_generator(
    config: &SolquizConfig,
    model: Option<&str>,
    force: bool,
) -> Result<QuizGenerator> {
    let (provider_name, model) = config.resolve_model(model);
    let provider_config = config.providers.get(&provider_name).with_context(|| {
        format!(
            "provider '{provider_name}' not found in config. Available: {:?}",
            config.providers.keys().collect::<Vec<_>>()
        )
    })?;
    let provider = create_provider(&provider_name, provider_config)?;
    tracing::debug!(provider = %provider_name, model = %model, "using provider");

    Ok(QuizGenerator::new(
        Arc::from(provider),
        config.generator_config(&model, force),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solquiz_core::model::{Assessment, DocumentInfo, Question};

    fn collection() -> QuestionCollection {
        let info = DocumentInfo {
            title: "Math".into(),
            grade_level: "1".into(),
            course_name: "Mathematics".into(),
            year: "2023".into(),
        };
        let assessment = Assessment {
            standard_id: "1.NS.1".into(),
            feasibility: Feasibility::Feasible,
            reasoning: String::new(),
            suggested_question_types: vec![],
            requires_visual_aids: false,
            requires_hands_on: false,
        };
        let questions = vec![
            Question {
                standard_id: "1.NS.1".into(),
                question_type: QuestionType::TrueFalse,
                question_text: "Ten comes after nine.".into(),
                correct_answer: "True".into(),
                options: None,
                explanation: None,
                difficulty_level: Some(Difficulty::Easy),
            },
            Question {
                standard_id: "1.NS.1".into(),
                question_type: QuestionType::ShortAnswer,
                question_text: "Count to twenty.".into(),
                correct_answer: "1, 2, ..., 20".into(),
                options: None,
                explanation: None,
                difficulty_level: Some(Difficulty::Hard),
            },
        ];
        let mut coll = QuestionCollection::new();
        coll.append_result(&info, "1.NS.1", assessment, questions)
            .unwrap();
        coll
    }

    #[test]
    fn empty_filter_args_keep_everything() {
        let coll = collection();
        let args = FilterArgs::default();
        assert!(args.is_empty());
        assert_eq!(args.apply(&coll), coll);
    }

    #[test]
    fn filter_then_search() {
        let coll = collection();
        let args = FilterArgs {
            difficulties: vec![Difficulty::Easy, Difficulty::Hard],
            search: Some("TEN".into()),
            ..Default::default()
        };
        assert_eq!(args.apply(&coll).total_questions(), 1);

        let strict = FilterArgs {
            search: Some("TEN".into()),
            case_sensitive: true,
            ..Default::default()
        };
        assert_eq!(strict.apply(&coll).total_questions(), 0);
    }

    #[test]
    fn explicit_collection_path_wins() {
        let path = collection_path(Some(PathBuf::from("mine.json")), None).unwrap();
        assert_eq!(path, PathBuf::from("mine.json"));
    }

    #[test]
    fn missing_provider_is_reported() {
        let config = SolquizConfig::default();
        let err = build_generator(&config, Some("nowhere/model"), false)
            .err()
            .unwrap();
        assert!(err.to_string().contains("provider 'nowhere' not found"));
    }
}
