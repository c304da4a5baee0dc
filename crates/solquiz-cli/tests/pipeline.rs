//! Standards file to saved collection, in-process, with the mock provider.

use std::path::PathBuf;
use std::sync::Arc;

use solquiz_core::collection::QuestionFilter;
use solquiz_core::export::load_collection;
use solquiz_core::generator::{GeneratorConfig, NoopProgress, QuizGenerator};
use solquiz_core::model::{Feasibility, QuestionType};
use solquiz_core::session::QuizSession;
use solquiz_core::standards::load_standards;
use solquiz_core::statistics::compute_statistics;
use solquiz_providers::mock::MockProvider;
use solquiz_report::html::generate_html;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures")
        .join(name)
}

fn provider() -> MockProvider {
    MockProvider::new(vec![])
        // 1.MG.1 has no objectives, so its assessment prompt ends the
        // statement right before the objectives heading.
        .with_rule(
            "and volume.\n\nObjectives:",
            r#"{"feasibility": "not_feasible", "reasoning": "Needs physical measuring.", "requires_hands_on": true}"#,
        )
        .with_rule(
            "Analyze the following educational standard",
            r#"{"feasibility": "feasible", "reasoning": "Works in text.", "suggested_question_types": ["multiple_choice", "true_false"]}"#,
        )
        .with_rule(
            "Question Type: multiple_choice",
            r#"Here you go: {"question_text": "Which number is largest?", "correct_answer": "120", "options": ["12", "102", "120", "21"], "difficulty_level": "medium"}"#,
        )
        .with_rule(
            "Question Type: true_false",
            r#"{"question_text": "100 is less than 99.", "correct_answer": false, "difficulty_level": "EASY"}"#,
        )
}

fn config() -> GeneratorConfig {
    GeneratorConfig {
        model: "mock-model".into(),
        max_retries: 0,
        ..Default::default()
    }
}

#[tokio::test]
async fn document_to_saved_collection() {
    let standards = load_standards(&fixture("standards-sample.json")).unwrap();
    let doc = standards.find_document("Mathematics_Grade 1").unwrap();

    let mock = Arc::new(provider());
    let generator = QuizGenerator::new(mock.clone(), config());
    let batch = generator
        .process_document(doc, None, 2, None, &NoopProgress)
        .await;

    assert!(batch.failed_standards.is_empty());
    assert_eq!(batch.standards.len(), 3);
    assert_eq!(batch.requested(), 4);
    assert_eq!(batch.succeeded(), 4);
    assert_eq!(mock.call_count(), 7);

    let skipped = &batch.standards[2];
    assert_eq!(skipped.standard_id, "1.MG.1");
    assert_eq!(skipped.assessment.feasibility, Feasibility::NotFeasible);
    assert!(skipped.skipped_reason.is_some());

    let mut session = QuizSession::new();
    for standard in &batch.standards {
        session.record_batch(&batch.document_info, standard).unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questions.json");
    session.save(&path).unwrap();
    let reloaded = load_collection(&path).unwrap();
    assert_eq!(&reloaded, session.collection());

    let stats = compute_statistics(&reloaded);
    assert_eq!(stats.total_standards, 2);
    assert_eq!(stats.by_type["multiple_choice"], 2);
    assert_eq!(stats.by_difficulty["easy"], 2);

    let html = generate_html(&reloaded);
    assert!(html.contains("Which number is largest?"));
}

#[tokio::test]
async fn explicit_types_and_later_deletion() {
    let standards = load_standards(&fixture("standards-sample.json")).unwrap();
    let doc = standards.find_document("0").unwrap();
    let standard = doc.find_standard("1.NS.1").unwrap();

    let generator = QuizGenerator::new(Arc::new(provider()), config());
    let batch = generator
        .generate_questions_for_standard(
            standard,
            &doc.grade_level,
            3,
            Some(&[QuestionType::TrueFalse, QuestionType::MultipleChoice][..]),
        )
        .await
        .unwrap();
    assert_eq!(batch.requested, 2);
    assert_eq!(batch.questions[0].correct_answer, "False");
    assert_eq!(batch.questions[1].question_type, QuestionType::MultipleChoice);

    let mut session = QuizSession::new();
    session
        .record_batch(&doc.document_info(), &batch)
        .unwrap();
    session
        .record_batch(&doc.document_info(), &batch)
        .unwrap();
    assert_eq!(session.collection().total_questions(), 4);

    let removed = session
        .delete_questions("Mathematics_Grade 1", "1.NS.1", &[3, 0])
        .unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(removed[0].question_type, QuestionType::TrueFalse);
    assert_eq!(removed[1].question_type, QuestionType::MultipleChoice);

    let only_mc = session.collection().filter(&QuestionFilter {
        question_types: [QuestionType::MultipleChoice].into_iter().collect(),
        ..Default::default()
    });
    assert_eq!(only_mc.total_questions(), 1);
}
