//! The owned session context holding the current collection.

use std::path::Path;

use anyhow::Result;

use crate::collection::QuestionCollection;
use crate::error::QuizError;
use crate::export::{load_collection, save_collection};
use crate::generator::StandardBatch;
use crate::model::{DocumentInfo, Question};

/// A working session over one question collection.
///
/// Every mutating operation either completes or leaves the collection as
/// it was.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    collection: QuestionCollection,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(collection: QuestionCollection) -> Self {
        Self { collection }
    }

    /// Load a session from a collection file; a missing file starts empty.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no collection at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        Ok(Self::with_collection(load_collection(path)?))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_collection(&self.collection, path)
    }

    pub fn collection(&self) -> &QuestionCollection {
        &self.collection
    }

    pub fn into_collection(self) -> QuestionCollection {
        self.collection
    }

    /// Record the questions a generation batch produced.
    ///
    /// A skipped batch with no questions records nothing.
    pub fn record_batch(
        &mut self,
        document_info: &DocumentInfo,
        batch: &StandardBatch,
    ) -> Result<usize, QuizError> {
        if batch.questions.is_empty() {
            return Ok(0);
        }
        self.collection.append_result(
            document_info,
            &batch.standard_id,
            batch.assessment.clone(),
            batch.questions.clone(),
        )
    }

    /// Merge another collection in, first assessment wins.
    pub fn import(&mut self, incoming: &QuestionCollection) {
        self.collection = self.collection.merge(incoming);
        tracing::info!(
            documents = self.collection.len(),
            questions = self.collection.total_questions(),
            "imported collection"
        );
    }

    /// Delete several questions from one standard.
    ///
    /// All indices are checked before anything is removed, then removal
    /// runs from the highest index down so earlier positions stay valid.
    /// Duplicate indices are removed once.
    pub fn delete_questions(
        &mut self,
        document_key: &str,
        standard_id: &str,
        indices: &[usize],
    ) -> Result<Vec<Question>, QuizError> {
        let standard = self
            .collection
            .get(document_key)
            .ok_or_else(|| QuizError::UnknownDocument(document_key.to_string()))?
            .standard(standard_id)
            .ok_or_else(|| QuizError::UnknownStandard {
                document_key: document_key.to_string(),
                standard_id: standard_id.to_string(),
            })?;

        let len = standard.questions.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(QuizError::IndexOutOfRange {
                document_key: document_key.to_string(),
                standard_id: standard_id.to_string(),
                index,
                len,
            });
        }

        let mut ordered = indices.to_vec();
        ordered.sort_unstable_by(|a, b| b.cmp(a));
        ordered.dedup();

        let mut removed = Vec::with_capacity(ordered.len());
        for index in ordered {
            removed.push(
                self.collection
                    .delete_question(document_key, standard_id, index)?,
            );
        }
        removed.reverse();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.collection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::tests::{assessment, info, question, sample};
    use crate::model::{Feasibility, QuestionType};

    fn batch(questions: Vec<Question>) -> StandardBatch {
        StandardBatch {
            standard_id: "1.NS.1".into(),
            assessment: assessment("1.NS.1", Feasibility::NotFeasible),
            requested: questions.len(),
            questions,
            failures: vec![],
            skipped_reason: None,
        }
    }

    fn three_questions() -> QuizSession {
        let mut session = QuizSession::with_collection(sample());
        session
            .record_batch(
                &info("Mathematics", "Grade 1"),
                &batch(vec![question(
                    "1.NS.1",
                    "Count to three.",
                    QuestionType::ShortAnswer,
                    None,
                )]),
            )
            .unwrap();
        session
    }

    fn texts(session: &QuizSession) -> Vec<String> {
        session
            .collection()
            .get("Mathematics_Grade 1")
            .unwrap()
            .standard("1.NS.1")
            .unwrap()
            .questions
            .iter()
            .map(|q| q.question_text.clone())
            .collect()
    }

    #[test]
    fn record_batch_appends_and_keeps_assessment() {
        let session = three_questions();
        let standard = session
            .collection()
            .get("Mathematics_Grade 1")
            .unwrap()
            .standard("1.NS.1")
            .unwrap()
            .clone();
        assert_eq!(standard.questions.len(), 3);
        assert_eq!(standard.assessment.feasibility, Feasibility::Feasible);
    }

    #[test]
    fn empty_batch_records_nothing() {
        let mut session = QuizSession::new();
        let n = session
            .record_batch(&info("Mathematics", "Grade 1"), &batch(vec![]))
            .unwrap();
        assert_eq!(n, 0);
        assert!(session.collection().is_empty());
    }

    #[test]
    fn delete_several_in_any_order() {
        let mut session = three_questions();
        let removed = session
            .delete_questions("Mathematics_Grade 1", "1.NS.1", &[0, 2])
            .unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].question_text, "How many apples are in the basket?");
        assert_eq!(texts(&session), vec!["Which number comes after 3?"]);
    }

    #[test]
    fn delete_is_all_or_nothing() {
        let mut session = three_questions();
        let before = session.collection().clone();
        let err = session
            .delete_questions("Mathematics_Grade 1", "1.NS.1", &[0, 7])
            .unwrap_err();
        assert!(matches!(err, QuizError::IndexOutOfRange { index: 7, len: 3, .. }));
        assert_eq!(session.collection(), &before);
    }

    #[test]
    fn delete_unknown_standard() {
        let mut session = three_questions();
        let err = session
            .delete_questions("Mathematics_Grade 1", "9.Z.9", &[0])
            .unwrap_err();
        assert_eq!(err.kind(), "unknown_standard");
    }

    #[test]
    fn import_merges() {
        let mut session = three_questions();
        session.import(&sample());
        assert_eq!(texts(&session).len(), 5);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let session = QuizSession::load(&dir.path().join("none.json")).unwrap();
        assert!(session.collection().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        let session = three_questions();
        session.save(&path).unwrap();
        let loaded = QuizSession::load(&path).unwrap();
        assert_eq!(loaded.collection(), session.collection());

        let mut cleared = loaded;
        cleared.clear();
        assert!(cleared.into_collection().is_empty());
    }
}
