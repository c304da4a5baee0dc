//! The question collection: merge, filter, search, and mutation.
//!
//! Filtering and searching are pure projections that return a new
//! collection. Merging is pure as well. Appending and deleting mutate in
//! place and either complete or leave the collection untouched.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::QuizError;
use crate::model::{
    Assessment, Difficulty, DocumentEntry, DocumentInfo, Feasibility, Question, QuestionType,
    StandardEntry,
};

/// Generated quiz content keyed by document key.
///
/// There is no `Deserialize` impl; files come in through
/// [`crate::export::parse_collection_str`], which re-keys and validates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionCollection {
    documents: BTreeMap<String, DocumentEntry>,
}

/// Which questions survive [`QuestionCollection::filter`].
///
/// An empty set means "no constraint" for that dimension.
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    pub question_types: HashSet<QuestionType>,
    pub difficulty_levels: HashSet<Difficulty>,
    pub feasibilities: HashSet<Feasibility>,
}

impl QuestionFilter {
    pub fn is_empty(&self) -> bool {
        self.question_types.is_empty()
            && self.difficulty_levels.is_empty()
            && self.feasibilities.is_empty()
    }

    fn keeps_standard(&self, standard: &StandardEntry) -> bool {
        self.feasibilities.is_empty()
            || self
                .feasibilities
                .contains(&standard.assessment.feasibility)
    }

    fn keeps_question(&self, question: &Question) -> bool {
        let type_ok = self.question_types.is_empty()
            || self.question_types.contains(&question.question_type);
        let difficulty_ok = self.difficulty_levels.is_empty()
            || question
                .difficulty_level
                .is_some_and(|d| self.difficulty_levels.contains(&d));
        type_ok && difficulty_ok
    }
}

impl QuestionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn get(&self, document_key: &str) -> Option<&DocumentEntry> {
        self.documents.get(document_key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.documents.keys()
    }

    /// Documents in key order.
    pub fn documents(&self) -> impl Iterator<Item = (&String, &DocumentEntry)> {
        self.documents.iter()
    }

    pub fn total_questions(&self) -> usize {
        self.documents.values().map(DocumentEntry::question_count).sum()
    }

    /// Insert a document entry under its derived key.
    ///
    /// An entry already present under that key is merged with the new one
    /// using the same first-write-wins policy as [`merge`](Self::merge).
    /// Standards repeated inside `entry` are folded the same way, so each
    /// standard id appears once per document.
    pub fn insert_document(&mut self, entry: DocumentEntry) {
        let doc = self
            .documents
            .entry(entry.key())
            .or_insert_with(|| DocumentEntry::new(entry.document_info.clone()));
        merge_document(doc, entry);
    }

    /// Merge `incoming` into a copy of `self`.
    ///
    /// Standards are matched by id. When both sides hold a standard, the
    /// incoming questions are appended after the existing ones and the
    /// existing assessment is kept: the first assessment recorded for a
    /// standard wins. Questions are never deduplicated, so merging
    /// overlapping collections twice repeats their questions.
    pub fn merge(&self, incoming: &QuestionCollection) -> QuestionCollection {
        let mut merged = self.clone();
        for (key, entry) in &incoming.documents {
            match merged.documents.entry(key.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(entry.clone());
                }
                Entry::Occupied(mut slot) => merge_document(slot.get_mut(), entry.clone()),
            }
        }
        merged
    }

    /// Project the collection onto the questions matching `filter`.
    pub fn filter(&self, filter: &QuestionFilter) -> QuestionCollection {
        if filter.is_empty() {
            return self.clone();
        }
        self.project(|standard| {
            if !filter.keeps_standard(standard) {
                return Vec::new();
            }
            standard
                .questions
                .iter()
                .filter(|q| filter.keeps_question(q))
                .cloned()
                .collect()
        })
    }

    /// Keep standards whose id contains `term`, and elsewhere the questions
    /// whose text, answer, or options contain it.
    pub fn search(&self, term: &str, case_insensitive: bool) -> QuestionCollection {
        if term.is_empty() {
            return self.clone();
        }
        let needle = if case_insensitive {
            term.to_lowercase()
        } else {
            term.to_string()
        };
        let contains = |haystack: &str| {
            if case_insensitive {
                haystack.to_lowercase().contains(&needle)
            } else {
                haystack.contains(&needle)
            }
        };

        self.project(|standard| {
            if contains(standard.standard_id.as_str()) {
                return standard.questions.clone();
            }
            standard
                .questions
                .iter()
                .filter(|q| q.searchable_text().any(|text| contains(text)))
                .cloned()
                .collect()
        })
    }

    /// Build a new collection keeping, per standard, the questions returned
    /// by `select`. Standards and documents left empty are dropped.
    fn project<F>(&self, mut select: F) -> QuestionCollection
    where
        F: FnMut(&StandardEntry) -> Vec<Question>,
    {
        let mut documents = BTreeMap::new();
        for (key, doc) in &self.documents {
            let standards: Vec<StandardEntry> = doc
                .standards
                .iter()
                .filter_map(|standard| {
                    let questions = select(standard);
                    (!questions.is_empty()).then(|| StandardEntry {
                        standard_id: standard.standard_id.clone(),
                        assessment: standard.assessment.clone(),
                        questions,
                    })
                })
                .collect();

            if !standards.is_empty() {
                documents.insert(
                    key.clone(),
                    DocumentEntry {
                        document_info: doc.document_info.clone(),
                        standards,
                    },
                );
            }
        }
        QuestionCollection { documents }
    }

    /// Record newly generated questions for a standard.
    ///
    /// Creates the document and standard entries on first reference. For a
    /// standard that already exists the questions are appended and its
    /// original assessment is kept. Every question is validated before
    /// anything is inserted; on failure the collection is unchanged.
    pub fn append_result(
        &mut self,
        document_info: &DocumentInfo,
        standard_id: &str,
        assessment: Assessment,
        new_questions: Vec<Question>,
    ) -> Result<usize, QuizError> {
        for (i, question) in new_questions.iter().enumerate() {
            question.validate().map_err(|e| e.at_question(i))?;
        }

        let appended = new_questions.len();
        let doc = self
            .documents
            .entry(document_info.document_key())
            .or_insert_with(|| DocumentEntry::new(document_info.clone()));

        match doc.standard_mut(standard_id) {
            Some(existing) => existing.questions.extend(new_questions),
            None => doc.standards.push(StandardEntry {
                standard_id: standard_id.to_string(),
                assessment,
                questions: new_questions,
            }),
        }

        tracing::debug!(
            document = %document_info.document_key(),
            standard = standard_id,
            appended,
            "recorded questions"
        );
        Ok(appended)
    }

    /// Remove the question at `index` and return it.
    ///
    /// Later questions shift down by one, so a caller removing several
    /// positions must go from the highest index to the lowest.
    pub fn delete_question(
        &mut self,
        document_key: &str,
        standard_id: &str,
        index: usize,
    ) -> Result<Question, QuizError> {
        let doc = self
            .documents
            .get_mut(document_key)
            .ok_or_else(|| QuizError::UnknownDocument(document_key.to_string()))?;
        let standard = doc
            .standard_mut(standard_id)
            .ok_or_else(|| QuizError::UnknownStandard {
                document_key: document_key.to_string(),
                standard_id: standard_id.to_string(),
            })?;

        if index >= standard.questions.len() {
            return Err(QuizError::IndexOutOfRange {
                document_key: document_key.to_string(),
                standard_id: standard_id.to_string(),
                index,
                len: standard.questions.len(),
            });
        }
        Ok(standard.questions.remove(index))
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.documents.clear();
    }
}

/// Fold `incoming` into `base`, first write wins for assessments.
fn merge_document(base: &mut DocumentEntry, incoming: DocumentEntry) {
    for standard in incoming.standards {
        match base.standard_mut(&standard.standard_id) {
            Some(existing) => existing.questions.extend(standard.questions),
            None => base.standards.push(standard),
        }
    }
}
