//! Export file format and import.
//!
//! The export file is pretty JSON of the form
//! `{export_date, total_documents, documents: [DocumentEntry]}`. Imports
//! re-derive document keys from each entry's `document_info` and validate
//! every question before the collection is handed back.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::QuestionCollection;
use crate::error::QuizError;
use crate::model::DocumentEntry;

/// The on-disk export representation of a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionExport {
    pub export_date: DateTime<Utc>,
    pub total_documents: usize,
    pub documents: Vec<DocumentEntry>,
}

#[derive(Debug, Deserialize)]
struct RawExport {
    #[serde(default)]
    export_date: Option<String>,
    #[serde(default)]
    total_documents: Option<usize>,
    documents: Vec<DocumentEntry>,
}

/// Snapshot a collection into the export representation.
pub fn to_export(collection: &QuestionCollection) -> CollectionExport {
    to_export_at(collection, Utc::now())
}

pub fn to_export_at(collection: &QuestionCollection, export_date: DateTime<Utc>) -> CollectionExport {
    let documents: Vec<DocumentEntry> = collection
        .documents()
        .map(|(_, entry)| entry.clone())
        .collect();
    CollectionExport {
        export_date,
        total_documents: documents.len(),
        documents,
    }
}

/// Rebuild a collection from exported documents.
///
/// Entries sharing a key are merged, first assessment wins. A standard id
/// repeated within one entry is folded into a single standard the same way.
pub fn from_export(documents: Vec<DocumentEntry>) -> Result<QuestionCollection, QuizError> {
    for entry in &documents {
        let key = entry.key();
        for standard in &entry.standards {
            for (i, question) in standard.questions.iter().enumerate() {
                question.validate().map_err(|e| match e.at_question(i) {
                    QuizError::ValidationFailure {
                        standard_id,
                        question_index,
                        reason,
                    } => QuizError::ValidationFailure {
                        standard_id: format!("{key}/{standard_id}"),
                        question_index,
                        reason,
                    },
                    other => other,
                })?;
            }
        }
    }

    let mut collection = QuestionCollection::new();
    for entry in documents {
        collection.insert_document(entry);
    }
    Ok(collection)
}

/// Parse a collection file.
///
/// Accepts the export format and also a bare map of document key to
/// document entry, the shape the collection itself serializes to.
pub fn parse_collection_str(content: &str, source: &str) -> Result<QuestionCollection, QuizError> {
    let malformed = |message: String| QuizError::MalformedInput {
        context: source.to_string(),
        message,
    };

    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| malformed(e.to_string()))?;

    let is_export = value
        .get("documents")
        .map(serde_json::Value::is_array)
        .unwrap_or(false);

    let documents = if is_export {
        let raw: RawExport = serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
        if let Some(declared) = raw.total_documents {
            if declared != raw.documents.len() {
                tracing::warn!(
                    source,
                    declared,
                    actual = raw.documents.len(),
                    "total_documents does not match the documents present"
                );
            }
        }
        if let Some(date) = &raw.export_date {
            tracing::debug!(source, export_date = %date, "importing export");
        }
        raw.documents
    } else {
        let map: BTreeMap<String, DocumentEntry> =
            serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
        map.into_values().collect()
    };

    from_export(documents)
}

/// Write a collection as an export file.
pub fn save_collection(collection: &QuestionCollection, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&to_export(collection))
        .context("failed to serialize collection")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write collection to {}", path.display()))?;
    tracing::info!(
        documents = collection.len(),
        questions = collection.total_questions(),
        "saved collection to {}",
        path.display()
    );
    Ok(())
}

/// Load a collection file.
pub fn load_collection(path: &Path) -> Result<QuestionCollection> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read collection from {}", path.display()))?;
    let collection = parse_collection_str(&content, &path.display().to_string())?;
    Ok(collection)
}
