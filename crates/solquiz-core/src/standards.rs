//! Standards document parser.
//!
//! Loads the structured curriculum JSON, converts it into strict types, and
//! validates it. Missing identifiers surface as `MalformedInput` with the
//! position of the offending record.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{document_key, string_or_number, DocumentInfo};

/// A parsed standards file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardsFile {
    /// The count declared by the file itself.
    pub total_documents: Option<usize>,
    pub documents: Vec<StandardsDocument>,
}

/// One curriculum document (a course at a grade level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardsDocument {
    pub title: String,
    pub grade_level: String,
    pub course_name: String,
    pub year: String,
    pub strands: Vec<Strand>,
}

/// A named group of related standards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Strand {
    pub code: String,
    pub name: String,
    pub standards: Vec<Standard>,
}

/// A single learning standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standard {
    pub id: String,
    pub statement: String,
    pub objectives: Vec<Objective>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub text: String,
}

impl StandardsFile {
    /// Find a document by key (`Course_Grade`, case-insensitive) or by
    /// zero-based position.
    pub fn find_document(&self, selector: &str) -> Option<&StandardsDocument> {
        if let Ok(index) = selector.parse::<usize>() {
            return self.documents.get(index);
        }
        let wanted = selector.to_lowercase();
        self.documents
            .iter()
            .find(|d| d.document_key().to_lowercase() == wanted)
    }

    pub fn standard_count(&self) -> usize {
        self.documents.iter().map(|d| d.standards().count()).sum()
    }
}

impl StandardsDocument {
    pub fn document_key(&self) -> String {
        document_key(&self.course_name, &self.grade_level)
    }

    /// The fields carried into generated output.
    pub fn document_info(&self) -> DocumentInfo {
        DocumentInfo {
            title: self.title.clone(),
            grade_level: self.grade_level.clone(),
            course_name: self.course_name.clone(),
            year: self.year.clone(),
        }
    }

    /// All standards, strand by strand, in document order.
    pub fn standards(&self) -> impl Iterator<Item = &Standard> {
        self.strands.iter().flat_map(|s| s.standards.iter())
    }

    pub fn find_standard(&self, id: &str) -> Option<&Standard> {
        self.standards().find(|s| s.id.eq_ignore_ascii_case(id))
    }
}

// ---------------------------------------------------------------------------
// Raw JSON shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawFile {
    #[serde(default)]
    total_documents: Option<usize>,
    #[serde(default)]
    documents: Option<Vec<RawDocumentWrapper>>,
}

#[derive(Debug, Deserialize)]
struct RawDocumentWrapper {
    document: Option<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default, deserialize_with = "string_or_number")]
    title: String,
    #[serde(default, deserialize_with = "string_or_number")]
    grade_level: String,
    #[serde(default, deserialize_with = "string_or_number")]
    course_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    year: String,
    #[serde(default)]
    strands: Vec<RawStrand>,
}

#[derive(Debug, Deserialize)]
struct RawStrand {
    #[serde(default)]
    code: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    standards: Vec<RawStandard>,
}

#[derive(Debug, Deserialize)]
struct RawStandard {
    #[serde(default, deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    statement: String,
    #[serde(default)]
    knowledge_and_skills: Option<RawKnowledgeAndSkills>,
}

#[derive(Debug, Default, Deserialize)]
struct RawKnowledgeAndSkills {
    #[serde(default)]
    objectives: Vec<Objective>,
}

fn malformed(context: impl Into<String>, message: impl Into<String>) -> QuizError {
    QuizError::MalformedInput {
        context: context.into(),
        message: message.into(),
    }
}

/// Load and parse a standards file.
pub fn load_standards(path: &Path) -> Result<StandardsFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read standards file: {}", path.display()))?;
    let file = parse_standards_str(&content, &path.display().to_string())?;
    tracing::info!(
        documents = file.documents.len(),
        standards = file.standard_count(),
        "loaded standards from {}",
        path.display()
    );
    Ok(file)
}

/// Parse a standards document from a JSON string.
pub fn parse_standards_str(content: &str, source: &str) -> Result<StandardsFile, QuizError> {
    let raw: RawFile =
        serde_json::from_str(content).map_err(|e| malformed(source, e.to_string()))?;

    let raw_documents = raw
        .documents
        .ok_or_else(|| malformed(source, "missing required field `documents`"))?;

    let documents = raw_documents
        .into_iter()
        .enumerate()
        .map(|(i, wrapper)| -> Result<StandardsDocument, QuizError> {
            let at = format!("documents[{i}]");
            let doc = wrapper
                .document
                .ok_or_else(|| malformed(&at, "missing required field `document`"))?;
            convert_document(doc, &at)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StandardsFile {
        total_documents: raw.total_documents,
        documents,
    })
}

fn convert_document(doc: RawDocument, at: &str) -> Result<StandardsDocument, QuizError> {
    if doc.course_name.trim().is_empty() {
        return Err(malformed(at, "missing required field `course_name`"));
    }
    if doc.grade_level.trim().is_empty() {
        return Err(malformed(at, "missing required field `grade_level`"));
    }

    let strands = doc
        .strands
        .into_iter()
        .enumerate()
        .map(|(si, strand)| -> Result<Strand, QuizError> {
            let standards = strand
                .standards
                .into_iter()
                .enumerate()
                .map(|(ti, standard)| {
                    if standard.id.trim().is_empty() {
                        return Err(malformed(
                            format!("{at}.strands[{si}].standards[{ti}]"),
                            "missing required field `id`",
                        ));
                    }
                    Ok(Standard {
                        id: standard.id,
                        statement: standard.statement,
                        objectives: standard
                            .knowledge_and_skills
                            .unwrap_or_default()
                            .objectives,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Strand {
                code: strand.code,
                name: strand.name,
                standards,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StandardsDocument {
        title: doc.title,
        grade_level: doc.grade_level,
        course_name: doc.course_name,
        year: doc.year,
        strands,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A non-fatal issue found in a standards file.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The document key (if applicable).
    pub document_key: Option<String>,
    /// The standard ID (if applicable).
    pub standard_id: Option<String>,
    pub message: String,
}

/// Check a parsed standards file for common issues.
pub fn validate_standards(file: &StandardsFile) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Some(declared) = file.total_documents {
        if declared != file.documents.len() {
            warnings.push(ValidationWarning {
                document_key: None,
                standard_id: None,
                message: format!(
                    "total_documents is {declared} but {} documents are present",
                    file.documents.len()
                ),
            });
        }
    }

    let mut seen_keys = HashSet::new();
    for doc in &file.documents {
        let key = doc.document_key();
        if !seen_keys.insert(key.clone()) {
            warnings.push(ValidationWarning {
                document_key: Some(key.clone()),
                standard_id: None,
                message: format!("duplicate document key: {key}"),
            });
        }

        if doc.standards().next().is_none() {
            warnings.push(ValidationWarning {
                document_key: Some(key.clone()),
                standard_id: None,
                message: "document has no standards".into(),
            });
        }

        let mut seen_ids = HashSet::new();
        for standard in doc.standards() {
            if !seen_ids.insert(standard.id.as_str()) {
                warnings.push(ValidationWarning {
                    document_key: Some(key.clone()),
                    standard_id: Some(standard.id.clone()),
                    message: format!("duplicate standard ID: {}", standard.id),
                });
            }
            if standard.statement.trim().is_empty() {
                warnings.push(ValidationWarning {
                    document_key: Some(key.clone()),
                    standard_id: Some(standard.id.clone()),
                    message: "statement is empty".into(),
                });
            }
        }
    }

    warnings
}
