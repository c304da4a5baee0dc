//! Core data model types for solquiz.
//!
//! Questions and assessments are produced by the language model and checked
//! at the boundary; standards and documents group them into the nested
//! aggregate held by [`QuestionCollection`](crate::collection::QuestionCollection).

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuizError;

/// The kinds of quiz question the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    FillInBlank,
    TrueFalse,
    ShortAnswer,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::MultipleChoice,
        QuestionType::FillInBlank,
        QuestionType::TrueFalse,
        QuestionType::ShortAnswer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::FillInBlank => "fill_in_blank",
            QuestionType::TrueFalse => "true_false",
            QuestionType::ShortAnswer => "short_answer",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "multiple_choice" | "mc" => Ok(QuestionType::MultipleChoice),
            "fill_in_blank" | "fill_in_the_blank" => Ok(QuestionType::FillInBlank),
            "true_false" | "tf" => Ok(QuestionType::TrueFalse),
            "short_answer" => Ok(QuestionType::ShortAnswer),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// Difficulty rating attached to a generated question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Whether a standard can be assessed through text-only questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feasibility {
    Feasible,
    PartiallyFeasible,
    NotFeasible,
}

impl Feasibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feasibility::Feasible => "feasible",
            Feasibility::PartiallyFeasible => "partially_feasible",
            Feasibility::NotFeasible => "not_feasible",
        }
    }
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feasibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "feasible" => Ok(Feasibility::Feasible),
            "partially_feasible" | "partial" => Ok(Feasibility::PartiallyFeasible),
            "not_feasible" | "infeasible" => Ok(Feasibility::NotFeasible),
            other => Err(format!("unknown feasibility: {other}")),
        }
    }
}

/// A single generated quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub standard_id: String,
    pub question_type: QuestionType,
    pub question_text: String,
    pub correct_answer: String,
    /// Answer choices; required for multiple choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<Difficulty>,
}

impl Question {
    /// Check the question invariants.
    ///
    /// Text and answer must be non-blank. A multiple choice question must
    /// carry at least two options, one of which is the correct answer.
    pub fn validate(&self) -> Result<(), QuizError> {
        let fail = |reason: &str| QuizError::ValidationFailure {
            standard_id: self.standard_id.clone(),
            question_index: None,
            reason: reason.to_string(),
        };

        if self.question_text.trim().is_empty() {
            return Err(fail("question text is empty"));
        }
        if self.correct_answer.trim().is_empty() {
            return Err(fail("correct answer is empty"));
        }

        if self.question_type == QuestionType::MultipleChoice {
            let options = match &self.options {
                Some(options) if !options.is_empty() => options,
                _ => return Err(fail("multiple choice questions must have options")),
            };
            if options.len() < 2 {
                return Err(fail("multiple choice must have at least 2 options"));
            }
            if !options.contains(&self.correct_answer) {
                return Err(fail("correct answer must be in options list"));
            }
        }

        Ok(())
    }

    /// All text a search term is matched against.
    pub(crate) fn searchable_text(&self) -> impl Iterator<Item = &str> {
        [self.question_text.as_str(), self.correct_answer.as_str()]
            .into_iter()
            .chain(self.options.iter().flatten().map(String::as_str))
    }
}

/// The language model's verdict on whether a standard is text-testable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub standard_id: String,
    pub feasibility: Feasibility,
    pub reasoning: String,
    #[serde(default)]
    pub suggested_question_types: Vec<QuestionType>,
    #[serde(default)]
    pub requires_visual_aids: bool,
    #[serde(default)]
    pub requires_hands_on: bool,
}

/// Descriptive fields of a curriculum document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentInfo {
    #[serde(default, deserialize_with = "string_or_number")]
    pub title: String,
    #[serde(deserialize_with = "string_or_number")]
    pub grade_level: String,
    #[serde(deserialize_with = "string_or_number")]
    pub course_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: String,
}

impl DocumentInfo {
    /// The composite key a document is indexed by: `{course_name}_{grade_level}`.
    pub fn document_key(&self) -> String {
        document_key(&self.course_name, &self.grade_level)
    }
}

/// Build a document key from its parts.
pub fn document_key(course_name: &str, grade_level: &str) -> String {
    format!("{course_name}_{grade_level}")
}

/// Generated content for one standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardEntry {
    pub standard_id: String,
    pub assessment: Assessment,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Generated content for one curriculum document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub document_info: DocumentInfo,
    #[serde(default)]
    pub standards: Vec<StandardEntry>,
}

impl DocumentEntry {
    pub fn new(document_info: DocumentInfo) -> Self {
        Self {
            document_info,
            standards: Vec::new(),
        }
    }

    pub fn key(&self) -> String {
        self.document_info.document_key()
    }

    pub fn standard(&self, standard_id: &str) -> Option<&StandardEntry> {
        self.standards.iter().find(|s| s.standard_id == standard_id)
    }

    pub fn standard_mut(&mut self, standard_id: &str) -> Option<&mut StandardEntry> {
        self.standards
            .iter_mut()
            .find(|s| s.standard_id == standard_id)
    }

    pub fn question_count(&self) -> usize {
        self.standards.iter().map(|s| s.questions.len()).sum()
    }
}

/// Accept either a JSON string or a JSON number and keep it as a string.
///
/// Source documents are inconsistent about `year` and `grade_level`.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
        Raw::Null(()) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc(options: &[&str], answer: &str) -> Question {
        Question {
            standard_id: "1.NS.1".into(),
            question_type: QuestionType::MultipleChoice,
            question_text: "What is 2 + 2?".into(),
            correct_answer: answer.into(),
            options: Some(options.iter().map(|s| s.to_string()).collect()),
            explanation: None,
            difficulty_level: Some(Difficulty::Easy),
        }
    }

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::FillInBlank.to_string(), "fill_in_blank");
        assert_eq!(
            "Multiple Choice".parse::<QuestionType>().unwrap(),
            QuestionType::MultipleChoice
        );
        assert_eq!("tf".parse::<QuestionType>().unwrap(), QuestionType::TrueFalse);
        assert_eq!(
            "fill-in-the-blank".parse::<QuestionType>().unwrap(),
            QuestionType::FillInBlank
        );
        assert!("essay".parse::<QuestionType>().is_err());
    }

    #[test]
    fn feasibility_and_difficulty_parse() {
        assert_eq!(
            "partially feasible".parse::<Feasibility>().unwrap(),
            Feasibility::PartiallyFeasible
        );
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("trivial".parse::<Difficulty>().is_err());
    }

    #[test]
    fn valid_multiple_choice_passes() {
        assert!(mc(&["3", "4", "5"], "4").validate().is_ok());
    }

    #[test]
    fn multiple_choice_answer_must_be_an_option() {
        let err = mc(&["2", "3"], "4").validate().unwrap_err();
        assert!(matches!(err, QuizError::ValidationFailure { .. }));
        assert!(err.to_string().contains("must be in options"));
    }

    #[test]
    fn multiple_choice_needs_two_options() {
        let err = mc(&["4"], "4").validate().unwrap_err();
        assert!(err.to_string().contains("at least 2 options"));

        let mut q = mc(&[], "4");
        q.options = None;
        assert!(q.validate().is_err());
    }

    #[test]
    fn non_multiple_choice_needs_no_options() {
        let q = Question {
            standard_id: "1.NS.1".into(),
            question_type: QuestionType::TrueFalse,
            question_text: "Two plus two is four.".into(),
            correct_answer: "True".into(),
            options: None,
            explanation: None,
            difficulty_level: None,
        };
        assert!(q.validate().is_ok());
    }

    #[test]
    fn blank_answer_is_rejected() {
        let mut q = mc(&["a", "b"], "a");
        q.question_type = QuestionType::ShortAnswer;
        q.correct_answer = "   ".into();
        assert!(q.validate().is_err());
    }

    #[test]
    fn document_key_joins_course_and_grade() {
        let info = DocumentInfo {
            title: "Mathematics Standards of Learning".into(),
            grade_level: "Grade 1".into(),
            course_name: "Mathematics".into(),
            year: "2023".into(),
        };
        assert_eq!(info.document_key(), "Mathematics_Grade 1");
    }

    #[test]
    fn document_info_accepts_numeric_year() {
        let info: DocumentInfo = serde_json::from_str(
            r#"{"title": "T", "grade_level": "Grade 3", "course_name": "Science", "year": 2018}"#,
        )
        .unwrap();
        assert_eq!(info.year, "2018");
    }

    #[test]
    fn question_serde_skips_absent_optionals() {
        let q = Question {
            standard_id: "K.1".into(),
            question_type: QuestionType::ShortAnswer,
            question_text: "Name a shape.".into(),
            correct_answer: "circle".into(),
            options: None,
            explanation: None,
            difficulty_level: None,
        };
        let json = serde_json::to_value(&q).unwrap();
        assert!(json.get("options").is_none());
        assert_eq!(json["question_type"], "short_answer");
    }
}
