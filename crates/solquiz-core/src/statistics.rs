//! Aggregate statistics over a question collection.
//!
//! Everything here is derived on demand from the collection; nothing is
//! cached, so the same collection state always yields the same numbers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::collection::QuestionCollection;

/// Key used for questions that carry no difficulty rating.
pub const UNKNOWN_DIFFICULTY: &str = "unknown";

/// Collection-wide counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub total_documents: usize,
    pub total_standards: usize,
    pub total_questions: usize,
    /// Questions per question type.
    pub by_type: BTreeMap<String, usize>,
    /// Questions per difficulty, with unrated ones under `"unknown"`.
    pub by_difficulty: BTreeMap<String, usize>,
    /// Standards per feasibility verdict.
    pub by_feasibility: BTreeMap<String, usize>,
    /// `total_questions / total_standards`, or 0 with no standards.
    pub avg_questions_per_standard: f64,
}

impl CollectionStats {
    /// The question type with the most questions, ties broken by name.
    pub fn most_common_type(&self) -> Option<&str> {
        self.by_type
            .iter()
            .max_by(|(a_name, a), (b_name, b)| a.cmp(b).then_with(|| b_name.cmp(a_name)))
            .map(|(name, _)| name.as_str())
    }

    /// Share of `count` in `total` as a percentage, 0 when `total` is 0.
    pub fn percentage(count: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        }
    }
}

/// Per-standard question counts, one row per standard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardBreakdown {
    pub document_key: String,
    pub standard_id: String,
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl StandardBreakdown {
    pub fn count(&self, question_type: &str) -> usize {
        self.by_type.get(question_type).copied().unwrap_or(0)
    }
}

/// Compute collection-wide statistics.
pub fn compute_statistics(collection: &QuestionCollection) -> CollectionStats {
    let mut stats = CollectionStats {
        total_documents: collection.len(),
        ..Default::default()
    };

    for (_, doc) in collection.documents() {
        stats.total_standards += doc.standards.len();

        for standard in &doc.standards {
            stats.total_questions += standard.questions.len();
            *stats
                .by_feasibility
                .entry(standard.assessment.feasibility.to_string())
                .or_default() += 1;

            for q in &standard.questions {
                *stats
                    .by_type
                    .entry(q.question_type.to_string())
                    .or_default() += 1;
                let difficulty = q
                    .difficulty_level
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| UNKNOWN_DIFFICULTY.to_string());
                *stats.by_difficulty.entry(difficulty).or_default() += 1;
            }
        }
    }

    if stats.total_standards > 0 {
        stats.avg_questions_per_standard =
            stats.total_questions as f64 / stats.total_standards as f64;
    }

    stats
}

/// One row per standard with its question type counts.
pub fn standard_breakdown(collection: &QuestionCollection) -> Vec<StandardBreakdown> {
    let mut rows = Vec::new();
    for (key, doc) in collection.documents() {
        for standard in &doc.standards {
            let mut by_type = BTreeMap::new();
            for q in &standard.questions {
                *by_type.entry(q.question_type.to_string()).or_default() += 1;
            }
            rows.push(StandardBreakdown {
                document_key: key.clone(),
                standard_id: standard.standard_id.clone(),
                total: standard.questions.len(),
                by_type,
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::tests::{assessment, info, question, sample};
    use crate::model::{Difficulty, Feasibility, QuestionType};

    fn mixed() -> QuestionCollection {
        let mut coll = sample();
        coll.append_result(
            &info("Science", "Grade 2"),
            "2.1",
            assessment("2.1", Feasibility::PartiallyFeasible),
            vec![
                question("2.1", "Plants need sunlight.", QuestionType::TrueFalse, None),
                question(
                    "2.1",
                    "Name a mammal.",
                    QuestionType::ShortAnswer,
                    Some(Difficulty::Hard),
                ),
            ],
        )
        .unwrap();
        coll.append_result(
            &info("Science", "Grade 2"),
            "2.2",
            assessment("2.2", Feasibility::NotFeasible),
            vec![],
        )
        .unwrap();
        coll
    }

    #[test]
    fn empty_collection_has_zero_average() {
        let stats = compute_statistics(&QuestionCollection::new());
        assert_eq!(stats.total_standards, 0);
        assert_eq!(stats.avg_questions_per_standard, 0.0);
        assert!(stats.most_common_type().is_none());
    }

    #[test]
    fn counts_sum_consistently() {
        let coll = mixed();
        let stats = compute_statistics(&coll);

        let per_standard: usize = coll
            .documents()
            .flat_map(|(_, d)| d.standards.iter())
            .map(|s| s.questions.len())
            .sum();

        assert_eq!(stats.total_questions, 4);
        assert_eq!(stats.by_type.values().sum::<usize>(), stats.total_questions);
        assert_eq!(
            stats.by_difficulty.values().sum::<usize>(),
            stats.total_questions
        );
        assert_eq!(per_standard, stats.total_questions);
        assert_eq!(
            stats.by_feasibility.values().sum::<usize>(),
            stats.total_standards
        );
    }

    #[test]
    fn missing_difficulty_counts_as_unknown() {
        let stats = compute_statistics(&mixed());
        assert_eq!(stats.by_difficulty.get(UNKNOWN_DIFFICULTY), Some(&1));
        assert_eq!(stats.by_difficulty.get("hard"), Some(&1));
        assert_eq!(stats.by_feasibility.get("not_feasible"), Some(&1));
    }

    #[test]
    fn average_and_totals() {
        let stats = compute_statistics(&mixed());
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.total_standards, 3);
        assert!((stats.avg_questions_per_standard - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.most_common_type(), Some("multiple_choice"));
    }

    #[test]
    fn recomputation_is_stable() {
        let coll = mixed();
        assert_eq!(compute_statistics(&coll), compute_statistics(&coll));
    }

    #[test]
    fn breakdown_rows_per_standard() {
        let rows = standard_breakdown(&mixed());
        assert_eq!(rows.len(), 3);
        let science = rows.iter().find(|r| r.standard_id == "2.1").unwrap();
        assert_eq!(science.document_key, "Science_Grade 2");
        assert_eq!(science.total, 2);
        assert_eq!(science.count("true_false"), 1);
        assert_eq!(science.count("multiple_choice"), 0);
    }

    #[test]
    fn percentage_handles_zero_total() {
        assert_eq!(CollectionStats::percentage(3, 0), 0.0);
        assert!((CollectionStats::percentage(1, 4) - 25.0).abs() < 1e-9);
    }
}
