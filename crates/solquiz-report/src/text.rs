//! Plain-text summary report and question listing.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use solquiz_core::collection::QuestionCollection;
use solquiz_core::model::{Difficulty, Question};
use solquiz_core::statistics::{compute_statistics, CollectionStats};

/// `"fill_in_blank"` becomes `"Fill In Blank"`.
pub fn title_case(s: &str) -> String {
    s.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// One-character marker for a difficulty rating.
pub fn difficulty_marker(difficulty: Option<Difficulty>) -> &'static str {
    match difficulty {
        Some(Difficulty::Easy) => "[E]",
        Some(Difficulty::Medium) => "[M]",
        Some(Difficulty::Hard) => "[H]",
        None => "[?]",
    }
}

fn section(out: &mut String, heading: &str) {
    let _ = write!(out, "\n{heading}\n{}\n", "-".repeat(heading.len()));
}

fn breakdown(out: &mut String, counts: &std::collections::BTreeMap<String, usize>, total: usize) {
    for (name, count) in counts {
        let _ = writeln!(
            out,
            "{}: {count} ({:.1}%)",
            title_case(name),
            CollectionStats::percentage(*count, total)
        );
    }
}

/// Summary report with totals and percentage breakdowns.
pub fn generate_text_report(collection: &QuestionCollection, generated_at: DateTime<Utc>) -> String {
    let stats = compute_statistics(collection);
    let mut out = String::new();

    out.push_str("SOL QUIZ GENERATOR REPORT\n");
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));

    section(&mut out, "SUMMARY");
    let _ = writeln!(out, "Total Documents: {}", stats.total_documents);
    let _ = writeln!(out, "Total Standards: {}", stats.total_standards);
    let _ = writeln!(out, "Total Questions: {}", stats.total_questions);
    let _ = writeln!(
        out,
        "Avg Questions per Standard: {:.2}",
        stats.avg_questions_per_standard
    );

    section(&mut out, "QUESTIONS BY TYPE");
    breakdown(&mut out, &stats.by_type, stats.total_questions);

    section(&mut out, "QUESTIONS BY DIFFICULTY");
    breakdown(&mut out, &stats.by_difficulty, stats.total_questions);

    section(&mut out, "STANDARDS BY FEASIBILITY");
    breakdown(&mut out, &stats.by_feasibility, stats.total_standards);

    out
}

fn render_question(out: &mut String, index: usize, q: &Question) {
    let _ = writeln!(
        out,
        "  {index}. {} {} {}",
        difficulty_marker(q.difficulty_level),
        title_case(q.question_type.as_str()),
        q.question_text
    );
    if let Some(options) = &q.options {
        for option in options {
            let mark = if *option == q.correct_answer { "*" } else { " " };
            let _ = writeln!(out, "     {mark} {option}");
        }
    }
    let _ = writeln!(out, "     Answer: {}", q.correct_answer);
    if let Some(explanation) = &q.explanation {
        let _ = writeln!(out, "     Why: {explanation}");
    }
}

/// Every question, grouped by document and standard.
///
/// Question numbers are the zero-based positions used for deletion.
pub fn render_questions(collection: &QuestionCollection) -> String {
    let mut out = String::new();
    for (key, doc) in collection.documents() {
        let _ = writeln!(out, "{key} ({} questions)", doc.question_count());
        for standard in &doc.standards {
            let _ = writeln!(
                out,
                "\n Standard {} [{}]",
                standard.standard_id,
                title_case(standard.assessment.feasibility.as_str())
            );
            if !standard.assessment.reasoning.is_empty() {
                let _ = writeln!(out, "  {}", standard.assessment.reasoning);
            }
            for (i, q) in standard.questions.iter().enumerate() {
                render_question(&mut out, i, q);
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use solquiz_core::model::{Assessment, DocumentInfo, Feasibility, QuestionType};

    fn collection() -> QuestionCollection {
        let mut coll = QuestionCollection::new();
        let info = DocumentInfo {
            title: "Mathematics Standards of Learning".into(),
            grade_level: "Grade 1".into(),
            course_name: "Mathematics".into(),
            year: "2023".into(),
        };
        coll.append_result(
            &info,
            "1.ns.1",
            Assessment {
                standard_id: "1.ns.1".into(),
                feasibility: Feasibility::PartiallyFeasible,
                reasoning: "Counting aloud works in text.".into(),
                suggested_question_types: vec![],
                requires_visual_aids: false,
                requires_hands_on: false,
            },
            vec![
                Question {
                    standard_id: "1.ns.1".into(),
                    question_type: QuestionType::MultipleChoice,
                    question_text: "What comes after 9?".into(),
                    correct_answer: "10".into(),
                    options: Some(vec!["8".into(), "10".into()]),
                    explanation: Some("Count up by one.".into()),
                    difficulty_level: Some(Difficulty::Easy),
                },
                Question {
                    standard_id: "1.ns.1".into(),
                    question_type: QuestionType::FillInBlank,
                    question_text: "5 + _____ = 7".into(),
                    correct_answer: "2".into(),
                    options: None,
                    explanation: None,
                    difficulty_level: None,
                },
            ],
        )
        .unwrap();
        coll
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("fill_in_blank"), "Fill In Blank");
        assert_eq!(title_case("not_feasible"), "Not Feasible");
        assert_eq!(title_case("EASY"), "Easy");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn report_has_sections_and_percentages() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let report = generate_text_report(&collection(), at);
        assert!(report.contains("Generated: 2024-05-01 12:30:00"));
        assert!(report.contains("Total Questions: 2"));
        assert!(report.contains("Avg Questions per Standard: 2.00"));
        assert!(report.contains("Multiple Choice: 1 (50.0%)"));
        assert!(report.contains("Unknown: 1 (50.0%)"));
        assert!(report.contains("Partially Feasible: 1 (100.0%)"));
    }

    #[test]
    fn empty_report_has_zero_totals() {
        let report = generate_text_report(&QuestionCollection::new(), Utc::now());
        assert!(report.contains("Total Documents: 0"));
        assert!(report.contains("Avg Questions per Standard: 0.00"));
    }

    #[test]
    fn listing_marks_correct_option() {
        let listing = render_questions(&collection());
        assert!(listing.contains("Standard 1.ns.1 [Partially Feasible]"));
        assert!(!listing.contains("1.NS.1"));
        assert!(listing.contains("0. [E] Multiple Choice What comes after 9?"));
        assert!(listing.contains("* 10"));
        assert!(listing.contains("1. [?] Fill In Blank 5 + _____ = 7"));
        assert!(listing.contains("Why: Count up by one."));
    }
}
