//! HTML view of a question collection.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use solquiz_core::collection::QuestionCollection;
use solquiz_core::model::{Difficulty, Feasibility, Question, StandardEntry};
use solquiz_core::statistics::{compute_statistics, CollectionStats};

use crate::text::title_case;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Badge colour for a feasibility verdict.
pub fn feasibility_color(feasibility: Feasibility) -> &'static str {
    match feasibility {
        Feasibility::Feasible => "#28a745",
        Feasibility::PartiallyFeasible => "#ffc107",
        Feasibility::NotFeasible => "#dc3545",
    }
}

fn difficulty_class(difficulty: Option<Difficulty>) -> &'static str {
    match difficulty {
        Some(Difficulty::Easy) => "easy",
        Some(Difficulty::Medium) => "medium",
        Some(Difficulty::Hard) => "hard",
        None => "unknown",
    }
}

/// Generate an HTML page for a collection.
pub fn generate_html(collection: &QuestionCollection) -> String {
    let stats = compute_statistics(collection);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>solquiz questions</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>solquiz questions</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} documents | {} standards | {} questions | {}</p>\n",
        stats.total_documents,
        stats.total_standards,
        stats.total_questions,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str(&summary_section(&stats));

    for (key, doc) in collection.documents() {
        html.push_str(&format!(
            "<section class=\"document\" id=\"{}\">\n",
            html_escape(key)
        ));
        html.push_str(&format!(
            "<h2>{} — {}</h2>\n",
            html_escape(&doc.document_info.course_name),
            html_escape(&doc.document_info.grade_level)
        ));
        if !doc.document_info.title.is_empty() {
            html.push_str(&format!(
                "<p class=\"meta\">{} {}</p>\n",
                html_escape(&doc.document_info.title),
                html_escape(&doc.document_info.year)
            ));
        }
        for standard in &doc.standards {
            html.push_str(&standard_card(standard));
        }
        html.push_str("</section>\n");
    }

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(collection).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

fn summary_section(stats: &CollectionStats) -> String {
    let mut html = String::from("<section class=\"dashboard\">\n<h2>Summary</h2>\n");
    html.push_str("<div class=\"metrics\">\n");
    for (label, value) in [
        ("Documents", stats.total_documents.to_string()),
        ("Standards", stats.total_standards.to_string()),
        ("Questions", stats.total_questions.to_string()),
        (
            "Avg per standard",
            format!("{:.2}", stats.avg_questions_per_standard),
        ),
    ] {
        html.push_str(&format!(
            "<div class=\"metric\"><span class=\"value\">{value}</span><span class=\"label\">{label}</span></div>\n"
        ));
    }
    html.push_str("</div>\n");

    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Question type</th><th>Count</th><th>Share</th></tr></thead>\n<tbody>\n");
    for (name, count) in &stats.by_type {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{count}</td><td>{:.1}%</td></tr>\n",
            html_escape(&title_case(name)),
            CollectionStats::percentage(*count, stats.total_questions)
        ));
    }
    html.push_str("</tbody></table>\n</section>\n");
    html
}

fn standard_card(standard: &StandardEntry) -> String {
    let assessment = &standard.assessment;
    let mut html = String::from("<article class=\"standard\">\n");
    html.push_str(&format!(
        "<h3>{} <span class=\"badge\" style=\"background:{}\">{}</span></h3>\n",
        html_escape(&standard.standard_id),
        feasibility_color(assessment.feasibility),
        title_case(assessment.feasibility.as_str())
    ));
    if !assessment.reasoning.is_empty() {
        html.push_str(&format!(
            "<p class=\"reasoning\">{}</p>\n",
            html_escape(&assessment.reasoning)
        ));
    }
    for (i, question) in standard.questions.iter().enumerate() {
        html.push_str(&question_card(i, question));
    }
    html.push_str("</article>\n");
    html
}

fn question_card(index: usize, q: &Question) -> String {
    let difficulty = difficulty_class(q.difficulty_level);
    let mut html = format!(
        "<div class=\"question {difficulty}\" data-type=\"{}\">\n",
        q.question_type
    );
    html.push_str(&format!(
        "<p><span class=\"num\">{}.</span> <span class=\"type\">{}</span> <span class=\"difficulty\">{}</span></p>\n",
        index + 1,
        title_case(q.question_type.as_str()),
        title_case(difficulty)
    ));
    html.push_str(&format!(
        "<p class=\"text\">{}</p>\n",
        html_escape(&q.question_text)
    ));
    match &q.options {
        Some(options) => {
            html.push_str("<ol class=\"options\" type=\"A\">\n");
            for option in options {
                let class = if *option == q.correct_answer {
                    " class=\"correct\""
                } else {
                    ""
                };
                html.push_str(&format!("<li{class}>{}</li>\n", html_escape(option)));
            }
            html.push_str("</ol>\n");
        }
        None => html.push_str(&format!(
            "<p class=\"answer\">Answer: <strong>{}</strong></p>\n",
            html_escape(&q.correct_answer)
        )),
    }
    if let Some(explanation) = &q.explanation {
        html.push_str(&format!(
            "<details><summary>Explanation</summary><p>{}</p></details>\n",
            html_escape(explanation)
        ));
    }
    html.push_str("</div>\n");
    html
}

/// Write an HTML page to a file.
pub fn write_html_report(collection: &QuestionCollection, path: &Path) -> Result<()> {
    let html = generate_html(collection);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --correct: #dcfce7; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --correct: #064e3b; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.metrics { display: flex; gap: 1rem; flex-wrap: wrap; }
.metric { border: 1px solid var(--border); border-radius: 8px; padding: 1rem 1.5rem; display: flex; flex-direction: column; }
.metric .value { font-size: 1.6rem; font-weight: bold; }
.metric .label { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.standard { border: 1px solid var(--border); border-radius: 8px; padding: 0.5rem 1rem; margin: 1rem 0; }
.badge { color: #fff; border-radius: 4px; padding: 0.1rem 0.5rem; font-size: 0.8rem; }
.question { border-left: 4px solid var(--border); padding-left: 1rem; margin: 1rem 0; }
.question.easy { border-left-color: #28a745; }
.question.medium { border-left-color: #ffc107; }
.question.hard { border-left-color: #dc3545; }
.type, .difficulty { color: #6b7280; font-size: 0.85rem; }
.correct { background: var(--correct); font-weight: bold; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 0.5rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

const JS: &str = r#"
document.querySelectorAll('.options').forEach(list => {
  list.addEventListener('dblclick', () => list.classList.toggle('reveal'));
});
"#;
