//! The `solquiz stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use solquiz_core::export::load_collection;
use solquiz_core::statistics::{compute_statistics, standard_breakdown, CollectionStats};
use solquiz_report::text::{generate_text_report, title_case};

use super::collection_path;

pub fn execute(
    collection: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let path = collection_path(collection, config_path.as_deref())?;
    let collection = load_collection(&path)?;

    match format.as_str() {
        "table" => print_tables(&collection),
        "json" => {
            let stats = compute_statistics(&collection);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        "text" => print!("{}", generate_text_report(&collection, chrono::Utc::now())),
        other => anyhow::bail!("unknown format '{other}' (expected table, json or text)"),
    }
    Ok(())
}

fn print_tables(collection: &solquiz_core::collection::QuestionCollection) {
    let stats = compute_statistics(collection);

    let mut summary = Table::new();
    summary.set_header(vec!["Metric", "Value"]);
    summary.add_row(vec!["Documents".to_string(), stats.total_documents.to_string()]);
    summary.add_row(vec!["Standards".to_string(), stats.total_standards.to_string()]);
    summary.add_row(vec!["Questions".to_string(), stats.total_questions.to_string()]);
    summary.add_row(vec![
        "Avg per standard".to_string(),
        format!("{:.1}", stats.avg_questions_per_standard),
    ]);
    summary.add_row(vec![
        "Most common type".to_string(),
        stats
            .most_common_type()
            .map(title_case)
            .unwrap_or_else(|| "-".to_string()),
    ]);
    println!("{summary}");

    let mut by_type = Table::new();
    by_type.set_header(vec!["Question Type", "Count", "Share"]);
    for (name, count) in &stats.by_type {
        by_type.add_row(vec![
            title_case(name),
            count.to_string(),
            format!(
                "{:.1}%",
                CollectionStats::percentage(*count, stats.total_questions)
            ),
        ]);
    }
    println!("{by_type}");

    let rows = standard_breakdown(collection);
    if !rows.is_empty() {
        let mut per_standard = Table::new();
        per_standard.set_header(vec![
            "Document",
            "Standard",
            "Total",
            "MC",
            "Fill",
            "T/F",
            "Short",
        ]);
        for row in &rows {
            per_standard.add_row(vec![
                row.document_key.clone(),
                row.standard_id.clone(),
                row.total.to_string(),
                row.count("multiple_choice").to_string(),
                row.count("fill_in_blank").to_string(),
                row.count("true_false").to_string(),
                row.count("short_answer").to_string(),
            ]);
        }
        println!("{per_standard}");
    }
}
