//! The `solquiz export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use solquiz_core::export::{load_collection, save_collection};
use solquiz_report::html::write_html_report;
use solquiz_report::text::generate_text_report;

use super::{collection_path, FilterArgs};

pub fn execute(
    collection: Option<PathBuf>,
    format: String,
    output: PathBuf,
    filter: FilterArgs,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let path = collection_path(collection, config_path.as_deref())?;
    let view = filter.apply(&load_collection(&path)?);

    match format.as_str() {
        "json" => save_collection(&view, &output)?,
        "html" => write_html_report(&view, &output)?,
        "text" => {
            let report = generate_text_report(&view, chrono::Utc::now());
            std::fs::write(&output, report)
                .with_context(|| format!("failed to write report: {}", output.display()))?;
        }
        other => anyhow::bail!("unknown format '{other}' (expected json, html or text)"),
    }

    println!(
        "Exported {} question(s) from {} document(s) to {}",
        view.total_questions(),
        view.len(),
        output.display()
    );
    Ok(())
}
