//! The `solquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use solquiz_core::standards::{load_standards, validate_standards};

pub fn execute(standards_path: PathBuf) -> Result<()> {
    let file = load_standards(&standards_path)?;

    for doc in &file.documents {
        println!(
            "Document: {} ({} standards)",
            doc.document_key(),
            doc.standards().count()
        );
    }

    let warnings = validate_standards(&file);
    for w in &warnings {
        let prefix = match (&w.document_key, &w.standard_id) {
            (Some(doc), Some(id)) => format!("  [{doc}/{id}]"),
            (Some(doc), None) => format!("  [{doc}]"),
            _ => "  ".to_string(),
        };
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Standards file valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
