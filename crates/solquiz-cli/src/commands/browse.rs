//! The `solquiz browse` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use solquiz_core::standards::load_standards;

use super::find_document;

pub fn execute(standards_path: PathBuf, document: Option<String>) -> Result<()> {
    let file = load_standards(&standards_path)?;

    let Some(selector) = document else {
        let mut table = Table::new();
        table.set_header(vec!["#", "Document", "Title", "Year", "Strands", "Standards"]);
        for (i, doc) in file.documents.iter().enumerate() {
            table.add_row(vec![
                i.to_string(),
                doc.document_key(),
                doc.title.clone(),
                doc.year.clone(),
                doc.strands.len().to_string(),
                doc.standards().count().to_string(),
            ]);
        }
        println!("{table}");
        return Ok(());
    };

    let doc = find_document(&file, &selector)?;
    println!("{} ({})", doc.title, doc.document_key());

    for strand in &doc.strands {
        println!("\n[{}] {}", strand.code, strand.name);
        for standard in &strand.standards {
            println!(
                "  {} ({} objectives): {}",
                standard.id,
                standard.objectives.len(),
                standard.statement
            );
        }
    }

    Ok(())
}
