//! The `solquiz review` command.

use std::path::PathBuf;

use anyhow::Result;

use solquiz_core::export::{load_collection, to_export};
use solquiz_report::text::render_questions;

use super::{collection_path, FilterArgs};

pub fn execute(
    collection: Option<PathBuf>,
    filter: FilterArgs,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let path = collection_path(collection, config_path.as_deref())?;
    let full = load_collection(&path)?;
    let view = filter.apply(&full);

    match format.as_str() {
        "text" => {
            if view.is_empty() {
                println!("No matching questions.");
            } else {
                print!("{}", render_questions(&view));
            }
            if !filter.is_empty() {
                eprintln!(
                    "\n{} of {} questions shown.",
                    view.total_questions(),
                    full.total_questions()
                );
            }
        }
        "json" => println!("{}", serde_json::to_string_pretty(&to_export(&view))?),
        other => anyhow::bail!("unknown format '{other}' (expected text or json)"),
    }

    Ok(())
}
