//! The `solquiz merge` command.

use std::path::PathBuf;

use anyhow::{bail, Result};

use solquiz_core::export::load_collection;
use solquiz_core::session::QuizSession;

pub fn execute(base: PathBuf, incoming: PathBuf, output: Option<PathBuf>) -> Result<()> {
    // A missing base is only allowed when writing somewhere else.
    if output.is_none() && !base.exists() {
        bail!(
            "base collection {} does not exist (pass --output to start a new file)",
            base.display()
        );
    }

    let mut session = QuizSession::load(&base)?;
    let before = session.collection().total_questions();
    let other = load_collection(&incoming)?;

    session.import(&other);

    let output = output.unwrap_or(base);
    session.save(&output)?;

    let merged = session.collection();
    println!(
        "Merged {} question(s) from {} into {} ({} documents, {} questions total).",
        merged.total_questions() - before,
        incoming.display(),
        output.display(),
        merged.len(),
        merged.total_questions()
    );
    Ok(())
}
