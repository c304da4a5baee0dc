//! The `solquiz clear` command.

use std::path::PathBuf;

use anyhow::Result;

use solquiz_core::session::QuizSession;

use super::collection_path;

pub fn execute(collection: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let path = collection_path(collection, config_path.as_deref())?;
    let mut session = QuizSession::load(&path)?;
    let removed = session.collection().total_questions();

    session.clear();
    session.save(&path)?;

    println!("Cleared {removed} question(s) from {}.", path.display());
    Ok(())
}
