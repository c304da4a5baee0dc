//! The `solquiz delete` command.

use std::path::PathBuf;

use anyhow::Result;

use solquiz_core::export::load_collection;
use solquiz_core::session::QuizSession;

use super::collection_path;

pub fn execute(
    collection: Option<PathBuf>,
    document: String,
    standard: String,
    indices: Vec<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let path = collection_path(collection, config_path.as_deref())?;
    let mut session = QuizSession::with_collection(load_collection(&path)?);

    let removed = session.delete_questions(&document, &standard, &indices)?;
    session.save(&path)?;

    for question in &removed {
        println!("Deleted: [{}] {}", question.question_type, question.question_text);
    }
    println!(
        "{} question(s) removed from {document}/{standard}. {} remain in the collection.",
        removed.len(),
        session.collection().total_questions()
    );
    Ok(())
}
