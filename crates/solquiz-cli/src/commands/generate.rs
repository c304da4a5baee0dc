//! The `solquiz generate` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use solquiz_core::error::QuizError;
use solquiz_core::generator::{DocumentBatch, GenerationProgress, StandardBatch};
use solquiz_core::model::{Question, QuestionType};
use solquiz_core::session::QuizSession;
use solquiz_core::standards::{load_standards, StandardsDocument};
use solquiz_providers::config::load_config_from;

use super::{build_generator, find_document};

pub struct GenerateArgs {
    pub standards: PathBuf,
    pub document: String,
    pub standard: Option<String>,
    pub max_standards: Option<usize>,
    pub questions: Option<usize>,
    pub types: Vec<QuestionType>,
    pub force: bool,
    pub collection: Option<PathBuf>,
    pub model: Option<String>,
    pub config: Option<PathBuf>,
}

/// Console progress reporter.
struct ConsoleProgress;

impl GenerationProgress for ConsoleProgress {
    fn on_standard_start(&self, standard_id: &str, position: usize, total: usize) {
        eprintln!("[{position}/{total}] {standard_id}");
    }

    fn on_question_done(&self, _standard_id: &str, index: usize, question: &Question) {
        eprintln!("  OK   #{} {}", index + 1, question.question_type);
    }

    fn on_question_failed(&self, _standard_id: &str, index: usize, error: &QuizError) {
        eprintln!("  FAIL #{}: {error}", index + 1);
    }

    fn on_standard_failed(&self, standard_id: &str, error: &QuizError) {
        eprintln!("  ERROR: {standard_id}: {error}");
    }

    fn on_standard_done(&self, batch: &StandardBatch) {
        match &batch.skipped_reason {
            Some(reason) => eprintln!("  Skipped: {reason}"),
            None => eprintln!(
                "  Done: {} ({}/{} questions)",
                batch.assessment.feasibility,
                batch.succeeded(),
                batch.requested
            ),
        }
    }
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let per_standard = args.questions.unwrap_or(config.questions_per_standard);
    anyhow::ensure!(per_standard >= 1, "questions must be at least 1");
    if let Some(max) = args.max_standards {
        anyhow::ensure!(max >= 1, "max-standards must be at least 1");
    }

    let file = load_standards(&args.standards)?;
    let doc = find_document(&file, &args.document)?;
    let doc = match &args.standard {
        Some(id) => single_standard(doc, id)?,
        None => doc.clone(),
    };

    let generator = build_generator(&config, args.model.as_deref(), args.force)?;
    let collection_path = args.collection.unwrap_or(config.collection_file);
    let mut session = QuizSession::load(&collection_path)?;

    eprintln!(
        "solquiz v{} — {} with {} (up to {per_standard} questions per standard)",
        env!("CARGO_PKG_VERSION"),
        doc.document_key(),
        generator.config().model,
    );
    eprintln!();

    let types = (!args.types.is_empty()).then_some(args.types.as_slice());
    let batch = generator
        .process_document(&doc, args.max_standards, per_standard, types, &ConsoleProgress)
        .await;

    let mut recorded = 0;
    for standard_batch in &batch.standards {
        recorded += session.record_batch(&batch.document_info, standard_batch)?;
    }
    if recorded > 0 {
        session.save(&collection_path)?;
    }

    print_summary(&batch);

    let usage = generator.token_usage();
    eprintln!(
        "\nGenerated {}/{} questions in {:.1}s",
        batch.succeeded(),
        batch.requested(),
        batch.duration_ms as f64 / 1000.0
    );
    eprintln!(
        "Tokens: {} (${:.4})",
        usage.total_tokens, usage.estimated_cost_usd
    );
    if recorded > 0 {
        eprintln!(
            "Collection saved to: {} ({} questions total)",
            collection_path.display(),
            session.collection().total_questions()
        );
    }

    Ok(())
}

/// A copy of `doc` holding only the standard `id`.
fn single_standard(doc: &StandardsDocument, id: &str) -> Result<StandardsDocument> {
    let mut only = doc.clone();
    for strand in &mut only.strands {
        strand.standards.retain(|s| s.id.eq_ignore_ascii_case(id));
    }
    only.strands.retain(|s| !s.standards.is_empty());
    anyhow::ensure!(
        !only.strands.is_empty(),
        "standard '{id}' not found in {}",
        doc.document_key()
    );
    Ok(only)
}

fn print_summary(batch: &DocumentBatch) {
    let mut table = Table::new();
    table.set_header(vec!["Standard", "Feasibility", "Generated", "Failed", "Note"]);

    for standard in &batch.standards {
        table.add_row(vec![
            standard.standard_id.clone(),
            standard.assessment.feasibility.to_string(),
            format!("{}/{}", standard.succeeded(), standard.requested),
            standard.failures.len().to_string(),
            standard.skipped_reason.clone().unwrap_or_default(),
        ]);
    }
    for failed in &batch.failed_standards {
        table.add_row(vec![
            failed.standard_id.clone(),
            "-".to_string(),
            "0/0".to_string(),
            "-".to_string(),
            failed.message.clone(),
        ]);
    }

    println!("{table}");
}
