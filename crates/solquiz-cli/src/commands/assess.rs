//! The `solquiz assess` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use solquiz_core::standards::load_standards;
use solquiz_providers::config::load_config_from;

use super::{build_generator, find_document};

pub async fn execute(
    standards_path: PathBuf,
    document: String,
    standard_id: String,
    model: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let file = load_standards(&standards_path)?;
    let doc = find_document(&file, &document)?;
    let standard = doc
        .find_standard(&standard_id)
        .with_context(|| format!("standard '{standard_id}' not found in {}", doc.document_key()))?;

    let generator = build_generator(&config, model.as_deref(), false)?;
    let assessment = generator
        .assess_feasibility(standard, &doc.grade_level)
        .await?;

    println!("Standard:    {}", assessment.standard_id);
    println!("Feasibility: {}", assessment.feasibility);
    println!("Reasoning:   {}", assessment.reasoning);
    let suggested: Vec<&str> = assessment
        .suggested_question_types
        .iter()
        .map(|t| t.as_str())
        .collect();
    println!("Suggested:   {}", suggested.join(", "));
    println!("Visual aids: {}", yes_no(assessment.requires_visual_aids));
    println!("Hands-on:    {}", yes_no(assessment.requires_hands_on));

    let usage = generator.token_usage();
    eprintln!(
        "\nTokens: {} (${:.4})",
        usage.total_tokens, usage.estimated_cost_usd
    );
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
