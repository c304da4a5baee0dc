//! The `solquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("solquiz.toml").exists() {
        println!("solquiz.toml already exists, skipping.");
    } else {
        std::fs::write("solquiz.toml", SAMPLE_CONFIG)?;
        println!("Created solquiz.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set OPENAI_API_KEY (or edit solquiz.toml)");
    println!("  2. Run: solquiz browse --standards standards.json");
    println!("  3. Run: solquiz generate --standards standards.json --document 0 --max-standards 1");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# solquiz configuration

default_provider = "openai"
default_model = "gpt-4o-mini"
assessment_temperature = 0.3
generation_temperature = 0.7
questions_per_standard = 3
max_retries = 3
retry_delay_ms = 1000
collection_file = "generated_questions.json"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"
"#;
