//! The `solquiz list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use solquiz_providers::config::load_config_from;
use solquiz_providers::create_provider;

pub fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    let mut found_any = false;
    for name in names {
        if provider_filter.as_ref().is_some_and(|filter| filter != name) {
            continue;
        }

        let provider = match create_provider(name, &config.providers[name]) {
            Ok(provider) => provider,
            Err(e) => {
                eprintln!("Skipping provider {name}: {e:#}");
                continue;
            }
        };
        let models = provider.available_models();
        if models.is_empty() {
            continue;
        }

        found_any = true;
        let default_marker = |id: &str| {
            if *name == config.default_provider && id == config.default_model {
                " (default)"
            } else {
                ""
            }
        };
        println!("Provider: {name}");
        for model in &models {
            println!(
                "  {} — {} ({}K context, ${:.4}/{:.4} per 1K tokens){}",
                model.id,
                model.name,
                model.max_context / 1000,
                model.cost_per_1k_input,
                model.cost_per_1k_output,
                default_marker(&model.id),
            );
        }
        println!();
    }

    if !found_any {
        println!("No providers configured. Run `solquiz init` to create a config file.");
    }

    Ok(())
}
