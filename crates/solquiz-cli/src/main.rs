//! solquiz CLI: generate, review and export quiz questions.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::FilterArgs;
use solquiz_core::model::QuestionType;

#[derive(Parser)]
#[command(
    name = "solquiz",
    version,
    about = "Quiz question generator for curriculum standards"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List documents, strands and standards in a standards file
    Browse {
        /// Standards JSON file
        #[arg(long)]
        standards: PathBuf,

        /// Document key (e.g. "Mathematics_Grade 1") or index
        #[arg(long)]
        document: Option<String>,
    },

    /// Parse a standards file and report problems
    Validate {
        /// Standards JSON file
        #[arg(long)]
        standards: PathBuf,
    },

    /// Assess whether one standard can be tested with text questions
    Assess {
        #[arg(long)]
        standards: PathBuf,

        /// Document key or index
        #[arg(long)]
        document: String,

        /// Standard ID (e.g. "1.NS.1")
        #[arg(long)]
        standard: String,

        /// Model to use (e.g. "openai/gpt-4o-mini")
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate questions and append them to the collection
    Generate {
        #[arg(long)]
        standards: PathBuf,

        /// Document key or index
        #[arg(long)]
        document: String,

        /// Only this standard
        #[arg(long)]
        standard: Option<String>,

        /// Process at most this many standards
        #[arg(long)]
        max_standards: Option<usize>,

        /// Questions per standard (default from config)
        #[arg(long)]
        questions: Option<usize>,

        /// Question types (comma-separated); defaults to the assessment's suggestions
        #[arg(long, value_delimiter = ',')]
        types: Vec<QuestionType>,

        /// Generate even for standards assessed as not feasible
        #[arg(long)]
        force: bool,

        /// Collection file (default from config)
        #[arg(long)]
        collection: Option<PathBuf>,

        /// Model to use (e.g. "anthropic/claude-sonnet-4-20250514")
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show collection questions, optionally filtered or searched
    Review {
        #[arg(long)]
        collection: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Delete questions by position
    Delete {
        #[arg(long)]
        collection: Option<PathBuf>,

        /// Document key
        #[arg(long)]
        document: String,

        /// Standard ID
        #[arg(long)]
        standard: String,

        /// Zero-based question positions (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        index: Vec<usize>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Merge another collection file into a base collection
    Merge {
        /// Base collection; its assessments win
        #[arg(long)]
        base: PathBuf,

        /// Collection to merge in
        #[arg(long)]
        incoming: PathBuf,

        /// Output file (defaults to the base file)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show collection statistics
    Stats {
        #[arg(long)]
        collection: Option<PathBuf>,

        /// Output format: table, json, text
        #[arg(long, default_value = "table")]
        format: String,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Export the collection, optionally filtered
    Export {
        #[arg(long)]
        collection: Option<PathBuf>,

        /// Output format: json, html, text
        #[arg(long, default_value = "json")]
        format: String,

        /// Output file
        #[arg(long)]
        output: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Remove every question from the collection
    Clear {
        #[arg(long)]
        collection: Option<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("solquiz=info".parse().unwrap())
                .add_directive("solquiz_core=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Browse {
            standards,
            document,
        } => commands::browse::execute(standards, document),
        Commands::Validate { standards } => commands::validate::execute(standards),
        Commands::Assess {
            standards,
            document,
            standard,
            model,
            config,
        } => commands::assess::execute(standards, document, standard, model, config).await,
        Commands::Generate {
            standards,
            document,
            standard,
            max_standards,
            questions,
            types,
            force,
            collection,
            model,
            config,
        } => {
            commands::generate::execute(commands::generate::GenerateArgs {
                standards,
                document,
                standard,
                max_standards,
                questions,
                types,
                force,
                collection,
                model,
                config,
            })
            .await
        }
        Commands::Review {
            collection,
            filter,
            format,
            config,
        } => commands::review::execute(collection, filter, format, config),
        Commands::Delete {
            collection,
            document,
            standard,
            index,
            config,
        } => commands::delete::execute(collection, document, standard, index, config),
        Commands::Merge {
            base,
            incoming,
            output,
        } => commands::merge::execute(base, incoming, output),
        Commands::Stats {
            collection,
            format,
            config,
        } => commands::stats::execute(collection, format, config),
        Commands::Export {
            collection,
            format,
            output,
            filter,
            config,
        } => commands::export::execute(collection, format, output, filter, config),
        Commands::Clear { collection, config } => commands::clear::execute(collection, config),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
