mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ledger_types::{GrammarPolicy, Identifier};
use tracing_subscriber::EnvFilter;

use validate::cmd_validate;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Ledger JSON API payload toolkit.
#[derive(Parser)]
#[command(
    name = "ledger-json",
    version,
    about = "Validate ledger JSON API payloads"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate contracts (one object or an array) against the contract envelope
    Validate {
        /// Path to the JSON file holding the contracts
        file: PathBuf,
        /// Require every contract to belong to this template (packageId:moduleName:entityName)
        #[arg(long)]
        template: Option<Identifier>,
        /// Grammar policy for party names (unchecked or enforced).
        /// Defaults to $LEDGER_JSON_GRAMMAR, then unchecked.
        #[arg(long)]
        grammar: Option<GrammarPolicy>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            file,
            template,
            grammar,
        } => {
            let grammar = grammar.unwrap_or_else(GrammarPolicy::from_env);
            cmd_validate(&file, template.as_ref(), grammar, cli.output, cli.quiet);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
