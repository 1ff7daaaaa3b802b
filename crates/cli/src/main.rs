// Itemflow CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Support text/json output formats for scripting.
// Design Decision: Engine tuning comes from ITEMFLOW_* variables (and .env); flags override them.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use itemflow_core::telemetry::{init_telemetry, TelemetryConfig};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "itemflow")]
#[command(about = "Itemflow CLI - Process stored items concurrently")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, short, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed an in-memory store and process every item
    Run(commands::run::RunArgs),

    /// Check an address against the item email rules
    ValidateEmail {
        /// Address to check
        address: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut telemetry = TelemetryConfig::from_env();
    if cli.quiet && telemetry.log_filter.is_none() {
        telemetry.log_filter = Some("warn".to_string());
    }
    init_telemetry(telemetry);

    match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.output, cli.quiet).await,
        Commands::ValidateEmail { address } => {
            let valid = commands::validate::run(&address, cli.output)?;
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
