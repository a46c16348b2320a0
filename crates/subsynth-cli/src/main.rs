//! Subsynth CLI - offline host for the subsynth engine.

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "subsynth")]
#[command(author, version, about = "Polyphonic subtractive synthesizer", long_about = None)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a held chord to a WAV file
    Render(commands::render::RenderArgs),

    /// List the engine parameters
    Params(commands::params::ParamsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Params(args) => commands::params::run(args),
    }
}
