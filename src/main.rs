// main.rs
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kakijun::cli::{self, Args, Commands};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kakijun=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let data_dir = args.data_dir;

    match args.command {
        Commands::Analyze { start, end, width, height } => {
            cli::handle_analyze(start, end, width, height, data_dir)
        }
        Commands::Recognize { file } => cli::handle_recognize(&file, data_dir),
        Commands::Teach { file, character } => cli::handle_teach(&file, &character, data_dir),
        Commands::Correct { session_id, character } => {
            cli::handle_correct(&session_id, &character, data_dir)
        }
        Commands::Stats => cli::handle_stats(data_dir),
        Commands::Reset => cli::handle_reset(data_dir),
        Commands::Database => cli::handle_database(data_dir),
    }
}
