//! Promoclip CLI — render promotional text overlays onto video clips.
//!
//! Usage:
//!   promoclip render <INPUT> [--primary T] [--promo T] [--description T]
//!   promoclip filter [--primary T] [--promo T] [--description T]
//!   promoclip check

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "promoclip",
    about = "Render promotional text overlays onto video clips",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the overlay onto a clip
    Render {
        /// Input video file (.mp4 or .mov)
        input: PathBuf,

        /// Output file path (defaults next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Upper tagline text
        #[arg(long)]
        primary: Option<String>,

        /// Promo highlight text
        #[arg(long)]
        promo: Option<String>,

        /// Support message text
        #[arg(long)]
        description: Option<String>,
    },

    /// Print the compiled filter-graph expression
    Filter {
        /// Upper tagline text
        #[arg(long)]
        primary: Option<String>,

        /// Promo highlight text
        #[arg(long)]
        promo: Option<String>,

        /// Support message text
        #[arg(long)]
        description: Option<String>,
    },

    /// Check that the render engine and fonts are available
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = promoclip_common::config::AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    promoclip_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Render {
            input,
            output,
            primary,
            promo,
            description,
        } => commands::render::run(&config, input, output, primary, promo, description).await,
        Commands::Filter {
            primary,
            promo,
            description,
        } => commands::filter::run(primary, promo, description),
        Commands::Check => commands::check::run(&config),
    }
}
