//! lumalpha CLI - batch-convert images to PNG with luminance mapped into alpha.
//!
//! Every source image is decoded, its alpha channel recomputed from per-pixel
//! luminance, and the result written as `<name>.png` into an output folder.
//! A preview command renders the before/after panes without a batch run.
//!
//! # Usage
//!
//! ```bash
//! # Convert a folder
//! lumalpha convert ./scans -o ./out
//!
//! # Dark pixels opaque instead of bright ones
//! lumalpha convert ./scans -o ./out --polarity bright-transparent --threshold 200
//!
//! # Render a checkerboard preview of the first image in a folder
//! lumalpha preview ./scans --mode checkerboard --before before.png --after after.png
//!
//! # View configuration
//! lumalpha config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// lumalpha - Batch-convert images to PNG with luminance mapped into the alpha channel.
#[derive(Parser, Debug)]
#[command(name = "lumalpha")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert an image or a folder of images into PNGs with luminance alpha
    Convert(cli::convert::ConvertArgs),

    /// Render before/after preview panes for one image
    Preview(cli::preview::PreviewArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match lumalpha_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `lumalpha config path`."
            );
            lumalpha_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("lumalpha v{}", lumalpha_core::VERSION);

    match cli.command {
        Commands::Convert(args) => cli::convert::execute(args, config).await,
        Commands::Preview(args) => cli::preview::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
