//! The `lumalpha preview` command: render before/after panes to PNG files.

use clap::Args;
use lumalpha_core::{Config, Converter, DisplayBuffer, PngEncoder};
use std::path::{Path, PathBuf};

use super::convert::{Function, Mode};
use super::expand_path;

/// Arguments for the `preview` command.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Image file, or folder whose first image is previewed
    #[arg(required = true)]
    pub input: PathBuf,

    /// Display mode for the "after" pane
    #[arg(short, long, value_enum, default_value = "checkerboard")]
    pub mode: Mode,

    /// Processing function
    #[arg(long, value_enum, default_value = "luma-to-alpha")]
    pub function: Function,

    /// PNG file for the unprocessed image
    #[arg(long)]
    pub before: PathBuf,

    /// PNG file for the processed image
    #[arg(long)]
    pub after: PathBuf,
}

/// Execute the preview command.
pub async fn execute(args: PreviewArgs, config: Config) -> anyhow::Result<()> {
    let input = expand_path(&args.input);
    if !input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            input
        );
    }

    let converter = Converter::new(config);
    let pair = converter.preview(&input, args.mode.into(), args.function.into())?;

    let before = expand_path(&args.before);
    let after = expand_path(&args.after);
    write_pane(&pair.before, &before)?;
    write_pane(&pair.after, &after)?;

    tracing::info!(
        "Preview {}x{} written ({:?})",
        pair.after.width(),
        pair.after.height(),
        args.mode
    );
    println!("{}", before.display());
    println!("{}", after.display());
    Ok(())
}

fn write_pane(pane: &DisplayBuffer, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    PngEncoder::encode(pane, path)?;
    Ok(())
}
