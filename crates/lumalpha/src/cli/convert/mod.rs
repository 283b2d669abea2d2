//! The `lumalpha convert` command for batch conversion.

mod progress;
pub mod types;

pub use types::{Function, Mode, Polarity, ReportFormat};

use clap::Args;
use lumalpha_core::{
    BatchReport, CancelToken, Config, Converter, DiscoveryError, InputSpec, LumalphaError,
    OutputFormat, OutputWriter, ProcessingRequest, Progress, ProgressObserver, TransformResult,
};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use progress::{print_summary, BarObserver};

use super::expand_path;

/// Arguments for the `convert` command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Image file or folder to convert
    #[arg(required = true)]
    pub input: PathBuf,

    /// Folder to write `<name>.png` files into (created if missing)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Processing function
    #[arg(long, value_enum, default_value = "luma-to-alpha")]
    pub function: Function,

    /// Number of images converted at once (overrides config)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Which end of the luminance range becomes opaque (overrides config)
    #[arg(long, value_enum)]
    pub polarity: Option<Polarity>,

    /// Luminance where bright-transparent starts fading out (overrides config)
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Multiply the computed alpha by the source alpha
    #[arg(long)]
    pub preserve_alpha: bool,

    /// Print a machine-readable report on stdout
    #[arg(long, value_enum)]
    pub report: Option<ReportFormat>,
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs, mut config: Config) -> anyhow::Result<()> {
    let input = expand_path(&args.input);
    if !input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            input
        );
    }
    apply_overrides(&args, &mut config)?;

    let request = ProcessingRequest {
        input: InputSpec::from_path(&input),
        output_folder: expand_path(&args.output),
        function: args.function.into(),
    };
    let converter = Converter::new(config);

    // JSONL reports stream one line per file as the batch runs.
    let stream = matches!(args.report, Some(ReportFormat::Jsonl))
        .then(|| Mutex::new(OutputWriter::new(io::stdout(), OutputFormat::JsonLines, false)));

    let Some(report) = run(&converter, &request, stream.as_ref()).await? else {
        return Ok(());
    };

    print_summary(&report);
    if let Some(stream) = stream {
        let mut writer = stream
            .into_inner()
            .map_err(|_| anyhow::anyhow!("Report writer poisoned"))?;
        writer.write_summary(&report)?;
        writer.flush()?;
        tracing::debug!("Report: {} line(s) written", writer.items_written());
    } else if let Some(format) = args.report {
        let stdout = io::stdout();
        let mut writer = OutputWriter::new(BufWriter::new(stdout.lock()), format.into(), true);
        writer.write_report(&report)?;
        writer.flush()?;
    }

    if report.cancelled {
        tracing::warn!(
            "Interrupted: {} of {} image(s) were not converted",
            report.requested - report.total,
            report.requested
        );
    }
    if report.failed > 0 {
        anyhow::bail!(
            "{} of {} image(s) failed to convert",
            report.failed,
            report.total
        );
    }
    Ok(())
}

/// Fold CLI flags into the loaded config and re-validate.
fn apply_overrides(args: &ConvertArgs, config: &mut Config) -> anyhow::Result<()> {
    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }
    if let Some(polarity) = args.polarity {
        config.transform.polarity = polarity.into();
    }
    if let Some(threshold) = args.threshold {
        config.transform.threshold = threshold;
    }
    if args.preserve_alpha {
        config.transform.preserve_source_alpha = true;
    }
    config.validate()?;
    Ok(())
}

/// Run the batch with a progress bar and Ctrl-C cancellation, streaming each
/// result to `stream` when one is given.
///
/// Returns `None` when there was nothing to convert.
async fn run<W: Write + Send>(
    converter: &Converter,
    request: &ProcessingRequest,
    stream: Option<&Mutex<OutputWriter<W>>>,
) -> anyhow::Result<Option<BatchReport>> {
    let cancel = CancelToken::new();
    let signal_token = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, discarding images not yet written");
            signal_token.cancel();
        }
    });

    let bar = BarObserver::new()?;
    let observer = |progress: &Progress| {
        bar.on_progress(progress);
        if let Some(stream) = stream {
            stream_result(stream, &progress.outcome);
        }
    };
    let result = converter.convert(request, &cancel, &observer).await;
    bar.finish();
    ctrl_c.abort();

    match result {
        Ok(report) => Ok(Some(report)),
        Err(LumalphaError::Discovery(DiscoveryError::NoImagesFound(path))) => {
            tracing::warn!("No supported image files found at {:?}", path);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn stream_result<W: Write>(stream: &Mutex<OutputWriter<W>>, result: &TransformResult) {
    let Ok(mut writer) = stream.lock() else {
        return;
    };
    if let Err(e) = writer.write_result(result).and_then(|_| writer.flush()) {
        tracing::warn!("Failed to write report line for {:?}: {}", result.source, e);
    }
}
