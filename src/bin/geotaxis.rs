//! geotaxis - batch refinement and kinematic derivation of sea star tracks.
use anyhow::{bail, Context};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use geotaxis::catalog::SequenceCatalog;
use geotaxis::constants::{
    DEFAULT_FRAME_RATE, DERIVED_SUFFIX, HEADING_WINDOW, NORMALIZER_OUTLIER_QUANTILE, RAW_SUFFIX,
    REFINED_SUFFIX, SMOOTHING_WINDOW,
};
use geotaxis::params::{BatchPolicy, DeriveParams, RefineParams};
use geotaxis::pipeline::{derive_all, refine_all, BatchOutcome};
use geotaxis::report::{summarize_sequences, ReportConfig, SortOrder};

/// Refine pose-estimation tracks and derive sea star kinematics
#[derive(Parser, Debug)]
#[command(name = "geotaxis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Keep going when a sequence fails and report failures at the end
    #[arg(long, global = true)]
    keep_going: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Raw DeepLabCut exports -> refined tables
    Refine {
        /// Directory holding the raw CSV exports
        #[arg(short, long)]
        input: Utf8PathBuf,

        /// Output directory for refined tables
        #[arg(short, long)]
        output: Utf8PathBuf,

        /// Sequence catalog (CSV)
        #[arg(short, long)]
        catalog: Utf8PathBuf,

        /// Video frame rate (frames per second)
        #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
        frame_rate: f64,

        /// Quantile of the outlier fences
        #[arg(long, default_value_t = NORMALIZER_OUTLIER_QUANTILE)]
        quantile: f64,

        /// File-name suffix of raw exports
        #[arg(long, default_value = RAW_SUFFIX)]
        suffix: String,
    },

    /// Refined tables -> derived kinematics
    Derive {
        /// Directory holding the refined tables
        #[arg(short, long)]
        input: Utf8PathBuf,

        /// Output directory for derived tables
        #[arg(short, long)]
        output: Utf8PathBuf,

        /// Video frame rate (frames per second)
        #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
        frame_rate: f64,

        /// Frame span of the displacement heading
        #[arg(long, default_value_t = HEADING_WINDOW)]
        heading_win: usize,

        /// Width of the running mean applied to positions
        #[arg(long, default_value_t = SMOOTHING_WINDOW)]
        smoothing_window: usize,

        /// File-name suffix of refined tables
        #[arg(long, default_value = REFINED_SUFFIX)]
        suffix: String,
    },

    /// Summary table of derived sequences, ordered by slope angle
    Report {
        /// Directory holding the derived tables
        #[arg(short, long)]
        input: Utf8PathBuf,

        /// Sequence catalog (CSV)
        #[arg(short, long)]
        catalog: Utf8PathBuf,

        /// Axis margin, as a fraction of the largest range
        #[arg(long, default_value_t = 0.05)]
        buffer: f64,

        /// Decimal digits
        #[arg(long, default_value_t = 2)]
        precision: usize,

        /// Row order
        #[arg(long, value_enum, default_value_t = Order::Ascending)]
        order: Order,

        /// File-name suffix of derived tables
        #[arg(long, default_value = DERIVED_SUFFIX)]
        suffix: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Order {
    Ascending,
    Descending,
}

fn finish(stage: &str, outcome: BatchOutcome) -> anyhow::Result<()> {
    info!("{stage}: {outcome}");
    if !outcome.is_complete() {
        for (path, err) in &outcome.failed {
            warn!(file = %path, error = %err, "{stage} failed");
        }
        bail!("{stage}: {} sequence(s) failed", outcome.failed.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let policy = if cli.keep_going {
        BatchPolicy::Continue
    } else {
        BatchPolicy::FailFast
    };

    match cli.command {
        Commands::Refine {
            input,
            output,
            catalog,
            frame_rate,
            quantile,
            suffix,
        } => {
            let params = RefineParams::builder()
                .frame_rate(frame_rate)
                .outlier_quantile(quantile)
                .raw_suffix(suffix)
                .batch_policy(policy)
                .build()?;
            let catalog = SequenceCatalog::from_csv(&catalog)
                .with_context(|| format!("loading catalog {catalog}"))?;
            let outcome = refine_all(&input, &output, &catalog, &params)
                .with_context(|| format!("refining {input}"))?;
            finish("refine", outcome)?;
        }
        Commands::Derive {
            input,
            output,
            frame_rate,
            heading_win,
            smoothing_window,
            suffix,
        } => {
            let params = DeriveParams::builder()
                .frame_rate(frame_rate)
                .heading_win(heading_win)
                .smoothing_window(smoothing_window)
                .refined_suffix(suffix)
                .batch_policy(policy)
                .build()?;
            let outcome = derive_all(&input, &output, &params)
                .with_context(|| format!("deriving {input}"))?;
            finish("derive", outcome)?;
        }
        Commands::Report {
            input,
            catalog,
            buffer,
            precision,
            order,
            suffix,
        } => {
            let catalog = SequenceCatalog::from_csv(&catalog)
                .with_context(|| format!("loading catalog {catalog}"))?;
            let config = ReportConfig::default()
                .with_suffix(suffix)
                .with_axis_buffer(buffer)
                .with_precision(precision)
                .with_order(match order {
                    Order::Ascending => SortOrder::AngleAscending,
                    Order::Descending => SortOrder::AngleDescending,
                });
            let report = summarize_sequences(&input, &catalog, &config)
                .with_context(|| format!("summarizing {input}"))?;
            println!("{report}");
        }
    }

    Ok(())
}
