//! CLI entry point for the sales summary tool.
//!
//! Loads a sales CSV from a file or URL, validates it, and reports the median
//! unit cost, most common region, order date span and total revenue.

use anyhow::{Result, bail};
use bytes::Bytes;
use clap::{Parser, Subcommand, ValueEnum};
use sales_summary::{
    cancel::CancelFlag,
    config::AppConfig,
    error::SummaryError,
    fetch::{Upload, load_source},
    output::{ResultEnvelope, append_record, print_json, print_pretty},
    policy::PolicyError,
    summary::{MedianStrategy, SalesSummary, summarize_reader},
    validate::validate_upload,
};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "sales_summary")]
#[command(about = "Summarize a sales CSV in a single pass", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Streaming dual-heap median
    Heap,
    /// Buffered quickselect median
    Select,
}

impl From<StrategyArg> for MedianStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Heap => MedianStrategy::DualHeap,
            StrategyArg::Select => MedianStrategy::QuickSelect,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a sales dataset from a file or URL
    Summarize {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Median computation to use
        #[arg(short, long, value_enum, default_value_t = StrategyArg::Heap)]
        strategy: StrategyArg,

        /// Optional: CSV report file to append the summary to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Run both median strategies over a dataset and check that they agree
    Compare {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let config = AppConfig::from_env()?;
    let _file_guard = init_logging(&config.log_file_path);

    let cli = Cli::parse();

    match cli.command {
        Commands::Summarize {
            source,
            strategy,
            output,
        } => {
            summarize_command(&config, &source, strategy.into(), output.as_deref()).await?;
        }
        Commands::Compare { source } => {
            compare_command(&config, &source).await?;
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_logging(log_file_path: &str) -> WorkerGuard {
    let log_dir = Path::new(log_file_path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("sales_summary.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(LevelFilter::INFO.into()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive(LevelFilter::DEBUG.into()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}

/// Loads a source and rejects it, reporting every validation issue, if it
/// does not look like an acceptable CSV upload.
async fn load_validated(config: &AppConfig, source: &str) -> Result<Upload> {
    let upload = load_source(source, config.policy.timeout).await?;

    let issues = validate_upload(&upload, &config.upload);
    if !issues.is_empty() {
        for issue in &issues {
            warn!(name = %upload.name, issue = %issue, "Upload rejected");
        }
        print_json(&ResultEnvelope::<SalesSummary>::failure(&issues))?;
        bail!("{} rejected: {} validation issue(s)", upload.name, issues.len());
    }

    info!(name = %upload.name, bytes = upload.bytes.len(), "Upload accepted");
    Ok(upload)
}

/// Runs one aggregation on a blocking worker so row decoding never stalls
/// the async runtime.
async fn run_attempt(
    bytes: Bytes,
    strategy: MedianStrategy,
    cancel: CancelFlag,
) -> Result<SalesSummary, SummaryError> {
    tokio::task::spawn_blocking(move || summarize_reader(bytes.as_ref(), strategy, &cancel))
        .await
        .map_err(|e| SummaryError::internal(format!("summary worker failed: {e}")))?
}

/// Summarizes a dataset under the configured retry/timeout policy, with
/// Ctrl-C cancelling the run.
#[tracing::instrument(skip_all, fields(source = %source, strategy = %strategy))]
async fn summarize_command(
    config: &AppConfig,
    source: &str,
    strategy: MedianStrategy,
    output: Option<&str>,
) -> Result<()> {
    let upload = load_validated(config, source).await?;

    let cancel = CancelFlag::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling summary run");
                cancel.cancel();
            }
        }
    });

    let started = Instant::now();
    let result = config
        .policy
        .run(&cancel, |attempt| run_attempt(upload.bytes.clone(), strategy, attempt))
        .await;
    interrupt.abort();

    match result {
        Ok(summary) => {
            info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                median_unit_cost = %summary.median_unit_cost,
                most_common_region = %summary.most_common_region,
                "Summary computed"
            );
            print_pretty(&summary);

            if let Some(path) = output {
                append_record(path, &summary)?;
                info!(path, "Summary appended to report");
            }

            print_json(&ResultEnvelope::ok(summary))?;
            Ok(())
        }
        Err(err) => {
            let detail = match &err {
                PolicyError::Failed(inner) => inner.detail(),
                _ => None,
            };
            error!(error = %err, detail, "Summary run failed");
            print_json(&ResultEnvelope::<SalesSummary>::failure([&err]))?;
            Err(err.into())
        }
    }
}

/// Cross-checks the two median strategies on one dataset.
#[tracing::instrument(skip_all, fields(source = %source))]
async fn compare_command(config: &AppConfig, source: &str) -> Result<()> {
    let upload = load_validated(config, source).await?;
    let cancel = CancelFlag::new();

    let heap = run_attempt(upload.bytes.clone(), MedianStrategy::DualHeap, cancel.clone()).await?;
    let select = run_attempt(upload.bytes, MedianStrategy::QuickSelect, cancel).await?;

    if heap != select {
        error!(
            heap_median = %heap.median_unit_cost,
            select_median = %select.median_unit_cost,
            "Median strategies disagree"
        );
        bail!("median strategies disagree");
    }

    info!(median_unit_cost = %heap.median_unit_cost, "Median strategies agree");
    print_json(&ResultEnvelope::ok(heap))?;
    Ok(())
}
