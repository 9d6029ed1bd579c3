use std::path::PathBuf;

use bioinv_core::config::{default_concurrency, parse_dedup_keys};
use bioinv_core::PipelineConfig;
use clap::{Args, Parser, Subcommand};

mod inventory;
mod io;
mod query;
mod resolve;
mod verify;

#[cfg(test)]
mod tests;

#[derive(Debug, Parser)]
#[command(name = "bioinv")]
#[command(about = "Biodata resource inventory pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// HTTP client settings shared by every network-facing command.
#[derive(Debug, Args)]
struct HttpOpts {
    /// HTTP request timeout in seconds
    #[arg(long, env = "BIOINV_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// User-Agent header sent with outbound requests
    #[arg(
        long,
        env = "BIOINV_USER_AGENT",
        default_value = "bioinv/0.1 (biodata-resource-inventory)"
    )]
    user_agent: String,
}

/// URL verification settings.
#[derive(Debug, Args)]
struct VerifyOpts {
    /// Total attempts per URL liveness check
    #[arg(long, env = "BIOINV_NUM_TRIES", default_value_t = 3)]
    num_tries: u32,

    /// Base back-off in seconds; the wait doubles after each failed attempt
    #[arg(long, env = "BIOINV_BACKOFF_FACTOR", default_value_t = 0.5)]
    backoff_factor: f64,

    /// Maximum simultaneously in-flight URL checks (default: available
    /// parallelism of the host)
    #[arg(long, env = "BIOINV_CONCURRENCY_LIMIT")]
    concurrency_limit: Option<usize>,

    /// Override the archive availability API base URL
    #[arg(long, env = "BIOINV_ARCHIVE_BASE_URL")]
    archive_base_url: Option<String>,
}

/// Filtering, name resolution, and deduplication settings.
#[derive(Debug, Args)]
struct FilterOpts {
    /// Minimum extracted URLs for a record to be kept
    #[arg(long, env = "BIOINV_MIN_URLS", default_value_t = 1)]
    min_urls: usize,

    /// Maximum extracted URLs for a record to be kept
    #[arg(long, env = "BIOINV_MAX_URLS", default_value_t = 2)]
    max_urls: usize,

    /// Best-name probability threshold for auto-acceptance
    #[arg(long, env = "BIOINV_MIN_PROB", default_value_t = 0.9)]
    min_prob: f64,

    /// Comma-separated dedup keys: best_name, common_name, full_name, url
    #[arg(long, env = "BIOINV_DEDUP_KEYS", default_value = "best_name")]
    dedup_keys: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Query EuropePMC for candidate articles
    Query {
        /// Query string, or path to a file holding it
        query: String,

        /// Oldest publication date: YYYY, YYYY-MM, or YYYY-MM-DD
        #[arg(long, default_value = "2011")]
        from_date: String,

        /// Results per search page
        #[arg(long, default_value_t = 1000)]
        page_size: u32,

        /// Output directory
        #[arg(short, long, default_value = "out/")]
        out_dir: PathBuf,

        #[command(flatten)]
        http: HttpOpts,
    },
    /// Check extracted URLs: liveness, geolocation, archived snapshots
    Verify {
        /// CSV file with prediction records
        file: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "out/")]
        out_dir: PathBuf,

        #[command(flatten)]
        http: HttpOpts,

        #[command(flatten)]
        verify: VerifyOpts,
    },
    /// Filter, resolve names, deduplicate, and flag verified records
    Resolve {
        /// CSV file produced by the verify stage
        file: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "out/")]
        out_dir: PathBuf,

        #[command(flatten)]
        filter: FilterOpts,
    },
    /// Run verify and resolve in one pass
    Inventory {
        /// CSV file with prediction records
        file: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "out/")]
        out_dir: PathBuf,

        #[command(flatten)]
        http: HttpOpts,

        #[command(flatten)]
        verify: VerifyOpts,

        #[command(flatten)]
        filter: FilterOpts,
    },
}

/// Builds the validated pipeline configuration from command-line options.
/// Stages that do not use a group of options leave the defaults in place.
pub(crate) fn pipeline_config(
    verify: Option<&VerifyOpts>,
    filter: Option<&FilterOpts>,
) -> anyhow::Result<PipelineConfig> {
    let mut config = PipelineConfig::default();

    if let Some(opts) = verify {
        config.num_tries = opts.num_tries;
        config.backoff_factor = opts.backoff_factor;
        config.concurrency_limit = opts.concurrency_limit.unwrap_or_else(default_concurrency);
    }
    if let Some(opts) = filter {
        config.min_urls = opts.min_urls;
        config.max_urls = opts.max_urls;
        config.min_prob = opts.min_prob;
        config.dedup_keys = parse_dedup_keys(&opts.dedup_keys)?;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Query {
            query,
            from_date,
            page_size,
            out_dir,
            http,
        } => query::run_query(&query, &from_date, page_size, &out_dir, &http).await,
        Commands::Verify {
            file,
            out_dir,
            http,
            verify,
        } => verify::run_verify(&file, &out_dir, &http, &verify).await,
        Commands::Resolve {
            file,
            out_dir,
            filter,
        } => resolve::run_resolve(&file, &out_dir, &filter),
        Commands::Inventory {
            file,
            out_dir,
            http,
            verify,
            filter,
        } => inventory::run_inventory(&file, &out_dir, &http, &verify, &filter).await,
    }
}
