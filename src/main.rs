use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use topic_explorer::config::Config;
use topic_explorer::dataset::source::is_url;
use topic_explorer::dataset::{load_dataset, source_for, ClusterSize, Dataset, UrlSource};
use topic_explorer::keywords::KeywordExtractor;
use topic_explorer::output::{print_json, terminal};
use topic_explorer::sampler::{eligible_clusters, SampleParams};
use topic_explorer::session::ExplorerSession;

/// Topic Explorer: compare random examples from one topic cluster.
///
/// Picks a topic with enough records, draws a handful of them, and highlights
/// the keywords every drawn example shares.
#[derive(Parser)]
#[command(name = "topic-explorer", version, about)]
struct Cli {
    /// Dataset CSV path or http(s) URL (overrides TOPIC_EXPLORER_DATASET)
    #[arg(long, global = true)]
    dataset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct SampleArgs {
    /// Seed for repeatable samples (overrides TOPIC_EXPLORER_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Only sample clusters with at least this many records (default: 5)
    #[arg(long)]
    min_cluster_size: Option<usize>,

    /// Number of examples per sample (default: 5)
    #[arg(long)]
    sample_size: Option<usize>,

    /// Ignore English stop words when looking for shared keywords
    #[arg(long)]
    stop_words: bool,

    /// Show at most this many characters of each example
    #[arg(long)]
    max_chars: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one random sample
    Sample {
        #[command(flatten)]
        args: SampleArgs,

        /// Print the sample as JSON instead of colored text
        #[arg(long)]
        json: bool,
    },

    /// Show a sample and draw a new one each time Enter is pressed
    Explore {
        #[command(flatten)]
        args: SampleArgs,
    },

    /// List topic clusters and their sizes
    Topics {
        /// Eligibility threshold to report against (default: 5)
        #[arg(long)]
        min_cluster_size: Option<usize>,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a remote dataset into the local cache
    Fetch {
        /// Download again even if a cached copy exists
        #[arg(long)]
        refresh: bool,
    },
}

#[derive(Serialize)]
struct TopicsReport<'a> {
    min_cluster_size: usize,
    eligible: usize,
    clusters: &'a [ClusterSize],
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topic_explorer=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(dataset) = cli.dataset {
        config.dataset = Some(dataset);
    }

    match cli.command {
        Commands::Sample { args, json } => {
            let dataset = open_dataset(&config).await?;
            let params = sample_params(&config, &args);
            let session = start_session(dataset, params, args.seed.or(config.seed))?;

            if json {
                print_json(session.current())?;
            } else {
                terminal::display_sample(
                    session.current(),
                    &session.params().marker,
                    args.max_chars,
                );
            }
        }

        Commands::Explore { args } => {
            let dataset = open_dataset(&config).await?;
            let params = sample_params(&config, &args);
            let mut session = start_session(dataset, params, args.seed.or(config.seed))?;

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                terminal::display_sample(
                    session.current(),
                    &session.params().marker,
                    args.max_chars,
                );
                print!("{}", "[Enter] refresh examples  [q] quit > ".dimmed());
                std::io::stdout().flush()?;

                let Some(line) = lines.next_line().await? else {
                    break;
                };
                if matches!(line.trim(), "q" | "quit" | "exit") {
                    break;
                }

                if let Err(e) = session.refresh() {
                    warn!(error = %e, "Refresh failed, keeping previous sample");
                    println!("  {} {}", "Warning:".yellow(), e);
                }
            }
            info!(rounds = session.rounds(), "Explorer closed");
        }

        Commands::Topics {
            min_cluster_size,
            json,
        } => {
            let dataset = open_dataset(&config).await?;
            let min_cluster_size = min_cluster_size.unwrap_or(config.min_cluster_size);
            let clusters = dataset.clusters();

            if json {
                print_json(&TopicsReport {
                    min_cluster_size,
                    eligible: eligible_clusters(&dataset, min_cluster_size).len(),
                    clusters: &clusters,
                })?;
            } else {
                terminal::display_clusters(&clusters, min_cluster_size);
            }
        }

        Commands::Fetch { refresh } => {
            let location = config.require_dataset()?;
            if !is_url(location) {
                anyhow::bail!(
                    "`fetch` only applies to http(s) datasets; {location} is a local path"
                );
            }

            let source = UrlSource::new(location, &config.cache_dir).refresh(refresh);
            println!("Fetching dataset...");
            println!("  Source: {}", source.url());
            println!("  Cache:  {}", source.cache_path().display());

            let dataset = load_dataset(&source).await?;
            let eligible = eligible_clusters(&dataset, config.min_cluster_size).len();

            println!("\n{}", "Dataset cached.".bold());
            println!(
                "  {} records in {} clusters ({} with at least {} records)",
                dataset.len(),
                dataset.clusters().len(),
                eligible,
                config.min_cluster_size
            );
        }
    }

    Ok(())
}

/// Resolve the configured dataset location and load it.
async fn open_dataset(config: &Config) -> Result<Arc<Dataset>> {
    let location = config.require_dataset()?;
    let source = source_for(location, &config.cache_dir);
    let dataset = load_dataset(source.as_ref()).await?;
    Ok(Arc::new(dataset))
}

fn sample_params(config: &Config, args: &SampleArgs) -> SampleParams {
    SampleParams {
        min_cluster_size: args.min_cluster_size.unwrap_or(config.min_cluster_size),
        sample_size: args.sample_size.unwrap_or(config.sample_size),
        extractor: if args.stop_words {
            KeywordExtractor::with_english_stop_words()
        } else {
            KeywordExtractor::default()
        },
        ..SampleParams::default()
    }
}

fn start_session(
    dataset: Arc<Dataset>,
    params: SampleParams,
    seed: Option<u64>,
) -> Result<ExplorerSession> {
    let session = match seed {
        Some(seed) => {
            info!(seed, "Using fixed seed");
            ExplorerSession::seeded(dataset, params, seed)?
        }
        None => ExplorerSession::from_os_rng(dataset, params)?,
    };
    Ok(session)
}
