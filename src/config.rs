use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::dataset::source::default_cache_dir;
use crate::sampler::{DEFAULT_MIN_CLUSTER_SIZE, DEFAULT_SAMPLE_SIZE};

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Command-line
/// flags override anything set here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path or http(s) URL of the dataset CSV (TOPIC_EXPLORER_DATASET)
    pub dataset: Option<String>,
    /// Where downloaded datasets are cached (TOPIC_EXPLORER_CACHE_DIR)
    pub cache_dir: PathBuf,
    pub min_cluster_size: usize,
    pub sample_size: usize,
    /// Fixed RNG seed for repeatable samples (TOPIC_EXPLORER_SEED)
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the dataset location, which may also
    /// come from the command line.
    pub fn load() -> Result<Self> {
        Ok(Self {
            dataset: env::var("TOPIC_EXPLORER_DATASET")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            cache_dir: env::var("TOPIC_EXPLORER_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_cache_dir()),
            min_cluster_size: parse_var("TOPIC_EXPLORER_MIN_CLUSTER_SIZE")?
                .unwrap_or(DEFAULT_MIN_CLUSTER_SIZE),
            sample_size: parse_var("TOPIC_EXPLORER_SAMPLE_SIZE")?.unwrap_or(DEFAULT_SAMPLE_SIZE),
            seed: parse_var("TOPIC_EXPLORER_SEED")?,
        })
    }

    /// The dataset location, or an error telling the user how to set one.
    pub fn require_dataset(&self) -> Result<&str> {
        match self.dataset.as_deref() {
            Some(location) => Ok(location),
            None => anyhow::bail!(
                "No dataset configured. Pass --dataset <path|url> or set \
                 TOPIC_EXPLORER_DATASET in your .env file."
            ),
        }
    }
}

/// Read and parse an optional environment variable.
/// Unset or empty is `None`; a value that fails to parse is an error.
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be a non-negative integer, got {raw:?}")),
        _ => Ok(None),
    }
}
