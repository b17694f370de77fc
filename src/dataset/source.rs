// Dataset sources — where the CSV bytes come from.
//
// Local paths are read directly. URLs are downloaded once and cached on disk
// under a name derived from the URL, so repeated loads of the same source
// return the same bytes without touching the network.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::loader::load_csv;
use super::record::Dataset;

/// Returns the default directory for cached downloads.
/// Uses the platform cache directory: ~/.cache/topic-explorer/ on Linux.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("topic-explorer")
}

/// Anything that can produce the raw bytes of a dataset file.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetch the full dataset file.
    async fn fetch(&self) -> Result<Vec<u8>>;

    /// Human-readable description for logs and terminal output.
    fn describe(&self) -> String;
}

/// A dataset file on the local filesystem.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read dataset {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A dataset behind an HTTP(S) URL, cached on first download.
pub struct UrlSource {
    url: String,
    cache_dir: PathBuf,
    /// Ignore any cached copy and download again
    refresh: bool,
    /// Show a progress bar on stderr while downloading
    show_progress: bool,
}

impl UrlSource {
    /// Create a source for `url`. Google Drive share links are rewritten to
    /// their direct-download form.
    pub fn new(url: &str, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: direct_download_url(url),
            cache_dir: cache_dir.into(),
            refresh: false,
            show_progress: true,
        }
    }

    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Where the downloaded file is (or will be) cached.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(cache_file_name(&self.url))
    }

    /// Read the cached copy if there is one and it still parses. An unusable
    /// copy is deleted so the next fetch downloads again.
    async fn read_cache(&self) -> Result<Option<Vec<u8>>> {
        let cache_path = self.cache_path();
        if !cache_path.exists() {
            return Ok(None);
        }
        let bytes = tokio::fs::read(&cache_path)
            .await
            .with_context(|| format!("Failed to read cached dataset {}", cache_path.display()))?;

        if let Err(e) = load_csv(bytes.as_slice()) {
            warn!(
                path = %cache_path.display(),
                error = %format!("{e:#}"),
                "Discarding unusable cached dataset"
            );
            tokio::fs::remove_file(&cache_path)
                .await
                .with_context(|| format!("Failed to remove {}", cache_path.display()))?;
            return Ok(None);
        }
        Ok(Some(bytes))
    }

    /// Cache downloaded bytes once they parse as a dataset. The file is written
    /// next to the cache entry and renamed into place, so an interrupted write
    /// never leaves a partial entry behind.
    async fn store_in_cache(&self, bytes: &[u8]) -> Result<()> {
        load_csv(bytes)
            .with_context(|| format!("Downloaded file is not a usable dataset CSV: {}", self.url))?;

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .with_context(|| {
                format!("Failed to create cache directory: {}", self.cache_dir.display())
            })?;

        let cache_path = self.cache_path();
        let partial = cache_path.with_extension("csv.part");
        tokio::fs::write(&partial, bytes)
            .await
            .with_context(|| format!("Failed to write {}", partial.display()))?;
        tokio::fs::rename(&partial, &cache_path)
            .await
            .with_context(|| format!("Failed to move download into {}", cache_path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl DatasetSource for UrlSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        if !self.refresh {
            if let Some(bytes) = self.read_cache().await? {
                info!(path = %self.cache_path().display(), "Using cached dataset");
                return Ok(bytes);
            }
        }

        let bytes = download(&self.url, self.show_progress).await?;
        self.store_in_cache(&bytes).await?;

        info!(url = %self.url, path = %self.cache_path().display(), bytes = bytes.len(), "Cached dataset");
        Ok(bytes)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Pick a source for a location string: URLs download, everything else is a
/// local path.
pub fn source_for(location: &str, cache_dir: &Path) -> Box<dyn DatasetSource> {
    if is_url(location) {
        Box::new(UrlSource::new(location, cache_dir))
    } else {
        Box::new(FileSource::new(location))
    }
}

pub fn is_url(location: &str) -> bool {
    let lower = location.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Fetch a source and parse it as a dataset.
pub async fn load_dataset(source: &dyn DatasetSource) -> Result<Dataset> {
    info!(source = %source.describe(), "Loading dataset");
    let bytes = source.fetch().await?;
    load_csv(bytes.as_slice())
        .with_context(|| format!("Failed to parse dataset from {}", source.describe()))
}

/// Rewrite `https://drive.google.com/file/d/<id>/view?...` share links to the
/// direct download endpoint. Other URLs are returned unchanged.
pub fn direct_download_url(url: &str) -> String {
    const DRIVE_PREFIX: &str = "https://drive.google.com/file/d/";
    let trimmed = url.trim();
    if let Some(rest) = trimmed.strip_prefix(DRIVE_PREFIX) {
        let id = rest.split(['/', '?']).next().unwrap_or_default();
        if !id.is_empty() {
            return format!("https://drive.google.com/uc?export=download&id={id}");
        }
    }
    trimmed.to_string()
}

fn cache_file_name(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!("{}.csv", hex::encode(digest))
}

/// Download a URL into memory, with an optional progress bar.
async fn download(url: &str, show_progress: bool) -> Result<Vec<u8>> {
    let client = reqwest::Client::new();
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let expected_len = response.content_length();
    let pb = if show_progress {
        Some(progress_bar(expected_len)?)
    } else {
        None
    };

    let mut bytes = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .context("Failed to read response body")?
    {
        bytes.extend_from_slice(&chunk);
        if let Some(ref pb) = pb {
            pb.set_position(bytes.len() as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if let Some(expected) = expected_len {
        if bytes.len() as u64 != expected {
            anyhow::bail!(
                "Download of {} was cut short: got {} of {} bytes",
                url,
                bytes.len(),
                expected
            );
        }
    }

    info!("Downloaded {} ({} bytes)", url, bytes.len());
    Ok(bytes)
}

fn progress_bar(total_size: Option<u64>) -> Result<ProgressBar> {
    let pb = match total_size {
        Some(size) => {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
                    .progress_chars("=> "),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("    {spinner} {bytes}")?);
            pb
        }
    };
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_dir_is_under_topic_explorer() {
        let dir = default_cache_dir();
        assert!(dir.ends_with("topic-explorer"), "got: {}", dir.display());
    }

    #[test]
    fn test_drive_share_link_rewritten() {
        let url = "https://drive.google.com/file/d/1SeAh_-abc/view?usp=sharing";
        assert_eq!(
            direct_download_url(url),
            "https://drive.google.com/uc?export=download&id=1SeAh_-abc"
        );
        assert_eq!(
            direct_download_url("https://example.com/data.csv"),
            "https://example.com/data.csv"
        );
    }

    #[test]
    fn test_cache_path_is_stable_per_url() {
        let a = UrlSource::new("https://example.com/a.csv", "/tmp/cache");
        let a2 = UrlSource::new("https://example.com/a.csv", "/tmp/cache");
        let b = UrlSource::new("https://example.com/b.csv", "/tmp/cache");
        assert_eq!(a.cache_path(), a2.cache_path());
        assert_ne!(a.cache_path(), b.cache_path());
        assert!(a.cache_path().to_string_lossy().ends_with(".csv"));
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/x.csv"));
        assert!(is_url("HTTP://example.com/x.csv"));
        assert!(!is_url("./data/topics.csv"));
        assert!(!is_url("/abs/path.csv"));
    }

    #[tokio::test]
    async fn test_url_source_reads_cache_without_network() {
        let dir = std::env::temp_dir().join("topic-explorer-cache-test");
        let source = UrlSource::new("https://invalid.example/never-fetched.csv", &dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(source.cache_path(), b"topic,op_title,op_text\n1,a,b\n").unwrap();

        let ds = load_dataset(&source).await.unwrap();
        assert_eq!(ds.len(), 1);

        std::fs::remove_file(source.cache_path()).unwrap();
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const HTML_BODY: &[u8] = b"<!DOCTYPE html><html><body>Google Drive can't scan this file for viruses.</body></html>";

    #[tokio::test]
    async fn test_unusable_cache_is_discarded() {
        let dir = scratch_dir("topic-explorer-bad-cache-test");
        let source = UrlSource::new("https://invalid.example/virus-scan.csv", &dir);
        std::fs::write(source.cache_path(), HTML_BODY).unwrap();

        assert!(source.read_cache().await.unwrap().is_none());
        assert!(!source.cache_path().exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_store_rejects_non_csv_download() {
        let dir = scratch_dir("topic-explorer-store-test");
        let source = UrlSource::new("https://invalid.example/data.csv", &dir);
        let good = b"topic,op_title,op_text\n1,a,b\n";
        source.store_in_cache(good).await.unwrap();

        let err = source.store_in_cache(HTML_BODY).await.unwrap_err();
        assert!(err.to_string().contains("not a usable dataset CSV"), "got: {err}");

        // The earlier good copy is untouched and no partial file is left over
        assert_eq!(std::fs::read(source.cache_path()).unwrap(), good);
        assert!(!source.cache_path().with_extension("csv.part").exists());
        assert_eq!(source.read_cache().await.unwrap().unwrap(), good);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
