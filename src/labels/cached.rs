use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{info, error};

use super::source::LabelSource;
use super::types::{LabelError, LabelTable};

/// Default location of the ImageNet label file
pub const IMAGENET_LABELS_URL: &str =
    "https://storage.googleapis.com/download.tensorflow.org/data/ImageNetLabels.txt";

/// A label file fetched once from a URL and read from a local cache after.
///
/// `download` fills the cache; `load` only ever reads the cached copy.
pub struct CachedLabelSource {
    url: String,
    cache_path: PathBuf,
}

impl CachedLabelSource {
    /// # Arguments
    ///
    /// * `url` - Where to fetch the label file from
    /// * `cache_dir` - Directory the file is stored in
    /// * `file_name` - Name of the cached file inside `cache_dir`
    pub fn new(url: impl Into<String>, cache_dir: impl AsRef<Path>, file_name: &str) -> Self {
        Self {
            url: url.into(),
            cache_path: cache_dir.as_ref().join(file_name),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn is_cached(&self) -> bool {
        self.cache_path.is_file()
    }

    /// Downloads the label file unless a cached copy already exists.
    ///
    /// The body is streamed into a temporary file next to the cache entry
    /// and renamed into place once complete, so an interrupted download
    /// never leaves a truncated label file behind.
    pub async fn download(&self, client: &Client) -> Result<PathBuf, LabelError> {
        if self.is_cached() {
            info!("Using cached labels at {}", self.cache_path.display());
            return Ok(self.cache_path.clone());
        }

        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(format!("Downloading labels from {}...", self.url));

        info!("Downloading labels from {}", self.url);
        let response = client.get(&self.url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            pb.finish_with_message(format!("Download failed: {}", status));
            error!("Label download failed with status {}", status);
            return Err(LabelError::Download(format!("server responded with {}", status)));
        }

        let partial = self.cache_path.with_extension("part");
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut stream = response.bytes_stream();
        let mut received: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            received += chunk.len() as u64;
            file.write_all(&chunk).await?;
            pb.set_message(format!("Downloading labels... {} bytes", received));
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&partial, &self.cache_path).await?;
        pb.finish_with_message(format!("Labels cached at {}", self.cache_path.display()));
        info!("Cached {} bytes of labels at {}", received, self.cache_path.display());

        Ok(self.cache_path.clone())
    }
}

impl LabelSource for CachedLabelSource {
    fn load(&self) -> Result<Vec<String>, LabelError> {
        if !self.is_cached() {
            return Err(LabelError::NotCached(self.cache_path.clone()));
        }
        let content = fs::read_to_string(&self.cache_path)?;
        Ok(LabelTable::parse(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};

    const LABELS: &str = "background\ntench, Tinca tinca\ngoldfish\n";

    /// Serves `LABELS` at /labels.txt on an ephemeral port.
    async fn serve_labels() -> String {
        let router = Router::new().route("/labels.txt", get(|| async { LABELS }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn test_load_before_download_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = CachedLabelSource::new(IMAGENET_LABELS_URL, dir.path(), "ImageNetLabels.txt");
        assert!(!source.is_cached());
        assert!(matches!(source.load(), Err(LabelError::NotCached(_))));
    }

    #[tokio::test]
    async fn test_existing_cache_skips_download() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("labels.txt"), "background\ntench\n").unwrap();

        // An unroutable URL proves no request is made
        let source = CachedLabelSource::new("http://127.0.0.1:9/labels.txt", dir.path(), "labels.txt");
        let path = source.download(&Client::new()).await.unwrap();

        assert_eq!(path, dir.path().join("labels.txt"));
        assert_eq!(source.load().unwrap(), vec!["background", "tench"]);
    }

    #[tokio::test]
    async fn test_download_fills_cache() {
        let base = serve_labels().await;
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("data");
        let source = CachedLabelSource::new(format!("{}/labels.txt", base), &cache_dir, "labels.txt");

        let path = source.download(&client()).await.unwrap();

        assert_eq!(path, cache_dir.join("labels.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), LABELS);
        assert!(!cache_dir.join("labels.part").exists());
        assert_eq!(source.load().unwrap(), vec!["background", "tench, Tinca tinca", "goldfish"]);
    }

    #[tokio::test]
    async fn test_failed_download_leaves_no_cache() {
        let base = serve_labels().await;
        let dir = tempfile::tempdir().unwrap();
        let source = CachedLabelSource::new(format!("{}/missing.txt", base), dir.path(), "labels.txt");

        let result = source.download(&client()).await;

        assert!(matches!(result, Err(LabelError::Download(_))));
        assert!(!source.is_cached());
        assert!(!dir.path().join("labels.part").exists());
        assert!(matches!(source.load(), Err(LabelError::NotCached(_))));
    }
}
