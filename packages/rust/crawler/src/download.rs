//! Timeout-bound document downloader.
//!
//! A file is only written after the full response body was received with a
//! 2xx status, so a failed download never leaves a partial file behind.
//! Existing files at the target path are overwritten.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};
use url::Url;

use eduscol_shared::{EduscolError, Result};

/// Fetches documents and writes them to disk.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    timeout: Duration,
}

impl Downloader {
    /// Create a downloader sharing an existing HTTP client.
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Download `url` into `folder/filename`.
    ///
    /// Returns `true` on success. Failures are logged, never raised.
    pub async fn download(&self, url: &str, folder: &Path, filename: &str) -> bool {
        match self.fetch_to_file(url, folder, filename).await {
            Ok(path) => {
                info!(%url, path = %path.display(), "downloaded");
                true
            }
            Err(e) => {
                warn!(%url, folder = %folder.display(), error = %e, "download failed");
                false
            }
        }
    }

    async fn fetch_to_file(&self, url: &str, folder: &Path, filename: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(folder).map_err(|e| EduscolError::io(folder, e))?;

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| EduscolError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EduscolError::Network(format!("{url}: HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EduscolError::Network(format!("{url}: body read failed: {e}")))?;

        let path = folder.join(filename);
        std::fs::write(&path, &bytes).map_err(|e| EduscolError::io(&path, e))?;
        Ok(path)
    }
}

/// Final path segment of a URL, used as the filename for static resources.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    (!last.is_empty()).then(|| last.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn downloader() -> Downloader {
        Downloader::new(Client::new(), Duration::from_secs(5))
    }

    #[test]
    fn filename_from_url_takes_last_segment() {
        assert_eq!(
            filename_from_url("https://cache.media.education.gouv.fr/file/31/88/5/ensel714_annexe1_1312885.pdf"),
            Some("ensel714_annexe1_1312885.pdf".to_string())
        );
        assert_eq!(filename_from_url("https://example.com/dir/"), None);
        assert_eq!(filename_from_url("not a url"), None);
    }

    #[tokio::test]
    async fn writes_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/document/1/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 body".to_vec()))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let folder = tmp.path().join("nested").join("maths");
        let url = format!("{}/document/1/download", server.uri());

        assert!(downloader().download(&url, &folder, "Programme.pdf").await);
        let written = std::fs::read(folder.join("Programme.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.4 body");
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("new"))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("doc.pdf"), "old contents").unwrap();

        let url = format!("{}/document/2/download", server.uri());
        assert!(downloader().download(&url, tmp.path(), "doc.pdf").await);
        assert_eq!(std::fs::read_to_string(tmp.path().join("doc.pdf")).unwrap(), "new");
    }

    #[tokio::test]
    async fn non_success_status_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let url = format!("{}/document/3/download", server.uri());

        assert!(!downloader().download(&url, tmp.path(), "missing.pdf").await);
        assert!(!tmp.path().join("missing.pdf").exists());
        // The folder itself is still created up front.
        assert!(tmp.path().is_dir());
    }

    #[tokio::test]
    async fn transport_failure_returns_false() {
        // Nothing listens on this port once the server is dropped.
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let tmp = tempfile::tempdir().unwrap();
        let url = format!("{uri}/document/4/download");
        assert!(!downloader().download(&url, tmp.path(), "gone.pdf").await);
        assert!(!tmp.path().join("gone.pdf").exists());
    }
}
