//! HTTP download functionality
//!
//! Fetches standalone assets with retry and exponential backoff, optionally
//! verifying a SHA256 checksum before the file is handed to the caller.

use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::defaults;
use crate::error::DownloadError;

/// Download result containing file path and metadata
#[derive(Debug)]
pub struct DownloadResult {
    /// Path to the downloaded file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// SHA256 checksum of the downloaded content
    pub checksum: String,
}

/// Download manager for fetching files with retry
#[derive(Debug, Clone)]
pub struct DownloadManager {
    client: reqwest::Client,
    max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds)
    base_delay_ms: u64,
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadManager {
    /// Create a new download manager
    pub fn new() -> Self {
        Self::with_config(defaults::MAX_DOWNLOAD_RETRIES, 1000)
    }

    /// Create a download manager with custom settings
    pub fn with_config(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(300))
                .connect_timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            max_retries: max_retries.max(1),
            base_delay_ms,
        }
    }

    /// Get max retries
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Download a file with retry logic
    ///
    /// A partial file is removed when every attempt fails.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<DownloadResult, DownloadError> {
        let mut attempts = 0;
        let mut last_error = None;
        let mut delay_ms = self.base_delay_ms;

        while attempts < self.max_retries {
            attempts += 1;

            match self.download_once(url, dest).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::debug!("Download attempt {attempts} for {url} failed: {e}");
                    last_error = Some(e);

                    if attempts < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(30_000);
                    }
                }
            }
        }

        let _ = tokio::fs::remove_file(dest).await;

        Err(last_error.unwrap_or_else(|| DownloadError::MaxRetriesExceeded {
            url: url.to_string(),
            retries: self.max_retries,
        }))
    }

    async fn download_once(&self, url: &str, dest: &Path) -> Result<DownloadResult, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DownloadError::NetworkError {
                url: url.to_string(),
                error: format!("HTTP {}", response.status()),
            });
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::IoError {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
        }

        let io_err = |e: std::io::Error| DownloadError::IoError {
            path: dest.to_path_buf(),
            error: e.to_string(),
        };

        let mut file = File::create(dest).await.map_err(io_err)?;
        let mut hasher = Sha256::new();
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| DownloadError::NetworkError {
                url: url.to_string(),
                error: e.to_string(),
            })?;

            file.write_all(&chunk).await.map_err(io_err)?;
            hasher.update(&chunk);
            downloaded += chunk.len() as u64;
        }

        file.flush().await.map_err(io_err)?;

        Ok(DownloadResult {
            path: dest.to_path_buf(),
            size: downloaded,
            checksum: hex::encode(hasher.finalize()),
        })
    }

    /// Download a file and verify its checksum
    ///
    /// The file is deleted again when the checksum does not match.
    pub async fn download_verified(
        &self,
        url: &str,
        dest: &Path,
        expected_checksum: &str,
    ) -> Result<DownloadResult, DownloadError> {
        let result = self.download(url, dest).await?;

        if !result.checksum.eq_ignore_ascii_case(expected_checksum) {
            let _ = tokio::fs::remove_file(dest).await;

            return Err(DownloadError::ChecksumFailed {
                file: dest.display().to_string(),
                expected: expected_checksum.to_lowercase(),
                actual: result.checksum,
            });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HEADER: &str = "#define TARGET_OS_MAC 1\n";

    fn sha256_hex(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    #[tokio::test]
    async fn test_download_writes_file_and_checksum() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/TargetConditionals.h"))
            .respond_with(ResponseTemplate::new(200).set_body_string(HEADER))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("usr/include/TargetConditionals.h");
        let manager = DownloadManager::with_config(1, 1);

        let result = manager
            .download(&format!("{}/TargetConditionals.h", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), HEADER);
        assert_eq!(result.size, HEADER.len() as u64);
        assert_eq!(result.checksum, sha256_hex(HEADER.as_bytes()));
    }

    #[tokio::test]
    async fn test_download_http_error_cleans_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("missing.h");
        let manager = DownloadManager::with_config(2, 1);

        let err = manager
            .download(&format!("{}/missing.h", server.uri()), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::NetworkError { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_verified_rejects_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(HEADER))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("TargetConditionals.h");
        let manager = DownloadManager::with_config(1, 1);
        let url = format!("{}/TargetConditionals.h", server.uri());

        let err = manager
            .download_verified(&url, &dest, &"0".repeat(64))
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::ChecksumFailed { .. }));
        assert!(!dest.exists());

        let ok = manager
            .download_verified(&url, &dest, &sha256_hex(HEADER.as_bytes()).to_uppercase())
            .await;
        assert!(ok.is_ok());
    }
}
