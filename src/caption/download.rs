//! Fetches model files from a Hugging Face style repository into a local
//! cache directory.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

pub struct ModelDownloader {
    client: reqwest::Client,
    endpoint: String,
    cache_dir: PathBuf,
}

impl ModelDownloader {
    pub fn new(endpoint: String, cache_dir: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            cache_dir,
        }
    }

    /// Local path of `file` from `repo` at `revision`.
    pub fn cached_path(&self, repo: &str, revision: &str, file: &str) -> PathBuf {
        self.cache_dir
            .join(repo.replace('/', "--"))
            .join(revision.replace('/', "--"))
            .join(file)
    }

    fn file_url(&self, repo: &str, revision: &str, file: &str) -> String {
        format!(
            "{}/{}/resolve/{}/{}",
            self.endpoint,
            repo,
            revision.replace('/', "%2F"),
            file
        )
    }

    /// Return the cached file, downloading it first when absent. Partial
    /// downloads land in a `.temp` sibling and are renamed on completion.
    pub async fn fetch(&self, repo: &str, revision: &str, file: &str) -> Result<PathBuf> {
        let file_path = self.cached_path(repo, revision, file);
        if file_path.exists() {
            tracing::debug!("Using cached model file {}", file_path.display());
            return Ok(file_path);
        }

        let url = self.file_url(repo, revision, file);
        tracing::info!("Downloading {}", url);

        let mut response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::CaptionModel(format!(
                "Failed to download {} (status {})",
                url, status
            )));
        }

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = temp_path_for(&file_path);
        let mut out = File::create(&temp_path).await?;
        while let Some(chunk) = response.chunk().await? {
            out.write_all(&chunk).await?;
        }
        out.flush().await?;
        drop(out);
        fs::rename(&temp_path, &file_path).await?;

        tracing::info!("Model file {} downloaded", file_path.display());
        Ok(file_path)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".temp");
    path.with_file_name(name)
}
