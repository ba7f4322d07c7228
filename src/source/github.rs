//! GitHub folder listing
//!
//! `raw.githubusercontent.com` only serves individual files, so the folder
//! is listed with the contents API and each entry is fetched from its
//! `download_url`.

use super::types::{fetch_download_url, FileSource};
use crate::config::GithubFolder;
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::types::SourceFile;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;
use url::Url;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Environment variable holding an optional GitHub token
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// A repository folder listed through the GitHub contents API
#[derive(Debug, Clone)]
pub struct GithubFolderSource {
    client: HttpClient,
    listing_url: Url,
}

impl GithubFolderSource {
    /// Source for a repository folder
    ///
    /// Picks up a bearer token from `GITHUB_TOKEN` when set.
    pub fn new(folder: &GithubFolder) -> Result<Self> {
        Self::from_listing_url(&folder.listing_url())
    }

    /// Source for an explicit contents API URL
    pub fn from_listing_url(listing_url: &str) -> Result<Self> {
        let mut config = HttpClientConfig::builder();
        if let Ok(token) = std::env::var(GITHUB_TOKEN_ENV) {
            if !token.is_empty() {
                config = config.bearer_token(token);
            }
        }
        Self::with_client(listing_url, HttpClient::with_config(config.build())?)
    }

    /// Source using a preconfigured client
    pub fn with_client(listing_url: &str, client: HttpClient) -> Result<Self> {
        Ok(Self {
            client,
            listing_url: Url::parse(listing_url)?,
        })
    }

    /// The contents API URL
    pub fn listing_url(&self) -> &str {
        self.listing_url.as_str()
    }
}

#[async_trait]
impl FileSource for GithubFolderSource {
    fn locator(&self) -> String {
        self.listing_url.to_string()
    }

    async fn list(&self) -> Result<Vec<SourceFile>> {
        info!("Querying GitHub API: {}", self.listing_url);
        self.client
            .get_json_with_config(
                self.listing_url.as_str(),
                RequestConfig::new().header("Accept", GITHUB_ACCEPT),
            )
            .await
    }

    async fn fetch(&self, file: &SourceFile) -> Result<Bytes> {
        fetch_download_url(&self.client, file).await
    }
}
