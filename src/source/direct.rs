//! Single file at a fixed URL

use super::types::{fetch_download_url, FileSource};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::SourceFile;
use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

/// One remote file, listed as itself
#[derive(Debug, Clone)]
pub struct DirectUrlSource {
    client: HttpClient,
    file: SourceFile,
}

impl DirectUrlSource {
    /// Source for the file at `url`; its name is the last path segment
    pub fn new(url: &str) -> Result<Self> {
        Self::with_client(url, HttpClient::new()?)
    }

    /// Source using a preconfigured client
    pub fn with_client(url: &str, client: HttpClient) -> Result<Self> {
        let parsed = Url::parse(url)?;
        let name = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::config(format!("URL has no file name: {url}")))?
            .to_string();

        Ok(Self {
            client,
            file: SourceFile::new(name, parsed.as_str()),
        })
    }

    /// The descriptor this source lists
    pub fn file(&self) -> &SourceFile {
        &self.file
    }
}

#[async_trait]
impl FileSource for DirectUrlSource {
    fn locator(&self) -> String {
        self.file.download_url.clone().unwrap_or_default()
    }

    async fn list(&self) -> Result<Vec<SourceFile>> {
        Ok(vec![self.file.clone()])
    }

    async fn fetch(&self, file: &SourceFile) -> Result<Bytes> {
        fetch_download_url(&self.client, file).await
    }
}
