//! Source trait

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::SourceFile;
use async_trait::async_trait;
use bytes::Bytes;

/// Something that can list remote files and fetch each one into memory
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Locator shown in log lines
    fn locator(&self) -> String;

    /// List every entry, in the order the remote reports them
    async fn list(&self) -> Result<Vec<SourceFile>>;

    /// Retrieve one listed file
    async fn fetch(&self, file: &SourceFile) -> Result<Bytes>;
}

/// GET a descriptor's `download_url`
pub(crate) async fn fetch_download_url(client: &HttpClient, file: &SourceFile) -> Result<Bytes> {
    let url = file
        .download_url
        .as_deref()
        .ok_or_else(|| Error::retrieval(&file.name, "entry has no download URL"))?;

    client
        .get_bytes(url)
        .await
        .map_err(|e| Error::retrieval(&file.name, e.to_string()))
}
