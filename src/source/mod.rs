//! Remote source module
//!
//! Lists and retrieves the raw trip data files.
//!
//! # Overview
//!
//! - [`FileSource`] - the listing/retrieval seam the download stage consumes
//! - [`GithubFolderSource`] - a repository folder listed through the GitHub contents API
//! - [`DirectUrlSource`] - a single file at a fixed URL

mod direct;
mod github;
mod types;

pub use direct::DirectUrlSource;
pub use github::{GithubFolderSource, GITHUB_TOKEN_ENV};
pub use types::FileSource;

#[cfg(test)]
mod tests;
