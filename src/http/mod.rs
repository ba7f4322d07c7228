//! HTTP client module
//!
//! Provides the HTTP client the remote sources use to list folders and
//! retrieve files.
//!
//! # Features
//!
//! - **Base URL resolution**: relative paths are joined onto a configured base
//! - **Default headers**: user agent, bearer token, content negotiation
//! - **Status checking**: non-2xx responses become errors with the response body

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
