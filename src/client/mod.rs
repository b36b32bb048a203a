//! HTTP client for fetching source documents.
//!
//! This module provides the [`HttpClient`] used by the extract stage.

mod http;

pub use http::HttpClient;
