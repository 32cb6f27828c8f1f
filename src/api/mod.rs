//! REST client for the expense/income collections.
//!
//! `RecordApi` is the seam every view talks through; `HttpApi` is the
//! reqwest-backed implementation used by the binary.

pub mod client;
#[cfg(test)]
pub(crate) mod memory;

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::Resource;

pub use client::HttpApi;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Text suitable for a user-facing message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Server-side filters for a collection fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ListQuery {
    /// Only records dated on this day.
    pub date: Option<NaiveDate>,
}

impl ListQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn on(date: Option<NaiveDate>) -> Self {
        Self { date }
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        self.date
            .map(|date| ("date", date.format("%Y-%m-%d").to_string()))
            .into_iter()
            .collect()
    }
}

/// Result of handing a whole file to the server's bulk upload endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadReport {
    Added(usize),
    Rejected(Vec<String>),
}

#[async_trait]
pub trait RecordApi<R: Resource>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Vec<R>, ApiError>;

    async fn create(&self, new: &R::New) -> Result<R, ApiError>;

    async fn delete(&self, id: u64) -> Result<(), ApiError>;

    async fn upload(&self, path: &Path) -> Result<UploadReport, ApiError>;
}
