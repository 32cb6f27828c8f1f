use std::path::Path;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{StatusCode, multipart};
use serde::Deserialize;

use super::{ApiError, ListQuery, RecordApi, UploadReport};
use crate::models::Resource;

/// reqwest-backed client for one server; serves every resource type.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url<R: Resource>(&self) -> String {
        format!("{}/{}", self.base_url, R::PATH)
    }
}

#[async_trait]
impl<R: Resource> RecordApi<R> for HttpApi {
    async fn list(&self, query: &ListQuery) -> Result<Vec<R>, ApiError> {
        let url = self.collection_url::<R>();
        debug!("GET {url} {query:?}");
        let response = self
            .client
            .get(&url)
            .query(&query.params())
            .send()
            .await?;

        check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn create(&self, new: &R::New) -> Result<R, ApiError> {
        let url = self.collection_url::<R>();
        debug!("POST {url} {new:?}");
        let response = self.client.post(&url).json(new).send().await?;

        check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn delete(&self, id: u64) -> Result<(), ApiError> {
        let url = format!("{}/{}", self.collection_url::<R>(), id);
        debug!("DELETE {url}");
        let response = self.client.delete(&url).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn upload(&self, path: &Path) -> Result<UploadReport, ApiError> {
        let url = format!("{}/upload", self.collection_url::<R>());
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        debug!("POST {url} ({} bytes from {file_name})", bytes.len());

        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let form = multipart::Form::new().part("file", part);
        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_upload(status, &body)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    errors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UploadBody {
    Added { added: usize },
    Rejected { errors: Vec<String> },
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    warn!("{url} returned {status}");
    Err(ApiError::Status {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(error), .. }) => error,
        Ok(ErrorBody { errors: Some(errors), .. }) if !errors.is_empty() => errors.join("; "),
        _ if !body.trim().is_empty() && !body.trim_start().starts_with('<') => {
            body.trim().to_string()
        }
        _ => status.canonical_reason().unwrap_or("request failed").to_string(),
    }
}

fn parse_upload(status: StatusCode, body: &str) -> Result<UploadReport, ApiError> {
    match serde_json::from_str::<UploadBody>(body) {
        Ok(UploadBody::Added { added }) => Ok(UploadReport::Added(added)),
        Ok(UploadBody::Rejected { errors }) => Ok(UploadReport::Rejected(errors)),
        Err(_) if !status.is_success() => Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(status, body),
        }),
        Err(e) => Err(ApiError::Parse(e.to_string())),
    }
}
