use std::path::Path;

use async_trait::async_trait;
use model::{location::LocationPoint, StatusMessage};
use reqwest::multipart::{Form, Part};

use crate::{
    ensure_json_file, read_json, ApiError, ApiResult, LocationQuery, LocationService,
};

/// HTTP client for the location data service.
#[derive(Debug, Clone)]
pub struct LocationClient {
    http: reqwest::Client,
    base_url: String,
}

impl LocationClient {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client<S: Into<String>>(http: reqwest::Client, base_url: S) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}/", self.base_url, resource)
    }

    /// Reads a file from disk and uploads it.
    pub async fn upload_path<P: AsRef<Path>>(&self, path: P) -> ApiResult<StatusMessage> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ApiError::Other(format!("no file name in {:?}", path)))?
            .to_owned();
        ensure_json_file(&file_name)?;
        let content = tokio::fs::read(path).await?;
        self.upload(&file_name, content).await
    }
}

#[async_trait]
impl LocationService for LocationClient {
    async fn fetch_locations(
        &self,
        query: &LocationQuery,
    ) -> ApiResult<Vec<LocationPoint>> {
        let url = self.url("locations");
        log::debug!("GET {}", url);
        let response = self.http.get(&url).query(&query.params()).send().await?;
        read_json(response).await
    }

    async fn create_locations(
        &self,
        points: &[LocationPoint],
    ) -> ApiResult<StatusMessage> {
        let url = self.url("locations");
        log::debug!("POST {} ({} points)", url, points.len());
        let response = self.http.post(&url).json(points).send().await?;
        read_json(response).await
    }

    async fn upload(&self, file_name: &str, content: Vec<u8>) -> ApiResult<StatusMessage> {
        ensure_json_file(file_name)?;
        let url = self.url("upload");
        log::debug!("POST {} ({}, {} bytes)", url, file_name, content.len());
        let part = Part::bytes(content)
            .file_name(file_name.to_owned())
            .mime_str("application/json")?;
        let form = Form::new().part("file", part);
        let response = self.http.post(&url).multipart(form).send().await?;
        read_json(response).await
    }
}
