use std::error;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{location::LocationPoint, place::Place, StatusMessage};

pub mod client;
pub mod geocoder;

pub use client::LocationClient;
pub use geocoder::Geocoder;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Clone)]
pub enum ApiError {
    RequestError(Arc<reqwest::Error>),
    JsonError(Arc<serde_json::Error>),
    IoError(Arc<std::io::Error>),
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
        response: Option<String>,
    },
    UnsupportedFile(String),
    Other(String),
}

impl error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::RequestError(e) => write!(f, "HTTP request error: {}", e),
            ApiError::JsonError(e) => write!(f, "JSON parse error: {}", e),
            ApiError::IoError(e) => write!(f, "IO error: {}", e),
            ApiError::InvalidResponse {
                status_code,
                url,
                response,
            } => match response {
                Some(text) => {
                    write!(f, "Invalid Response ({}) {}: {}", status_code, text, url)
                }
                None => write!(f, "Invalid Response ({}) {}", status_code, url),
            },
            ApiError::UnsupportedFile(name) => {
                write!(f, "Only JSON files are supported: {}", name)
            }
            ApiError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::RequestError(Arc::new(e))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::JsonError(Arc::new(e))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::IoError(Arc::new(e))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Optional time window for reading locations; both bounds are inclusive on
/// the service side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl LocationQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        [("start_date", self.start_date), ("end_date", self.end_date)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value.to_rfc3339())))
            .collect()
    }
}

/// The location data service.
#[async_trait]
pub trait LocationService: Send + Sync {
    async fn fetch_locations(&self, query: &LocationQuery)
        -> ApiResult<Vec<LocationPoint>>;

    async fn create_locations(&self, points: &[LocationPoint]) -> ApiResult<StatusMessage>;

    async fn upload(&self, file_name: &str, content: Vec<u8>) -> ApiResult<StatusMessage>;
}

/// Free text place-name search.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Best match for `query`, `None` if nothing matched.
    async fn search(&self, query: &str) -> ApiResult<Option<Place>>;
}

/// The service only accepts JSON exports.
pub fn ensure_json_file(file_name: &str) -> ApiResult<()> {
    if file_name.ends_with(".json") {
        Ok(())
    } else {
        Err(ApiError::UnsupportedFile(file_name.to_owned()))
    }
}

pub(crate) async fn check_status(
    response: reqwest::Response,
) -> ApiResult<reqwest::Response> {
    let status_code = response.status();
    if status_code.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let response = response.text().await.ok().filter(|text| !text.is_empty());
    Err(ApiError::InvalidResponse {
        status_code,
        url,
        response,
    })
}

pub(crate) async fn read_json<T>(response: reqwest::Response) -> ApiResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let text = check_status(response).await?.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::Router;
    use tokio::net::TcpListener;

    /// Serves `router` on an ephemeral local port and returns its base url.
    pub async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", address)
    }
}
