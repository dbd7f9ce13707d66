use async_trait::async_trait;
use model::place::{Coordinate, Place};
use serde::Deserialize;

use crate::{read_json, ApiError, ApiResult, PlaceSearch};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const USER_AGENT: &str = concat!("lifelog-geo/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: String,
}

impl SearchResult {
    fn into_place(self) -> ApiResult<Place> {
        let latitude = self
            .lat
            .parse::<f64>()
            .map_err(|why| ApiError::Other(format!("bad latitude {}: {}", self.lat, why)))?;
        let longitude = self
            .lon
            .parse::<f64>()
            .map_err(|why| ApiError::Other(format!("bad longitude {}: {}", self.lon, why)))?;
        Ok(Place::new(
            short_name(&self.display_name),
            Coordinate::new(latitude, longitude),
        ))
    }
}

/// Nominatim display names list the whole administrative hierarchy, the first
/// component is enough for a label.
pub fn short_name(display_name: &str) -> String {
    display_name
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_owned()
}

/// Place search against a Nominatim compatible endpoint.
#[derive(Debug, Clone)]
pub struct Geocoder {
    http: reqwest::Client,
    url: String,
}

impl Geocoder {
    pub fn new<S: Into<String>>(url: S) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self::with_client(http, url)
    }

    pub fn with_client<S: Into<String>>(http: reqwest::Client, url: S) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PlaceSearch for Geocoder {
    async fn search(&self, query: &str) -> ApiResult<Option<Place>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }
        log::debug!("searching for {:?}", query);
        let response = self
            .http
            .get(&self.url)
            .query(&[("format", "json"), ("q", query), ("limit", "1")])
            .send()
            .await?;
        let results: Vec<SearchResult> = read_json(response).await?;
        results
            .into_iter()
            .next()
            .map(SearchResult::into_place)
            .transpose()
    }
}
