//! Nominatim adapter for the geocoding port.

use async_trait::async_trait;
use url::Url;

use doorstep_geocode::{GeocodeApi, GeocodeError, ReverseGeocodeResponse, SearchResult};

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying user agent.
const USER_AGENT: &str = concat!("doorstep/", env!("CARGO_PKG_VERSION"));

/// Street-level detail for reverse lookups.
const REVERSE_ZOOM: &str = "18";

pub struct NominatimClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NominatimClient {
    pub fn new() -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::builder().user_agent(USER_AGENT).build()?,
            base_url: Url::parse(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GeocodeError> {
        self.base_url
            .join(path)
            .map_err(|e| GeocodeError::new(e.to_string()))
    }
}

#[async_trait]
impl GeocodeApi for NominatimClient {
    async fn reverse(&self, lat: f64, lng: f64) -> Result<ReverseGeocodeResponse, GeocodeError> {
        self.http
            .get(self.endpoint("/reverse")?)
            .query(&[
                ("format", "json".to_owned()),
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("zoom", REVERSE_ZOOM.to_owned()),
                ("addressdetails", "1".to_owned()),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::new(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeocodeError::new(e.to_string()))?
            .json()
            .await
            .map_err(|e| GeocodeError::new(e.to_string()))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, GeocodeError> {
        self.http
            .get(self.endpoint("/search")?)
            .query(&[
                ("format", "json".to_owned()),
                ("q", query.to_owned()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::new(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeocodeError::new(e.to_string()))?
            .json()
            .await
            .map_err(|e| GeocodeError::new(e.to_string()))
    }
}
