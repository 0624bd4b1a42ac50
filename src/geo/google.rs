use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::geo::{GeoCode, GeocodeError, Geocoder};

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

pub struct GoogleGeocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GoogleGeocoder {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cab-compass/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoCode, GeocodeError> {
        let api_key = self.api_key.as_deref().ok_or(GeocodeError::MissingApiKey)?;

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("address", address), ("key", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "geocoding request rejected");
            return Err(GeocodeError::Http {
                status: status.as_u16(),
            });
        }

        let body: GeocodeResponse = response.json().await?;
        if body.status != "OK" && body.status != "ZERO_RESULTS" {
            return Err(GeocodeError::Api {
                message: body
                    .error_message
                    .unwrap_or_else(|| "no error message".to_string()),
                status: body.status,
            });
        }

        let location = body
            .results
            .into_iter()
            .next()
            .map(|result| result.geometry.location)
            .ok_or(GeocodeError::NoResults)?;

        debug!(lat = location.lat, lng = location.lng, "address geocoded");

        Ok(GeoCode {
            latitude: location.lat,
            longitude: location.lng,
        })
    }
}
