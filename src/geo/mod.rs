pub mod google;

use async_trait::async_trait;
use thiserror::Error;

pub use crate::models::employee::GeoCode;
pub use google::GoogleGeocoder;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Failed to fetch geocodes: no geocoding API key configured")]
    MissingApiKey,

    #[error("Failed to fetch geocodes: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to fetch geocodes: geocoding service returned {status}")]
    Http { status: u16 },

    #[error("Failed to fetch geocodes: {status}: {message}")]
    Api { status: String, message: String },

    #[error("Failed to fetch geocodes: no results for address")]
    NoResults,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeoCode, GeocodeError>;
}
