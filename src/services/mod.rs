//! External collaborators
//!
//! The app never computes geocodes, autocomplete rankings or positions
//! itself. It asks the services behind these traits and gets a
//! [`ServiceResult`] back, whatever the failure was.

pub mod geolocation;
pub mod loader;
pub mod places;

use crate::core::config::SearchBias;
use crate::core::geo::LatLng;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub use geolocation::FixedGeolocator;
#[cfg(feature = "wasm")]
pub use geolocation::BrowserGeolocator;
pub use loader::GoogleMapsLoader;
pub use places::GooglePlaces;

/// Shared async HTTP client for the map web services
#[cfg(not(target_arch = "wasm32"))]
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("spotmap/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {e}");
            reqwest::Client::new()
        })
});

/// Shared async HTTP client for the map web services
#[cfg(target_arch = "wasm32")]
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Failure reported by a collaborator.
///
/// `Clone` so completions can be carried through the event channel and kept
/// on the component that displays them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("no map API key configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("service answered {status}: {message}")]
    Status { status: String, message: String },

    #[error("no results for {0:?}")]
    NoResults(String),

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Decode(err.to_string())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// What the map script loader needs
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub api_key: Option<String>,
    pub libraries: Vec<String>,
}

/// One autocomplete round trip
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteRequest {
    pub input: String,
    pub bias: SearchBias,
}

/// Address chosen from the suggestion list, waiting to be resolved
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeRequest {
    pub address: String,
}

/// An autocomplete prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub description: String,
}

impl Suggestion {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// A geocoding candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    pub location: LatLng,
}

impl GeocodeResult {
    pub fn lat_lng(&self) -> LatLng {
        self.location
    }
}

/// Loads the hosted map script and its libraries
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MapLoader: Send + Sync {
    async fn load(&self, request: &LoadRequest) -> ServiceResult<()>;
}

/// Place autocomplete and geocoding
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PlacesService: Send + Sync {
    /// Ranked predictions for the request's input
    async fn predictions(&self, request: &AutocompleteRequest) -> ServiceResult<Vec<Suggestion>>;

    /// Geocoding candidates for a free-text address, best first
    async fn geocode(&self, address: &str) -> ServiceResult<Vec<GeocodeResult>>;
}

/// Single-shot current position
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> ServiceResult<LatLng>;
}

/// Resolves a chosen address to coordinates: geocode the text, keep the
/// best candidate, take its location.
pub async fn resolve_address(places: &dyn PlacesService, address: &str) -> ServiceResult<LatLng> {
    let results = places.geocode(address).await?;
    let best = results
        .first()
        .ok_or_else(|| ServiceError::NoResults(address.to_string()))?;
    Ok(best.lat_lng())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedPlaces(ServiceResult<Vec<GeocodeResult>>);

    #[async_trait]
    impl PlacesService for CannedPlaces {
        async fn predictions(&self, _: &AutocompleteRequest) -> ServiceResult<Vec<Suggestion>> {
            Ok(Vec::new())
        }

        async fn geocode(&self, _: &str) -> ServiceResult<Vec<GeocodeResult>> {
            self.0.clone()
        }
    }

    fn result(address: &str, lat: f64, lng: f64) -> GeocodeResult {
        GeocodeResult {
            formatted_address: address.to_string(),
            location: LatLng::new(lat, lng),
        }
    }

    #[test]
    fn test_resolve_takes_first_candidate() {
        let places = CannedPlaces(Ok(vec![result("B Ave", 10.0, 20.0), result("B Ave 2", 1.0, 2.0)]));
        let resolved = futures::executor::block_on(resolve_address(&places, "B Ave"));
        assert_eq!(resolved, Ok(LatLng::new(10.0, 20.0)));
    }

    #[test]
    fn test_resolve_without_candidates_is_no_results() {
        let places = CannedPlaces(Ok(Vec::new()));
        let resolved = futures::executor::block_on(resolve_address(&places, "Nowhere"));
        assert_eq!(resolved, Err(ServiceError::NoResults("Nowhere".to_string())));
    }

    #[test]
    fn test_resolve_passes_service_errors_through() {
        let places = CannedPlaces(Err(ServiceError::Http("timed out".to_string())));
        let resolved = futures::executor::block_on(resolve_address(&places, "A St"));
        assert!(matches!(resolved, Err(ServiceError::Http(_))));
    }
}
