//! Application configuration
//!
//! Everything the app needs to know before the first frame: the map-service
//! credential, where the camera starts, and how autocomplete is biased.
//! Defaults come from [`crate::core::constants`]; the credential and an
//! optional desktop location fix come from the environment.

use crate::core::constants::{
    API_KEY_ENV, DEFAULT_CENTER, DEFAULT_ZOOM, LOCATION_ENV, MAP_LIBRARIES, PAN_ZOOM,
    SEARCH_RADIUS_METERS,
};
use crate::core::geo::LatLng;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Location autocomplete results are biased towards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchBias {
    pub location: LatLng,
    pub radius_meters: u32,
}

impl Default for SearchBias {
    fn default() -> Self {
        Self {
            location: LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            radius_meters: SEARCH_RADIUS_METERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Map-service credential; `None` makes the map load fail
    pub api_key: Option<String>,
    /// Libraries requested with the map script
    pub libraries: Vec<String>,
    pub initial_center: LatLng,
    pub initial_zoom: f64,
    /// Zoom `pan_to` lands on
    pub pan_zoom: f64,
    pub search_bias: SearchBias,
    /// Fixed position answered by the desktop geolocator
    pub fixed_location: Option<LatLng>,
    /// Show the +/- zoom control on the map
    pub zoom_control: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            libraries: MAP_LIBRARIES.iter().map(|s| s.to_string()).collect(),
            initial_center: LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            initial_zoom: DEFAULT_ZOOM,
            pan_zoom: PAN_ZOOM,
            search_bias: SearchBias::default(),
            fixed_location: None,
            zoom_control: true,
        }
    }
}

impl AppConfig {
    /// Reads the credential baked in at build time, falling back to the
    /// process environment, plus the optional location fix.
    pub fn from_env() -> Result<Self> {
        let api_key = option_env!("SPOTMAP_MAPS_API_KEY")
            .map(str::to_string)
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty());

        let fixed_location = match std::env::var(LOCATION_ENV) {
            Ok(raw) => Some(raw.parse::<LatLng>()?),
            Err(_) => None,
        };

        if api_key.is_none() {
            log::warn!("{API_KEY_ENV} is not set; the map will fail to load");
        }

        Ok(Self {
            api_key,
            fixed_location,
            ..Self::default()
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_initial_view(mut self, center: LatLng, zoom: f64) -> Self {
        self.initial_center = center;
        self.initial_zoom = zoom;
        self
    }

    pub fn with_fixed_location(mut self, location: LatLng) -> Self {
        self.fixed_location = Some(location);
        self
    }
}
