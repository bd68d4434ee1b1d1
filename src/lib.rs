//! # spotmap
//!
//! A click-to-spot map application built on egui.
//!
//! Clicking the map drops a marker, clicking a marker opens a popup saying
//! when it was spotted, the search box autocompletes addresses and pans the
//! camera there, and the locate button pans to the current position. The
//! hosted map, places and geolocation services are reached through the
//! traits in [`services`].

pub mod core;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod services;
pub mod shell;
pub mod ui;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    camera::Camera,
    config::{AppConfig, SearchBias},
    geo::{LatLng, Point},
    time::format_relative,
};

pub use layers::marker::{Marker, MarkerId, MarkerLayer};

pub use services::{
    AutocompleteRequest, GeocodeResult, Geolocator, LoadRequest, MapLoader, PlacesService,
    ServiceError, ServiceResult, Suggestion,
};

pub use shell::{App, AppEvent, CameraControl, Dispatcher, LoadState, MapHandle, Services};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Unknown marker: {0}")]
    UnknownMarker(MarkerId),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

/// Error type alias for convenience
pub type Error = MapError;
