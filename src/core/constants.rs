//! Engine-wide constants for the spotting map.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Square tile size in pixels used by the Web Mercator pixel space.
pub const TILE_SIZE: f64 = 256.0;

/// Initial camera center (Kaunas).
pub const DEFAULT_CENTER: (f64, f64) = (54.8982139, 23.9044817);

/// Initial camera zoom.
pub const DEFAULT_ZOOM: f64 = 8.0;

/// Zoom level `pan_to` always lands on.
pub const PAN_ZOOM: f64 = 14.0;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 20.0;

/// Step applied by the +/- zoom controls.
pub const DEFAULT_ZOOM_DELTA: f64 = 1.0;

/// Radius around the bias location that autocomplete favours, in meters.
pub const SEARCH_RADIUS_METERS: u32 = 100 * 1000;

/// Libraries requested alongside the map script.
pub const MAP_LIBRARIES: &[&str] = &["places"];

/// Marker icon size in pixels.
pub const MARKER_ICON_SIZE: (f32, f32) = (30.0, 30.0);

/// Anchor inside the icon (hot-spot) in pixel coords.
pub const MARKER_ICON_ANCHOR: (f32, f32) = (15.0, 15.0);

/// Environment variable carrying the map-service credential.
pub const API_KEY_ENV: &str = "SPOTMAP_MAPS_API_KEY";

/// Environment variable with a `"lat,lng"` fix for the desktop geolocator.
pub const LOCATION_ENV: &str = "SPOTMAP_LOCATION";

/// How long the browser may take to answer a position request.
pub const LOCATE_TIMEOUT_MS: u32 = 10_000;

pub const LOADING_TEXT: &str = "Loading maps";
pub const LOAD_ERROR_TEXT: &str = "Error loading maps";
