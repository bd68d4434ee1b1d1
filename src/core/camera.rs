use crate::core::constants::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, Point, EARTH_RADIUS};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the drawing area in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl Camera {
    /// Creates a new camera
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }

    /// Sets the center as given. Projection clamps latitude on its own.
    pub fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Sets the drawing area size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Changes zoom by `delta`, returns whether anything changed
    pub fn zoom_by(&mut self, delta: f64) -> bool {
        let before = self.zoom;
        self.set_zoom(self.zoom + delta);
        (self.zoom - before).abs() > f64::EPSILON
    }

    /// Projects a LatLng to world pixel coordinates at the current zoom level
    pub fn project(&self, lat_lng: &LatLng) -> Point {
        let scale = TILE_SIZE * 2_f64.powf(self.zoom);
        let merc = lat_lng.to_mercator();
        let circumference = 2.0 * PI * EARTH_RADIUS;

        Point::new(
            (merc.x + PI * EARTH_RADIUS) / circumference * scale,
            (-merc.y + PI * EARTH_RADIUS) / circumference * scale,
        )
    }

    /// Unprojects world pixel coordinates back to LatLng at the current zoom level
    pub fn unproject(&self, pixel: &Point) -> LatLng {
        let scale = TILE_SIZE * 2_f64.powf(self.zoom);
        let circumference = 2.0 * PI * EARTH_RADIUS;

        let x = (pixel.x / scale) * circumference - PI * EARTH_RADIUS;
        let y = PI * EARTH_RADIUS - (pixel.y / scale) * circumference;

        LatLng::from_mercator(Point::new(x, y))
    }

    /// Converts a geographical coordinate to pixels relative to the top-left of the drawing area
    pub fn lat_lng_to_screen(&self, lat_lng: &LatLng) -> Point {
        let half = self.size.multiply(0.5);
        self.project(lat_lng)
            .subtract(&self.project(&self.center))
            .add(&half)
    }

    /// Converts drawing-area pixels back to geographical coordinates
    pub fn screen_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let half = self.size.multiply(0.5);
        let world = pixel.subtract(&half).add(&self.project(&self.center));
        self.unproject(&world)
    }

    /// Moves the center by a screen-space drag delta
    pub fn pan_by_pixels(&mut self, dx: f64, dy: f64) {
        let center_px = self.project(&self.center);
        let moved = self.unproject(&Point::new(center_px.x - dx, center_px.y - dy));
        self.set_center(LatLng::new(
            LatLng::clamp_lat(moved.lat),
            LatLng::wrap_lng(moved.lng),
        ));
    }
}
