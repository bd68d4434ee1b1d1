//! The map surface: camera, pins, popup and pointer handling.
//!
//! The surface never changes the marker list or the selection. It reports
//! what the pointer did in a [`SurfaceResponse`] and the shell decides.

use crate::core::camera::Camera;
use crate::core::geo::{LatLng, Point};
use crate::layers::marker::{MarkerId, MarkerLayer};
use crate::prelude::{Arc, Mutex};
use crate::shell::MapHandle;

/// Pointer outcomes of one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceResponse {
    /// Bare map clicked at these coordinates
    pub map_clicked: Option<LatLng>,
    /// A pin was clicked
    pub marker_clicked: Option<MarkerId>,
    /// The popup's close button was clicked
    pub popup_closed: bool,
}

pub struct MapSurface {
    camera: Arc<Mutex<Camera>>,
    handle_taken: bool,
    zoom_control: bool,
}

impl MapSurface {
    pub fn new(center: LatLng, zoom: f64, zoom_control: bool) -> Self {
        Self {
            camera: Arc::new(Mutex::new(Camera::new(center, zoom, Point::new(800.0, 600.0)))),
            handle_taken: false,
            zoom_control,
        }
    }

    /// Hands out the camera capability. Only the first call gets it.
    pub fn take_handle(&mut self) -> Option<MapHandle> {
        if self.handle_taken {
            return None;
        }
        self.handle_taken = true;
        Some(MapHandle::new(self.camera.clone()))
    }

    /// Snapshot of the camera
    pub fn camera(&self) -> Camera {
        self.camera
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Finds the pin nearest to `screen` within `radius` pixels. Later pins are
/// drawn on top, so they win ties.
pub fn pin_hit_test(
    camera: &Camera,
    markers: &MarkerLayer,
    screen: Point,
    radius: f64,
) -> Option<MarkerId> {
    let mut best = None;
    let mut best_dist = radius;
    for marker in markers.iter() {
        let dist = camera.lat_lng_to_screen(&marker.position()).distance_to(&screen);
        if dist <= best_dist {
            best_dist = dist;
            best = Some(marker.id());
        }
    }
    best
}

#[cfg(feature = "egui")]
mod render {
    use super::*;
    use crate::core::constants::{DEFAULT_ZOOM_DELTA, MARKER_ICON_ANCHOR, MARKER_ICON_SIZE, TILE_SIZE};
    use crate::core::time::format_relative;
    use crate::layers::marker::Marker;
    use crate::ui::popup::InfoPopup;
    use chrono::{DateTime, Local, Utc};
    use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Ui, Vec2};

    const BACKGROUND: Color32 = Color32::from_rgb(0xe9, 0xe5, 0xdc);
    const GRID: Color32 = Color32::from_rgb(0xd0, 0xcb, 0xbe);
    const PIN_FILL: Color32 = Color32::from_rgb(0x8b, 0x5a, 0x2b);
    const PIN_SELECTED: Color32 = Color32::from_rgb(0xe0, 0x7a, 0x1f);
    const CONTROL_SIZE: f32 = 30.0;

    /// Graticule spacing candidates, in degrees
    const GRID_STEPS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0];
    const MIN_GRID_SPACING_PX: f64 = 80.0;

    fn to_pos(rect: Rect, p: Point) -> Pos2 {
        rect.min + Vec2::new(p.x as f32, p.y as f32)
    }

    fn zoom_rects(rect: Rect) -> (Rect, Rect) {
        let zoom_in = Rect::from_min_size(
            rect.right_top() + Vec2::new(-40.0, 10.0),
            Vec2::splat(CONTROL_SIZE),
        );
        let zoom_out = Rect::from_min_size(
            rect.right_top() + Vec2::new(-40.0, 45.0),
            Vec2::splat(CONTROL_SIZE),
        );
        (zoom_in, zoom_out)
    }

    fn spotted_popup(marker: &Marker, now: DateTime<Utc>) -> InfoPopup {
        let spotted = marker.created_at().with_timezone(&Local);
        let now = now.with_timezone(&Local);
        InfoPopup::new(
            "Monkey Spotted",
            format!("Spotted {}", format_relative(&spotted, &now)),
        )
    }

    impl MapSurface {
        /// Draws the surface into all available space and handles the pointer
        pub fn show(&mut self, ui: &mut Ui, markers: &MarkerLayer, now: DateTime<Utc>) -> SurfaceResponse {
            let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
            let mut out = SurfaceResponse::default();

            let mut camera = self
                .camera
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            camera.set_size(Point::new(rect.width() as f64, rect.height() as f64));

            if response.hovered() {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll.abs() > 0.1 && camera.zoom_by(scroll as f64 * 0.005) {
                    ui.ctx().request_repaint();
                }
            }

            if response.dragged() {
                let delta = response.drag_delta();
                if delta.length_sq() > 0.5 {
                    camera.pan_by_pixels(delta.x as f64, delta.y as f64);
                }
            }

            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, BACKGROUND);
            paint_graticule(&painter, rect, &camera);

            for marker in markers.iter() {
                let pos = to_pos(rect, camera.lat_lng_to_screen(&marker.position()));
                paint_pin(&painter, pos, markers.selected_id() == Some(marker.id()));
            }

            let popup = markers.selected().map(|marker| {
                let popup = spotted_popup(marker, now);
                let anchor = to_pos(rect, camera.lat_lng_to_screen(&marker.position()));
                let layout = popup.layout(&painter, anchor);
                popup.paint(&painter, &layout);
                layout
            });

            let (zoom_in, zoom_out) = zoom_rects(rect);
            if self.zoom_control {
                paint_zoom_controls(&painter, zoom_in, zoom_out);
            }

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    if let Some(layout) = popup.filter(|l| l.rect.contains(pos)) {
                        out.popup_closed = layout.close_rect.contains(pos);
                    } else if self.zoom_control && zoom_in.contains(pos) {
                        camera.zoom_by(DEFAULT_ZOOM_DELTA);
                    } else if self.zoom_control && zoom_out.contains(pos) {
                        camera.zoom_by(-DEFAULT_ZOOM_DELTA);
                    } else {
                        let local = Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
                        let radius = f64::from(MARKER_ICON_ANCHOR.0);
                        match pin_hit_test(&camera, markers, local, radius) {
                            Some(id) => out.marker_clicked = Some(id),
                            None => out.map_clicked = Some(camera.screen_to_lat_lng(&local)),
                        }
                    }
                }
            }

            // Zoom readout in the corner
            let world_px = TILE_SIZE * 2_f64.powf(camera.zoom);
            painter.text(
                rect.left_bottom() + Vec2::new(8.0, -8.0),
                Align2::LEFT_BOTTOM,
                format!("zoom {:.1} · {:.0} px/°", camera.zoom, world_px / 360.0),
                FontId::proportional(11.0),
                Color32::DARK_GRAY,
            );

            out
        }
    }

    fn paint_graticule(painter: &Painter, rect: Rect, camera: &Camera) {
        let px_per_degree = TILE_SIZE * 2_f64.powf(camera.zoom) / 360.0;
        let step = GRID_STEPS
            .iter()
            .copied()
            .find(|step| step * px_per_degree >= MIN_GRID_SPACING_PX)
            .unwrap_or(30.0);

        let north_west = camera.screen_to_lat_lng(&Point::new(0.0, 0.0));
        let south_east = camera.screen_to_lat_lng(&camera.size);
        let stroke = Stroke::new(1.0, GRID);

        let mut lng = (north_west.lng / step).floor() * step;
        while lng <= south_east.lng {
            let x = camera.lat_lng_to_screen(&LatLng::new(camera.center.lat, lng)).x as f32;
            painter.line_segment(
                [Pos2::new(rect.min.x + x, rect.min.y), Pos2::new(rect.min.x + x, rect.max.y)],
                stroke,
            );
            lng += step;
        }

        let mut lat = (LatLng::clamp_lat(south_east.lat) / step).floor() * step;
        while lat <= LatLng::clamp_lat(north_west.lat) {
            let y = camera.lat_lng_to_screen(&LatLng::new(lat, camera.center.lng)).y as f32;
            painter.line_segment(
                [Pos2::new(rect.min.x, rect.min.y + y), Pos2::new(rect.max.x, rect.min.y + y)],
                stroke,
            );
            lat += step;
        }
    }

    fn paint_pin(painter: &Painter, pos: Pos2, selected: bool) {
        let radius = MARKER_ICON_SIZE.0 / 2.0;
        let fill = if selected { PIN_SELECTED } else { PIN_FILL };
        painter.circle_filled(pos, radius, fill);
        painter.circle_stroke(pos, radius, Stroke::new(2.0, Color32::WHITE));
        painter.text(
            pos,
            Align2::CENTER_CENTER,
            "🐒",
            FontId::proportional(radius * 1.2),
            Color32::WHITE,
        );
    }

    fn paint_zoom_controls(painter: &Painter, zoom_in: Rect, zoom_out: Rect) {
        for (button, label) in [(zoom_in, "+"), (zoom_out, "−")] {
            painter.rect_filled(button, 2.0, Color32::WHITE);
            painter.rect_stroke(button, 2.0, Stroke::new(1.0, Color32::GRAY));
            painter.text(
                button.center(),
                Align2::CENTER_CENTER,
                label,
                FontId::proportional(18.0),
                Color32::DARK_GRAY,
            );
        }
    }
}
