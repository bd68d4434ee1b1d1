use crate::core::geo::LatLng;
use crate::services::ServiceResult;

/// "Locate me" button state. Clicking always asks again; an unanswered
/// request never locks the button.
#[derive(Debug, Clone, Default)]
pub struct LocateButton {
    in_flight: usize,
    last_failure: Option<String>,
}

impl LocateButton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new position request
    pub fn on_click(&mut self) {
        if self.in_flight > 0 {
            log::debug!("{} position request(s) still unanswered; asking again", self.in_flight);
        }
        self.in_flight += 1;
        self.last_failure = None;
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Consumes the position outcome; `Some` means the camera should move there.
    pub fn finish(&mut self, result: ServiceResult<LatLng>) -> Option<LatLng> {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(position) => {
                log::debug!("located at {position}");
                Some(position)
            }
            Err(e) => {
                log::warn!("geolocation failed: {e}");
                self.last_failure = Some(e.to_string());
                None
            }
        }
    }
}

#[cfg(feature = "egui")]
impl LocateButton {
    /// Draws the compass button; returns true when clicked
    pub fn show(&self, ui: &mut egui::Ui) -> bool {
        let response = ui.button("🧭");
        let response = match &self.last_failure {
            Some(reason) => response.on_hover_text(format!("Location unavailable: {reason}")),
            None if self.is_pending() => response.on_hover_text("Locating…"),
            None => response.on_hover_text("Locate me"),
        };
        response.clicked()
    }
}
