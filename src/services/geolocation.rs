use super::{Geolocator, ServiceError, ServiceResult};
use crate::core::geo::LatLng;
use async_trait::async_trait;

/// Desktop stand-in for a positioning service: answers with a configured
/// fix, or `PositionUnavailable` when none was configured.
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocator {
    position: Option<LatLng>,
}

impl FixedGeolocator {
    pub fn new(position: Option<LatLng>) -> Self {
        Self { position }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> ServiceResult<LatLng> {
        self.position.ok_or(ServiceError::PositionUnavailable)
    }
}

#[cfg(feature = "wasm")]
pub use browser::BrowserGeolocator;

#[cfg(feature = "wasm")]
mod browser {
    use super::*;
    use crate::core::constants::LOCATE_TIMEOUT_MS;
    use futures::channel::oneshot;
    use std::{cell::RefCell, rc::Rc};
    use wasm_bindgen::{closure::Closure, JsCast};
    use web_sys::{Position, PositionError, PositionOptions};

    type Reply = Rc<RefCell<Option<oneshot::Sender<ServiceResult<LatLng>>>>>;

    /// `navigator.geolocation.getCurrentPosition`, single shot
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BrowserGeolocator;

    impl BrowserGeolocator {
        fn request(&self) -> ServiceResult<oneshot::Receiver<ServiceResult<LatLng>>> {
            let geolocation = web_sys::window()
                .ok_or(ServiceError::PositionUnavailable)?
                .navigator()
                .geolocation()
                .map_err(|_| ServiceError::PositionUnavailable)?;

            let (tx, rx) = oneshot::channel();
            let reply: Reply = Rc::new(RefCell::new(Some(tx)));
            let reply_err = reply.clone();

            let on_success = Closure::once(move |position: Position| {
                let coords = position.coords();
                if let Some(tx) = reply.borrow_mut().take() {
                    let _ = tx.send(Ok(LatLng::new(coords.latitude(), coords.longitude())));
                }
            });
            let on_error = Closure::once(move |error: PositionError| {
                // TIMEOUT lands here too
                let err = if error.code() == PositionError::PERMISSION_DENIED {
                    ServiceError::PermissionDenied
                } else {
                    ServiceError::PositionUnavailable
                };
                if let Some(tx) = reply_err.borrow_mut().take() {
                    let _ = tx.send(Err(err));
                }
            });

            // Without a timeout a dismissed permission prompt never answers
            let options = PositionOptions::new();
            options.set_timeout(LOCATE_TIMEOUT_MS);

            geolocation
                .get_current_position_with_error_callback_and_options(
                    on_success.as_ref().unchecked_ref(),
                    Some(on_error.as_ref().unchecked_ref()),
                    &options,
                )
                .map_err(|_| ServiceError::PositionUnavailable)?;

            // Exactly one of the two fires; the browser owns them from here.
            on_success.forget();
            on_error.forget();
            Ok(rx)
        }
    }

    #[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
    #[cfg_attr(not(target_arch = "wasm32"), async_trait)]
    impl Geolocator for BrowserGeolocator {
        async fn current_position(&self) -> ServiceResult<LatLng> {
            let rx = self.request()?;
            rx.await.unwrap_or(Err(ServiceError::PositionUnavailable))
        }
    }
}
