//! Application shell
//!
//! Owns the marker layer, the selection, the map load lifecycle and the
//! camera capability handed over by the surface. Collaborator calls run on
//! the async runtime and come back as [`AppEvent`]s, which are applied on
//! the UI thread by [`App::pump`].

use crate::core::{camera::Camera, config::AppConfig, geo::LatLng};
use crate::layers::marker::{Marker, MarkerId, MarkerLayer};
use crate::prelude::{Arc, Duration, Future, Mutex};
use crate::runtime::{self, MaybeSend};
use crate::services::{
    self, AutocompleteRequest, GeocodeRequest, Geolocator, GoogleMapsLoader,
    GooglePlaces, LoadRequest, MapLoader, PlacesService, ServiceResult, Suggestion,
};
use crate::ui::{LocateButton, MapSurface, SearchBox};
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fmt;

/// What a camera capability must support
pub trait CameraControl: Send + Sync {
    fn pan_to(&self, center: LatLng);
    fn set_zoom(&self, zoom: f64);
    fn camera(&self) -> Camera;
}

impl CameraControl for Mutex<Camera> {
    fn pan_to(&self, center: LatLng) {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .set_center(center);
    }

    fn set_zoom(&self, zoom: f64) {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .set_zoom(zoom);
    }

    fn camera(&self) -> Camera {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Camera capability handed from the map surface to the shell on load
#[derive(Clone)]
pub struct MapHandle(Arc<dyn CameraControl>);

impl MapHandle {
    pub fn new(control: Arc<dyn CameraControl>) -> Self {
        Self(control)
    }

    pub fn pan_to(&self, center: LatLng) {
        self.0.pan_to(center);
    }

    pub fn set_zoom(&self, zoom: f64) {
        self.0.set_zoom(zoom);
    }

    pub fn camera(&self) -> Camera {
        self.0.camera()
    }
}

impl fmt::Debug for MapHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MapHandle").field(&self.0.camera()).finish()
    }
}

/// Map script lifecycle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Ready,
    Failed(String),
}

/// A collaborator call that finished
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    MapLoaded(ServiceResult<()>),
    SuggestionsReady {
        query: String,
        result: ServiceResult<Vec<Suggestion>>,
    },
    AddressResolved {
        address: String,
        result: ServiceResult<LatLng>,
    },
    PositionResolved(ServiceResult<LatLng>),
}

/// The collaborators the app talks to
#[derive(Clone)]
pub struct Services {
    pub loader: Arc<dyn MapLoader>,
    pub places: Arc<dyn PlacesService>,
    pub geolocator: Arc<dyn Geolocator>,
}

impl Services {
    /// Google web services, plus the platform's geolocator
    pub fn google(config: &AppConfig) -> Self {
        let api_key = config.api_key.clone().unwrap_or_default();

        #[cfg(feature = "wasm")]
        let geolocator: Arc<dyn Geolocator> = Arc::new(services::BrowserGeolocator);
        #[cfg(not(feature = "wasm"))]
        let geolocator: Arc<dyn Geolocator> =
            Arc::new(services::FixedGeolocator::new(config.fixed_location));

        Self {
            loader: Arc::new(GoogleMapsLoader::new()),
            places: Arc::new(GooglePlaces::new(api_key)),
            geolocator,
        }
    }
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Spawns collaborator calls and posts their completions back to the app
#[derive(Clone)]
pub struct Dispatcher {
    services: Services,
    tx: Sender<AppEvent>,
    waker: Option<Waker>,
}

impl Dispatcher {
    pub fn new(services: Services, tx: Sender<AppEvent>) -> Self {
        Self {
            services,
            tx,
            waker: None,
        }
    }

    /// Called after every completion, e.g. to request a repaint
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    fn run<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = AppEvent> + MaybeSend + 'static,
    {
        let tx = self.tx.clone();
        let waker = self.waker.clone();
        runtime::spawn(label, async move {
            let event = task.await;
            if tx.send(event).is_err() {
                log::debug!("app is gone; dropping completion");
                return;
            }
            if let Some(wake) = waker {
                wake();
            }
        });
    }

    pub fn load_map(&self, request: LoadRequest) {
        let loader = self.services.loader.clone();
        self.run("map load", async move { AppEvent::MapLoaded(loader.load(&request).await) });
    }

    pub fn fetch_suggestions(&self, request: AutocompleteRequest) {
        let places = self.services.places.clone();
        self.run("autocomplete", async move {
            let result = places.predictions(&request).await;
            AppEvent::SuggestionsReady {
                query: request.input,
                result,
            }
        });
    }

    pub fn resolve_address(&self, request: GeocodeRequest) {
        let places = self.services.places.clone();
        self.run("geocode", async move {
            let result = services::resolve_address(places.as_ref(), &request.address).await;
            AppEvent::AddressResolved {
                address: request.address,
                result,
            }
        });
    }

    pub fn locate(&self) {
        let geolocator = self.services.geolocator.clone();
        self.run("geolocation", async move {
            AppEvent::PositionResolved(geolocator.current_position().await)
        });
    }
}

pub struct App {
    config: AppConfig,
    load_state: LoadState,
    markers: MarkerLayer,
    map: Option<MapHandle>,
    surface: MapSurface,
    search: SearchBox,
    locate: LocateButton,
    dispatcher: Dispatcher,
    events: Receiver<AppEvent>,
}

impl App {
    pub fn new(config: AppConfig, services: Services) -> Self {
        let (tx, events) = unbounded();
        Self {
            surface: MapSurface::new(config.initial_center, config.initial_zoom, config.zoom_control),
            search: SearchBox::new(config.search_bias.clone()),
            locate: LocateButton::new(),
            markers: MarkerLayer::new(),
            map: None,
            load_state: LoadState::Unloaded,
            dispatcher: Dispatcher::new(services, tx),
            events,
            config,
        }
    }

    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.dispatcher = self.dispatcher.with_waker(waker);
        self
    }

    /// Kicks off the map load; later calls do nothing
    pub fn start(&mut self) {
        if self.load_state != LoadState::Unloaded {
            return;
        }
        self.load_state = LoadState::Loading;
        self.dispatcher.load_map(LoadRequest {
            api_key: self.config.api_key.clone(),
            libraries: self.config.libraries.clone(),
        });
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_ready(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    pub fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    pub fn search(&self) -> &SearchBox {
        &self.search
    }

    pub fn locate_button(&self) -> &LocateButton {
        &self.locate
    }

    pub fn add_marker(&mut self, position: LatLng) -> MarkerId {
        self.markers.add(position)
    }

    pub fn select_marker(&mut self, id: MarkerId) -> Result<()> {
        self.markers.select(id)
    }

    pub fn clear_selection(&mut self) {
        self.markers.clear_selection();
    }

    pub fn selected(&self) -> Option<&Marker> {
        self.markers.selected()
    }

    /// Stores the camera capability; replaces any previous one
    pub fn attach_map(&mut self, handle: MapHandle) {
        self.map = Some(handle);
    }

    pub fn camera(&self) -> Option<Camera> {
        self.map.as_ref().map(MapHandle::camera)
    }

    /// Centers the camera on `position` at the configured pan zoom
    pub fn pan_to(&self, position: LatLng) {
        match &self.map {
            Some(handle) => {
                handle.pan_to(position);
                handle.set_zoom(self.config.pan_zoom);
            }
            None => log::debug!("pan_to({position}) before the map loaded; ignoring"),
        }
    }

    pub fn search_query_changed(&mut self, text: impl Into<String>) {
        if let Some(request) = self.search.on_query_change(text) {
            self.dispatcher.fetch_suggestions(request);
        }
    }

    pub fn search_select(&mut self, description: impl Into<String>) {
        if !self.is_ready() {
            return;
        }
        let request = self.search.on_select(description);
        self.dispatcher.resolve_address(request);
    }

    pub fn locate(&mut self) {
        if !self.is_ready() {
            log::debug!("locate requested before the map loaded; ignoring");
            return;
        }
        self.locate.on_click();
        self.dispatcher.locate();
    }

    /// Applies every completion that has arrived; returns how many
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Waits up to `timeout` for a completion, then drains the rest
    pub fn pump_blocking(&mut self, timeout: Duration) -> usize {
        match self.events.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                1 + self.pump()
            }
            Err(_) => 0,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::MapLoaded(Ok(())) => {
                log::debug!("map loaded");
                self.load_state = LoadState::Ready;
                self.search.set_ready(true);
                if let Some(handle) = self.surface.take_handle() {
                    self.attach_map(handle);
                }
            }
            AppEvent::MapLoaded(Err(e)) => {
                log::warn!("map failed to load: {e}");
                self.load_state = LoadState::Failed(e.to_string());
            }
            AppEvent::SuggestionsReady { query, result } => {
                self.search.apply_suggestions(&query, result);
            }
            AppEvent::AddressResolved { address, result } => {
                if let Some(position) = self.search.finish_resolve(&address, result) {
                    self.pan_to(position);
                }
            }
            AppEvent::PositionResolved(result) => {
                if let Some(position) = self.locate.finish(result) {
                    self.pan_to(position);
                }
            }
        }
    }
}

#[cfg(feature = "egui")]
mod render {
    use super::*;
    use crate::core::constants::{LOADING_TEXT, LOAD_ERROR_TEXT};
    use crate::ui::SearchAction;
    use chrono::Utc;
    use egui::{Align2, Context, Id, Vec2};

    impl App {
        /// Draws one frame and applies what the user did in it
        pub fn ui(&mut self, ctx: &Context) {
            match &self.load_state {
                LoadState::Ready => {}
                LoadState::Failed(_) => {
                    egui::CentralPanel::default().show(ctx, |ui| {
                        ui.label(LOAD_ERROR_TEXT);
                    });
                    return;
                }
                LoadState::Unloaded | LoadState::Loading => {
                    egui::CentralPanel::default().show(ctx, |ui| {
                        ui.label(LOADING_TEXT);
                    });
                    return;
                }
            }

            let now = Utc::now();
            let surface = egui::CentralPanel::default()
                .frame(egui::Frame::none())
                .show(ctx, |ui| self.surface.show(ui, &self.markers, now))
                .inner;

            egui::Area::new(Id::new("spotmap-title"))
                .anchor(Align2::LEFT_TOP, Vec2::new(10.0, 10.0))
                .show(ctx, |ui| {
                    ui.heading("Monkeys 🐒");
                });

            let search_action = egui::Area::new(Id::new("spotmap-search"))
                .anchor(Align2::CENTER_TOP, Vec2::new(0.0, 10.0))
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style())
                        .show(ui, |ui| self.search.show(ui))
                        .inner
                })
                .inner;

            let locate_clicked = egui::Area::new(Id::new("spotmap-locate"))
                .anchor(Align2::RIGHT_TOP, Vec2::new(-60.0, 10.0))
                .show(ctx, |ui| self.locate.show(ui))
                .inner;

            if let Some(position) = surface.map_clicked {
                self.add_marker(position);
            }
            if let Some(id) = surface.marker_clicked {
                if let Err(e) = self.select_marker(id) {
                    log::warn!("{e}");
                }
            }
            if surface.popup_closed {
                self.clear_selection();
            }

            match search_action {
                Some(SearchAction::Edited(text)) => self.search_query_changed(text),
                Some(SearchAction::Picked(description)) => self.search_select(description),
                None => {}
            }
            if locate_clicked {
                self.locate();
            }

            // Keep "Spotted today at ..." current while a popup is open
            if self.markers.selected().is_some() {
                ctx.request_repaint_after(Duration::from_secs(30));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;

    fn app() -> App {
        App::new(AppConfig::default(), Services::google(&AppConfig::default()))
    }

    fn loaded_app() -> App {
        let mut app = app();
        app.handle_event(AppEvent::MapLoaded(Ok(())));
        app
    }

    #[test]
    fn test_load_success_hands_over_camera() {
        let app = loaded_app();
        assert!(app.is_ready());
        assert!(app.search().is_ready());
        let camera = app.camera().unwrap();
        assert_eq!(camera.center, LatLng::new(54.8982139, 23.9044817));
        assert_eq!(camera.zoom, 8.0);
    }

    #[test]
    fn test_load_failure() {
        let mut app = app();
        app.handle_event(AppEvent::MapLoaded(Err(ServiceError::MissingApiKey)));
        assert!(matches!(app.load_state(), LoadState::Failed(_)));
        assert!(app.camera().is_none());
        assert!(!app.search().is_ready());
    }

    #[test]
    fn test_pan_before_load_is_noop() {
        let app = app();
        app.pan_to(LatLng::new(1.0, 2.0));
        assert!(app.camera().is_none());
    }

    #[test]
    fn test_pan_to_sets_center_and_fixed_zoom() {
        let app = loaded_app();
        for (start_zoom, target) in [(3.0, LatLng::new(10.0, 20.0)), (19.0, LatLng::new(-33.9, 18.4))] {
            if let Some(handle) = &app.map {
                handle.set_zoom(start_zoom);
            }
            app.pan_to(target);
            let camera = app.camera().unwrap();
            assert_eq!(camera.center, target);
            assert_eq!(camera.zoom, 14.0);
        }
    }

    #[test]
    fn test_pan_to_beyond_mercator_range_keeps_target() {
        let app = loaded_app();
        app.pan_to(LatLng::new(89.0, 10.0));
        let camera = app.camera().unwrap();
        assert_eq!(camera.center, LatLng::new(89.0, 10.0));
        assert_eq!(camera.zoom, 14.0);
    }

    #[test]
    fn test_clicks_append_in_order() {
        let mut app = loaded_app();
        let clicks = [LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0), LatLng::new(1.0, 1.0)];
        for click in clicks {
            app.add_marker(click);
        }
        let positions: Vec<_> = app.markers().iter().map(Marker::position).collect();
        assert_eq!(positions, clicks);
    }

    #[test]
    fn test_single_selection() {
        let mut app = loaded_app();
        let a = app.add_marker(LatLng::new(1.0, 1.0));
        let b = app.add_marker(LatLng::new(2.0, 2.0));

        app.select_marker(a).unwrap();
        app.select_marker(b).unwrap();
        assert_eq!(app.selected().map(Marker::id), Some(b));

        app.clear_selection();
        assert!(app.selected().is_none());
        app.clear_selection();
        assert!(app.selected().is_none());
    }

    #[test]
    fn test_position_result_pans() {
        let mut app = loaded_app();
        app.handle_event(AppEvent::PositionResolved(Ok(LatLng::new(40.0, -3.7))));
        assert_eq!(app.camera().unwrap().center, LatLng::new(40.0, -3.7));

        app.handle_event(AppEvent::PositionResolved(Err(ServiceError::PermissionDenied)));
        assert_eq!(app.camera().unwrap().center, LatLng::new(40.0, -3.7));
        assert!(app.locate_button().last_failure().is_some());
    }
}
