use async_trait::async_trait;
use spotmap::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Integration tests driving the shell through its collaborators
/// the way a user session does: load, type, pick, locate.
#[cfg(test)]
mod integration_tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(2);

    struct OkLoader;

    #[async_trait]
    impl MapLoader for OkLoader {
        async fn load(&self, _: &LoadRequest) -> ServiceResult<()> {
            Ok(())
        }
    }

    struct FailingLoader;

    #[async_trait]
    impl MapLoader for FailingLoader {
        async fn load(&self, _: &LoadRequest) -> ServiceResult<()> {
            Err(ServiceError::Http("HTTP 403 loading map script".to_string()))
        }
    }

    struct MockPlaces {
        suggestions: Vec<Suggestion>,
        geocode: ServiceResult<Vec<GeocodeResult>>,
        geocode_calls: AtomicUsize,
    }

    #[async_trait]
    impl PlacesService for MockPlaces {
        async fn predictions(&self, _: &AutocompleteRequest) -> ServiceResult<Vec<Suggestion>> {
            Ok(self.suggestions.clone())
        }

        async fn geocode(&self, _: &str) -> ServiceResult<Vec<GeocodeResult>> {
            self.geocode_calls.fetch_add(1, Ordering::SeqCst);
            self.geocode.clone()
        }
    }

    struct MockGeolocator(ServiceResult<LatLng>);

    #[async_trait]
    impl Geolocator for MockGeolocator {
        async fn current_position(&self) -> ServiceResult<LatLng> {
            self.0.clone()
        }
    }

    /// Never answers, like a dismissed browser permission prompt
    #[derive(Default)]
    struct SilentGeolocator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geolocator for SilentGeolocator {
        async fn current_position(&self) -> ServiceResult<LatLng> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            futures::future::pending().await
        }
    }

    /// Camera that remembers every pan
    struct RecordingCamera {
        camera: Mutex<Camera>,
        pans: Mutex<Vec<LatLng>>,
    }

    impl RecordingCamera {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                camera: Mutex::new(Camera::new(LatLng::new(0.0, 0.0), 8.0, Point::new(800.0, 600.0))),
                pans: Mutex::new(Vec::new()),
            })
        }

        fn pans(&self) -> Vec<LatLng> {
            self.pans.lock().unwrap().clone()
        }
    }

    impl CameraControl for RecordingCamera {
        fn pan_to(&self, center: LatLng) {
            self.pans.lock().unwrap().push(center);
            self.camera.lock().unwrap().set_center(center);
        }

        fn set_zoom(&self, zoom: f64) {
            self.camera.lock().unwrap().set_zoom(zoom);
        }

        fn camera(&self) -> Camera {
            self.camera.lock().unwrap().clone()
        }
    }

    fn street_suggestions() -> Vec<Suggestion> {
        vec![Suggestion::new("1", "A St"), Suggestion::new("2", "B Ave")]
    }

    fn places(geocode: ServiceResult<Vec<GeocodeResult>>) -> Arc<MockPlaces> {
        Arc::new(MockPlaces {
            suggestions: street_suggestions(),
            geocode,
            geocode_calls: AtomicUsize::new(0),
        })
    }

    fn services(loader: Arc<dyn MapLoader>, places: Arc<MockPlaces>, position: ServiceResult<LatLng>) -> Services {
        Services {
            loader,
            places,
            geolocator: Arc::new(MockGeolocator(position)),
        }
    }

    /// Starts the app, waits for the load, then swaps in a recording camera
    fn loaded_app(services: Services) -> (App, Arc<RecordingCamera>) {
        let mut app = App::new(AppConfig::default().with_api_key("test-key"), services);
        app.start();
        assert_eq!(app.load_state(), &LoadState::Loading);
        assert_eq!(app.pump_blocking(WAIT), 1);
        assert!(app.is_ready());

        let camera = RecordingCamera::new();
        app.attach_map(MapHandle::new(camera.clone()));
        (app, camera)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_select_suggestion_pans_once() {
        let places = places(Ok(vec![GeocodeResult {
            formatted_address: "B Ave".to_string(),
            location: LatLng::new(10.0, 20.0),
        }]));
        let (mut app, camera) = loaded_app(services(Arc::new(OkLoader), places.clone(), Ok(LatLng::default())));

        app.search_query_changed("B");
        app.pump_blocking(WAIT);
        assert_eq!(app.search().status(), &SuggestionStatus::Ok);
        assert_eq!(app.search().visible_suggestions(), street_suggestions().as_slice());

        app.search_select("B Ave");
        assert!(app.search().visible_suggestions().is_empty());
        app.pump_blocking(WAIT);

        assert_eq!(camera.pans(), vec![LatLng::new(10.0, 20.0)]);
        assert_eq!(camera.camera().zoom, 14.0);
        assert_eq!(places.geocode_calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.search().query(), "B Ave");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rejected_geocode_never_pans() {
        let places = places(Err(ServiceError::Status {
            status: "OVER_QUERY_LIMIT".to_string(),
            message: String::new(),
        }));
        let (mut app, camera) = loaded_app(services(Arc::new(OkLoader), places, Ok(LatLng::default())));

        app.search_select("A St");
        assert_eq!(app.pump_blocking(WAIT), 1);

        assert!(camera.pans().is_empty());
        assert!(app.search().last_failure().is_some());
        assert!(app.is_ready());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_geocode_never_pans() {
        let (mut app, camera) = loaded_app(services(Arc::new(OkLoader), places(Ok(Vec::new())), Ok(LatLng::default())));

        app.search_select("Nowhere");
        app.pump_blocking(WAIT);

        assert!(camera.pans().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_locate_pans_to_position() {
        let here = LatLng::new(54.687, 25.279);
        let (mut app, camera) = loaded_app(services(Arc::new(OkLoader), places(Ok(Vec::new())), Ok(here)));

        app.locate();
        assert!(app.locate_button().is_pending());
        app.pump_blocking(WAIT);

        assert_eq!(camera.pans(), vec![here]);
        assert!(!app.locate_button().is_pending());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_locate_failure_is_contained() {
        let (mut app, camera) = loaded_app(services(
            Arc::new(OkLoader),
            places(Ok(Vec::new())),
            Err(ServiceError::PermissionDenied),
        ));

        app.locate();
        app.pump_blocking(WAIT);

        assert!(camera.pans().is_empty());
        assert_eq!(app.locate_button().last_failure(), Some("location permission denied"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unanswered_locate_does_not_block_retry() {
        let geolocator = Arc::new(SilentGeolocator::default());
        let (mut app, camera) = loaded_app(Services {
            loader: Arc::new(OkLoader),
            places: places(Ok(Vec::new())),
            geolocator: geolocator.clone(),
        });

        app.locate();
        assert_eq!(app.pump_blocking(Duration::from_millis(200)), 0);
        assert!(app.locate_button().is_pending());

        app.locate();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(geolocator.calls.load(Ordering::SeqCst), 2);
        assert!(camera.pans().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_load_failure_disables_everything() {
        let mut app = App::new(
            AppConfig::default(),
            services(Arc::new(FailingLoader), places(Ok(Vec::new())), Ok(LatLng::default())),
        );
        app.start();
        app.pump_blocking(WAIT);

        assert!(matches!(app.load_state(), LoadState::Failed(_)));
        assert!(app.camera().is_none());

        app.search_query_changed("A");
        app.search_select("A St");
        app.locate();
        // Nothing was dispatched, so nothing comes back
        assert_eq!(app.pump_blocking(Duration::from_millis(100)), 0);
        assert!(!app.locate_button().is_pending());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_waker_runs_per_completion() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = wakes.clone();
        let mut app = App::new(
            AppConfig::default(),
            services(Arc::new(OkLoader), places(Ok(Vec::new())), Ok(LatLng::default())),
        )
        .with_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        app.start();
        app.pump_blocking(WAIT);
        // The waker fires right after the send; give it a moment
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(wakes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_suggestions_last_arrival_wins() {
        let mut app = App::new(
            AppConfig::default(),
            services(Arc::new(OkLoader), places(Ok(Vec::new())), Ok(LatLng::default())),
        );
        app.handle_event(AppEvent::MapLoaded(Ok(())));

        app.handle_event(AppEvent::SuggestionsReady {
            query: "B Ave".to_string(),
            result: Ok(vec![Suggestion::new("2", "B Ave")]),
        });
        app.handle_event(AppEvent::SuggestionsReady {
            query: "B".to_string(),
            result: Ok(street_suggestions()),
        });
        assert_eq!(app.search().visible_suggestions().len(), 2);
    }
}
