//! Prelude module for common spotmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use spotmap::prelude::*;`

pub use crate::core::{
    camera::Camera,
    config::{AppConfig, SearchBias},
    geo::{LatLng, Point},
    time::format_relative,
};

pub use crate::layers::marker::{Marker, MarkerId, MarkerLayer};

pub use crate::services::{
    AutocompleteRequest, GeocodeRequest, GeocodeResult, Geolocator, LoadRequest, MapLoader,
    PlacesService, ServiceError, ServiceResult, Suggestion,
};

pub use crate::shell::{App, AppEvent, CameraControl, Dispatcher, LoadState, MapHandle, Services};

pub use crate::runtime::{spawn, MaybeSend, TaskSpawner};

pub use crate::ui::{
    locate::LocateButton,
    search::{SearchBox, SuggestionStatus},
    surface::{MapSurface, SurfaceResponse},
};

pub use crate::{Error as MapError, Result};

pub use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
