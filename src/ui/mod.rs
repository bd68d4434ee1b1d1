//! The three on-screen components: search box, locate button and map
//! surface. Their state logic is always compiled; drawing needs `egui`.

pub mod locate;
#[cfg(feature = "egui")]
pub mod popup;
pub mod search;
pub mod surface;

pub use locate::LocateButton;
#[cfg(feature = "egui")]
pub use popup::{InfoPopup, PopupLayout, PopupStyle};
pub use search::{SearchAction, SearchBox, SuggestionStatus};
pub use surface::{MapSurface, SurfaceResponse};
