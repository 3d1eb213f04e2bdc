//! FlyerKit - zoomable flyer view core
//!
//! Render-agnostic state for a large pannable, zoomable content surface shown
//! through a bounded viewport, with interactive annotations placed in the
//! content's own coordinate space. The host renders; this crate owns the
//! coordinate math, zoom/pan state, hit-testing, gesture dispatch and the
//! load state machine.

pub mod annotation;
pub mod config;
pub mod constants;
pub mod delegate;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod loader;
pub mod transform;
pub mod view;
pub mod zoom;

#[cfg(not(target_arch = "wasm32"))]
pub mod fetch_thread;

pub use annotation::{AnnotationRegistry, BadgeAnnotation, HighlightAnnotation, TapAnnotation};
pub use config::{ConfigError, GestureConfig, InitialZoom, LogLevel, ViewerConfig};
pub use delegate::FlyerViewDelegate;
pub use error::{FetchError, FlyerError, GeometryError};
pub use geometry::{Point, Rect, Size, ViewFrame};
pub use gesture::{GestureEvent, TapClassifier, TouchPhase};
pub use loader::{ContentDescriptor, ContentFetcher, FetchReply, FetchRequest, LoadState, RequestToken};
pub use transform::ViewTransform;
pub use view::FlyerView;
pub use zoom::ZoomState;

#[cfg(not(target_arch = "wasm32"))]
pub use fetch_thread::BackgroundFetcher;
