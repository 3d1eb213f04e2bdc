//! Global constants for the flyer view

/// Smallest zoom scale allowed by default (content units to device pixels)
pub const DEFAULT_MIN_SCALE: f64 = 0.05;

/// Largest zoom scale allowed by default
pub const DEFAULT_MAX_SCALE: f64 = 4.0;

/// Duration of an animated zoom-to-rect
pub const DEFAULT_ZOOM_ANIMATION_MS: u64 = 300;

/// Side of the square (content units) a double tap zooms into
pub const DEFAULT_DOUBLE_TAP_ZOOM_SIZE: f64 = 700.0;

/// Maximum delay between two taps for them to count as a double tap
pub const DEFAULT_DOUBLE_TAP_INTERVAL_MS: u64 = 300;

/// Hold duration after which a press becomes a long press
pub const DEFAULT_LONG_PRESS_MS: u64 = 500;

/// Movement (device pixels) tolerated before a touch stops being a tap
pub const DEFAULT_TAP_SLOP: f64 = 10.0;

/// Relative tolerance when deciding whether the scale sits at its lower limit
pub const FIT_TOLERANCE: f64 = 0.001;
