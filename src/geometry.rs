//! Geometry primitives shared by every coordinate frame.
//!
//! This module provides:
//! - `Point`, `Size` and `Rect` value types (content, viewport or window units)
//! - `ViewFrame`, the placement of an arbitrary host view inside the window

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A 2D extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, negative or not finite.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// An axis-aligned rectangle.
///
/// Containment is half-open: the min edges are inside, the max edges are not,
/// so two rectangles sharing an edge never both contain a point on it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Create a rectangle from two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let x = p1.x.min(p2.x);
        let y = p1.y.min(p2.y);
        Self::new(x, y, (p1.x - p2.x).abs(), (p1.y - p2.y).abs())
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Get the center point of the rectangle.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside the rectangle (half-open on the max edges).
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x && point.x < self.max_x() && point.y >= self.y && point.y < self.max_y()
    }

    /// Check whether `other` lies completely inside this rectangle, edges included.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// A rectangle is degenerate when it has no area or carries non-finite values.
    pub fn is_degenerate(&self) -> bool {
        !self.origin().is_finite() || self.size().is_empty()
    }
}

// ============================================================================
// View Frames
// ============================================================================

/// Placement of a host view's coordinate system inside the window.
///
/// A point `local` in the view maps to `origin + local * scale` in window
/// coordinates. `ViewFrame::WINDOW` is the window itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFrame {
    origin: Point,
    scale: f64,
}

impl ViewFrame {
    /// The window's own coordinate system.
    pub const WINDOW: ViewFrame = ViewFrame {
        origin: Point::ZERO,
        scale: 1.0,
    };

    /// Create a frame at `origin` (window coordinates) with a uniform `scale`.
    pub fn new(origin: Point, scale: f64) -> Result<Self, GeometryError> {
        if !origin.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GeometryError::InvalidScale(scale));
        }
        Ok(Self { origin, scale })
    }

    /// An unscaled frame translated to `origin`.
    pub fn at(origin: Point) -> Result<Self, GeometryError> {
        Self::new(origin, 1.0)
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn point_to_window(&self, local: Point) -> Point {
        Point::new(
            self.origin.x + local.x * self.scale,
            self.origin.y + local.y * self.scale,
        )
    }

    pub fn point_from_window(&self, window: Point) -> Point {
        Point::new(
            (window.x - self.origin.x) / self.scale,
            (window.y - self.origin.y) / self.scale,
        )
    }

    pub fn rect_to_window(&self, local: Rect) -> Rect {
        Rect::from_origin_size(
            self.point_to_window(local.origin()),
            Size::new(local.width * self.scale, local.height * self.scale),
        )
    }

    pub fn rect_from_window(&self, window: Rect) -> Rect {
        Rect::from_origin_size(
            self.point_from_window(window.origin()),
            Size::new(window.width / self.scale, window.height / self.scale),
        )
    }
}

impl Default for ViewFrame {
    fn default() -> Self {
        Self::WINDOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_from_corners() {
        let rect = Rect::from_corners(Point::new(10.0, 20.0), Point::new(50.0, 80.0));
        assert_eq!(rect, Rect::new(10.0, 20.0, 40.0, 60.0));

        // Reversed corners give the same rectangle
        let rect2 = Rect::from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert_eq!(rect, rect2);
    }

    #[test]
    fn test_contains_is_half_open() {
        let rect = Rect::new(10.0, 10.0, 100.0, 100.0);
        assert!(rect.contains(&Point::new(50.0, 50.0)));
        assert!(rect.contains(&Point::new(10.0, 10.0)));
        assert!(rect.contains(&Point::new(10.0, 60.0)));
        assert!(!rect.contains(&Point::new(110.0, 50.0)));
        assert!(!rect.contains(&Point::new(50.0, 110.0)));
        assert!(!rect.contains(&Point::new(5.0, 50.0)));
    }

    #[test]
    fn test_shared_edge_belongs_to_one_rect() {
        let left = Rect::new(0.0, 0.0, 50.0, 50.0);
        let right = Rect::new(50.0, 0.0, 50.0, 50.0);
        let on_edge = Point::new(50.0, 25.0);
        assert!(!left.contains(&on_edge));
        assert!(right.contains(&on_edge));
    }

    #[test]
    fn test_degenerate_rects() {
        assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_degenerate());
        assert!(Rect::new(0.0, 0.0, 10.0, -1.0).is_degenerate());
        assert!(Rect::new(f64::NAN, 0.0, 10.0, 10.0).is_degenerate());
        assert!(Rect::new(0.0, 0.0, f64::INFINITY, 10.0).is_degenerate());
        assert!(!Rect::new(-5.0, -5.0, 1.0, 1.0).is_degenerate());
    }

    #[test]
    fn test_view_frame_rejects_bad_scale() {
        assert!(ViewFrame::new(Point::ZERO, 0.0).is_err());
        assert!(ViewFrame::new(Point::ZERO, -2.0).is_err());
        assert!(ViewFrame::new(Point::ZERO, f64::NAN).is_err());
        assert!(ViewFrame::new(Point::new(f64::INFINITY, 0.0), 1.0).is_err());
    }

    #[test]
    fn test_view_frame_round_trip() {
        let frame = ViewFrame::new(Point::new(12.5, -40.0), 2.0).unwrap();
        let local = Point::new(3.0, 7.0);
        let window = frame.point_to_window(local);
        assert_eq!(window, Point::new(18.5, -26.0));
        assert_eq!(frame.point_from_window(window), local);

        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        let back = frame.rect_from_window(frame.rect_to_window(rect));
        assert_eq!(back, rect);
    }
}
