//! Content/viewport coordinate mathematics.
//!
//! Pure conversion functions between the fixed content coordinate space and
//! viewport-local pixels.
//!
//! With `scale` the content-units-to-device ratio and `offset` the content
//! coordinate at the viewport's top-left corner:
//!
//! ```text
//! content = local / scale + offset
//! local   = (content - offset) * scale
//! ```

use crate::error::GeometryError;
use crate::geometry::{Point, Rect, Size, ViewFrame};

/// Represents zoom/pan transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f64,
    offset: Point,
}

impl ViewTransform {
    /// Create a transform, rejecting a non-positive or non-finite scale.
    pub fn new(scale: f64, offset: Point) -> Result<Self, GeometryError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GeometryError::InvalidScale(scale));
        }
        if !offset.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        Ok(Self { scale, offset })
    }

    /// Create an identity transform (scale=1, no offset).
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset: Point::ZERO,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Same offset, different scale. Callers pass scales already clamped
    /// into positive limits.
    pub(crate) fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    /// Same scale, different offset.
    pub(crate) fn with_offset(self, offset: Point) -> Self {
        Self { offset, ..self }
    }

    /// Convert a viewport-local point to content coordinates.
    pub fn local_to_content(&self, local: Point) -> Point {
        Point::new(
            local.x / self.scale + self.offset.x,
            local.y / self.scale + self.offset.y,
        )
    }

    /// Convert a content point to viewport-local coordinates.
    pub fn content_to_local(&self, content: Point) -> Point {
        Point::new(
            (content.x - self.offset.x) * self.scale,
            (content.y - self.offset.y) * self.scale,
        )
    }

    pub fn local_rect_to_content(&self, local: Rect) -> Rect {
        Rect::from_origin_size(
            self.local_to_content(local.origin()),
            Size::new(local.width / self.scale, local.height / self.scale),
        )
    }

    pub fn content_rect_to_local(&self, content: Rect) -> Rect {
        Rect::from_origin_size(
            self.content_to_local(content.origin()),
            Size::new(content.width * self.scale, content.height * self.scale),
        )
    }

    /// Map a point expressed in `source` into content coordinates.
    ///
    /// The point is first taken to window coordinates, then into the
    /// viewport's local frame (`viewport`), then into content space.
    pub fn to_content(&self, point: Point, source: &ViewFrame, viewport: &ViewFrame) -> Point {
        let window = source.point_to_window(point);
        self.local_to_content(viewport.point_from_window(window))
    }

    /// Map a content point into `target`, or into window coordinates when `None`.
    pub fn to_view(&self, content: Point, target: Option<&ViewFrame>, viewport: &ViewFrame) -> Point {
        let window = viewport.point_to_window(self.content_to_local(content));
        target.map_or(window, |frame| frame.point_from_window(window))
    }

    pub fn rect_to_content(&self, rect: Rect, source: &ViewFrame, viewport: &ViewFrame) -> Rect {
        let window = source.rect_to_window(rect);
        self.local_rect_to_content(viewport.rect_from_window(window))
    }

    pub fn rect_to_view(&self, content: Rect, target: Option<&ViewFrame>, viewport: &ViewFrame) -> Rect {
        let window = viewport.rect_to_window(self.content_rect_to_local(content));
        target.map_or(window, |frame| frame.rect_from_window(window))
    }

    /// The content rectangle visible through a viewport of `viewport_size` device units.
    pub fn visible_rect(&self, viewport_size: Size) -> Rect {
        Rect::from_origin_size(
            self.offset,
            Size::new(
                viewport_size.width / self.scale,
                viewport_size.height / self.scale,
            ),
        )
    }

    /// Linear interpolation towards `target` at progress `t` (0..=1).
    pub fn lerp(&self, target: &ViewTransform, t: f64) -> ViewTransform {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        ViewTransform {
            scale: mix(self.scale, target.scale),
            offset: Point::new(
                mix(self.offset.x, target.offset.x),
                mix(self.offset.y, target.offset.y),
            ),
        }
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_point(a: Point, b: Point) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    #[test]
    fn test_identity_transform() {
        let t = ViewTransform::identity();
        assert_eq!(t.scale(), 1.0);
        assert_eq!(t.offset(), Point::ZERO);
        assert_eq!(t.local_to_content(Point::new(3.0, 4.0)), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_rejects_invalid_scale() {
        assert_eq!(
            ViewTransform::new(0.0, Point::ZERO),
            Err(GeometryError::InvalidScale(0.0))
        );
        assert!(ViewTransform::new(-1.0, Point::ZERO).is_err());
        assert!(ViewTransform::new(f64::INFINITY, Point::ZERO).is_err());
        assert_eq!(
            ViewTransform::new(1.0, Point::new(f64::NAN, 0.0)),
            Err(GeometryError::NonFinite)
        );
    }

    #[test]
    fn test_local_to_content() {
        let t = ViewTransform::new(0.5, Point::new(400.0, 400.0)).unwrap();
        // 50 device pixels at scale 0.5 cover 100 content units
        assert!(approx_point(
            t.local_to_content(Point::new(50.0, 50.0)),
            Point::new(500.0, 500.0)
        ));
        assert!(approx_point(
            t.content_to_local(Point::new(500.0, 500.0)),
            Point::new(50.0, 50.0)
        ));
    }

    #[test]
    fn test_round_trip_through_frames() {
        let t = ViewTransform::new(2.5, Point::new(123.25, 87.5)).unwrap();
        let viewport = ViewFrame::new(Point::new(20.0, 64.0), 1.0).unwrap();
        let frames = [
            ViewFrame::WINDOW,
            ViewFrame::new(Point::new(-300.0, 12.0), 1.0).unwrap(),
            ViewFrame::new(Point::new(5.0, 5.0), 0.75).unwrap(),
        ];
        let points = [
            Point::new(0.0, 0.0),
            Point::new(17.3, 991.1),
            Point::new(-45.0, 3.0e4),
        ];

        for frame in &frames {
            for p in points {
                let content = t.to_content(p, frame, &viewport);
                let back = t.to_view(content, Some(frame), &viewport);
                assert!(approx_point(back, p), "{p:?} -> {content:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn test_to_view_without_target_is_window() {
        let t = ViewTransform::new(2.0, Point::new(10.0, 10.0)).unwrap();
        let viewport = ViewFrame::at(Point::new(100.0, 50.0)).unwrap();
        let window = t.to_view(Point::new(15.0, 20.0), None, &viewport);
        assert!(approx_point(window, Point::new(110.0, 70.0)));
    }

    #[test]
    fn test_rect_round_trip() {
        let t = ViewTransform::new(0.25, Point::new(40.0, 0.0)).unwrap();
        let viewport = ViewFrame::WINDOW;
        let frame = ViewFrame::new(Point::new(8.0, 8.0), 2.0).unwrap();
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        let content = t.rect_to_content(rect, &frame, &viewport);
        assert!(approx_eq(content.width, 30.0 * 2.0 / 0.25));
        let back = t.rect_to_view(content, Some(&frame), &viewport);
        assert!(approx_point(back.origin(), rect.origin()));
        assert!(approx_eq(back.width, rect.width));
        assert!(approx_eq(back.height, rect.height));
    }

    #[test]
    fn test_visible_rect() {
        let t = ViewTransform::new(0.5, Point::new(400.0, 400.0)).unwrap();
        assert_eq!(
            t.visible_rect(Size::new(100.0, 100.0)),
            Rect::new(400.0, 400.0, 200.0, 200.0)
        );
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = ViewTransform::identity();
        let b = ViewTransform::new(3.0, Point::new(100.0, -20.0)).unwrap();
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        let mid = a.lerp(&b, 0.5);
        assert!(approx_eq(mid.scale(), 2.0));
        assert!(approx_point(mid.offset(), Point::new(50.0, -10.0)));
    }
}
