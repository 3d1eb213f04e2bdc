//! Zoom/pan state machine.
//!
//! `ZoomController` owns the current `ViewTransform`, keeps it inside the
//! content bounds and scale limits, and runs eased zoom-to-rect animations.
//! Animations never block: the host advances them by calling `tick` from its
//! frame loop, and any query sampled in between sees the in-flight value.

use std::time::Duration;

use web_time::Instant;

use crate::config::{InitialZoom, ViewerConfig};
use crate::constants::FIT_TOLERANCE;
use crate::error::{FlyerError, GeometryError};
use crate::geometry::{Point, Rect, Size};
use crate::transform::ViewTransform;

/// Whether an animated zoom is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomState {
    AtRest,
    Animating,
}

/// Cubic ease-in-out on `t` in 0..=1.
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// An in-flight transition between two transforms.
#[derive(Debug, Clone, Copy)]
struct ZoomAnimation {
    from: ViewTransform,
    to: ViewTransform,
    started: Instant,
    duration: Duration,
}

impl ZoomAnimation {
    /// Linear progress in 0..=1.
    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    fn sample(&self, now: Instant) -> ViewTransform {
        self.from.lerp(&self.to, ease_in_out(self.progress(now)))
    }

    fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Owner of the viewport's scale and offset.
#[derive(Debug, Clone)]
pub struct ZoomController {
    min_scale: f64,
    max_scale: f64,
    animation_duration: Duration,
    viewport_size: Size,
    content_size: Option<Size>,
    transform: ViewTransform,
    animation: Option<ZoomAnimation>,
    /// Mirrored from the viewport collaborator
    tracking: bool,
    decelerating: bool,
}

impl ZoomController {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            animation_duration: config.zoom_animation_duration(),
            viewport_size: Size::ZERO,
            content_size: None,
            transform: ViewTransform::identity(),
            animation: None,
            tracking: false,
            decelerating: false,
        }
    }

    pub fn state(&self) -> ZoomState {
        if self.animation.is_some() {
            ZoomState::Animating
        } else {
            ZoomState::AtRest
        }
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    /// Resize the viewport; the current transform is re-clamped and any
    /// animation is stopped where it is.
    pub fn set_viewport_size(&mut self, size: Size, now: Instant) {
        self.freeze(now);
        self.viewport_size = size;
        self.transform = self.clamp(self.transform);
    }

    /// Content bounds, or `Size::ZERO` while nothing is loaded.
    pub fn content_size(&self) -> Size {
        self.content_size.unwrap_or(Size::ZERO)
    }

    pub fn has_content(&self) -> bool {
        self.content_size.is_some()
    }

    /// Install new content bounds and jump to the initial zoom.
    pub fn set_content(&mut self, content_size: Size, initial: InitialZoom) {
        self.animation = None;
        self.content_size = Some(content_size);

        let scale = match initial {
            InitialZoom::Fill => self.scale_bounds().0,
            InitialZoom::FitWidth => self.viewport_size.width / content_size.width,
            InitialZoom::FitHeight => self.viewport_size.height / content_size.height,
            InitialZoom::Scale(scale) => scale,
        };
        // A zero viewport yields a zero/NaN ratio; fall back to 1:1 until laid out
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        self.transform = self.clamp(ViewTransform::identity().with_scale(scale));
        log::debug!(
            "Content set to {}x{}, initial scale {:.4}",
            content_size.width,
            content_size.height,
            self.transform.scale()
        );
    }

    /// Forget the content bounds (a new flyer is loading).
    pub fn clear_content(&mut self) {
        self.animation = None;
        self.content_size = None;
        self.transform = ViewTransform::identity();
    }

    /// Effective `(lower, upper)` scale limits.
    ///
    /// The lower limit is raised to the smallest scale at which the visible
    /// rectangle still fits inside the content on both axes.
    pub fn scale_bounds(&self) -> (f64, f64) {
        let mut lower = self.min_scale;
        if let Some(content) = self.content_size {
            if !content.is_empty() && !self.viewport_size.is_empty() {
                let fill = (self.viewport_size.width / content.width)
                    .max(self.viewport_size.height / content.height);
                lower = lower.max(fill);
            }
        }
        (lower, self.max_scale.max(lower))
    }

    /// Clamp a transform into the scale limits and content bounds.
    pub fn clamp(&self, transform: ViewTransform) -> ViewTransform {
        let (lower, upper) = self.scale_bounds();
        let scale = transform.scale().clamp(lower, upper);
        let clamped = transform.with_scale(scale);
        clamped.with_offset(self.clamp_offset(clamped.offset(), scale))
    }

    fn clamp_offset(&self, offset: Point, scale: f64) -> Point {
        let Some(content) = self.content_size else {
            return offset;
        };
        let visible_w = self.viewport_size.width / scale;
        let visible_h = self.viewport_size.height / scale;
        let max_x = (content.width - visible_w).max(0.0);
        let max_y = (content.height - visible_h).max(0.0);
        Point::new(offset.x.clamp(0.0, max_x), offset.y.clamp(0.0, max_y))
    }

    /// The transform as of the last tick or write.
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// The transform sampled at `now`, including any in-flight animation.
    pub fn current(&self, now: Instant) -> ViewTransform {
        match &self.animation {
            Some(animation) => self.clamp(animation.sample(now)),
            None => self.transform,
        }
    }

    /// Visible rectangle in content coordinates at `now`.
    pub fn visible_content(&self, now: Instant) -> Rect {
        self.current(now).visible_rect(self.viewport_size)
    }

    /// Visible height over content height, clamped to 0..=1.
    pub fn visible_fraction(&self, now: Instant) -> f64 {
        let content = self.content_size();
        if content.height <= 0.0 {
            return 0.0;
        }
        (self.visible_content(now).height / content.height).clamp(0.0, 1.0)
    }

    /// Compute the clamped transform that shows `rect`.
    pub fn target_for_rect(&self, rect: Rect) -> Result<ViewTransform, FlyerError> {
        if rect.is_degenerate() {
            return Err(GeometryError::degenerate(&rect).into());
        }
        if self.content_size.is_none() {
            return Err(FlyerError::NotLoaded);
        }
        if self.viewport_size.is_empty() {
            // Nothing to fit into yet
            return Ok(self.transform);
        }

        // Whole rect visible: the tighter axis decides
        let scale = (self.viewport_size.width / rect.width)
            .min(self.viewport_size.height / rect.height);
        let (lower, upper) = self.scale_bounds();
        let scale = scale.clamp(lower, upper);

        // Centre the requested rect, then shift it back inside the content
        let center = rect.center();
        let offset = Point::new(
            center.x - self.viewport_size.width / scale / 2.0,
            center.y - self.viewport_size.height / scale / 2.0,
        );
        let target = ViewTransform::new(scale, offset)?;
        Ok(self.clamp(target))
    }

    /// Zoom so that `rect` (content coordinates) fills the viewport.
    ///
    /// Any in-flight animation is cancelled; an animated zoom starts from the
    /// interpolated state at `now`.
    pub fn zoom_to_rect(
        &mut self,
        rect: Rect,
        animated: bool,
        now: Instant,
    ) -> Result<ViewTransform, FlyerError> {
        let target = self.target_for_rect(rect)?;
        let start = self.current(now);

        if animated && !self.animation_duration.is_zero() && start != target {
            log::debug!(
                "Animating zoom from scale {:.4} to {:.4}",
                start.scale(),
                target.scale()
            );
            self.animation = Some(ZoomAnimation {
                from: start,
                to: target,
                started: now,
                duration: self.animation_duration,
            });
            self.transform = start;
        } else {
            log::debug!("Zoom snapped to scale {:.4}", target.scale());
            self.animation = None;
            self.transform = target;
        }
        Ok(target)
    }

    /// Rect a double tap at `point` zooms to.
    ///
    /// Above the lower scale limit this is the rect shown at that limit,
    /// centred on the current view. At the limit it is a rect with the
    /// viewport's aspect ratio and `zoom_size` on its longer side, centred
    /// on the point.
    pub fn toggle_rect(&self, point: Point, zoom_size: f64, now: Instant) -> Option<Rect> {
        let content = self.content_size?;
        if content.is_empty() || self.viewport_size.is_empty() {
            return None;
        }
        let current = self.current(now);
        let (lower, _) = self.scale_bounds();

        let (center, size) = if current.scale() > lower * (1.0 + FIT_TOLERANCE) {
            let size = Size::new(
                self.viewport_size.width / lower,
                self.viewport_size.height / lower,
            );
            (current.visible_rect(self.viewport_size).center(), size)
        } else {
            let longer = self.viewport_size.width.max(self.viewport_size.height);
            let size = Size::new(
                zoom_size * self.viewport_size.width / longer,
                zoom_size * self.viewport_size.height / longer,
            );
            (point, size)
        };
        Some(Rect::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        ))
    }

    /// Advance the animation to `now`. Returns true when the transform moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };
        let previous = self.transform;

        if animation.is_finished(now) {
            self.transform = self.clamp(animation.to);
            self.animation = None;
            log::trace!("Zoom animation finished at scale {:.4}", self.transform.scale());
        } else {
            self.transform = self.clamp(animation.sample(now));
        }
        self.transform != previous
    }

    /// Apply a scale/offset reported by the viewport collaborator (user pan or pinch).
    pub fn update_from_viewport(&mut self, scale: f64, offset: Point) -> Result<bool, GeometryError> {
        let reported = ViewTransform::new(scale, offset)?;
        self.animation = None;
        let previous = self.transform;
        self.transform = self.clamp(reported);
        Ok(self.transform != previous)
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn is_decelerating(&self) -> bool {
        self.decelerating
    }

    /// Mirror the collaborator's gesture flags. A touch landing mid-animation
    /// stops the animation where it is.
    pub fn set_interaction_state(&mut self, tracking: bool, decelerating: bool, now: Instant) {
        if tracking && !self.tracking && self.animation.is_some() {
            log::debug!("Tracking began, cancelling zoom animation");
            self.freeze(now);
        }
        self.tracking = tracking;
        self.decelerating = decelerating;
    }

    /// Stop any animation, keeping its value at `now`.
    fn freeze(&mut self, now: Instant) {
        if self.animation.is_some() {
            self.transform = self.current(now);
            self.animation = None;
        }
    }
}
