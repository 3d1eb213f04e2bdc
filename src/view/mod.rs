//! The flyer view: loading, annotations, zoom and gesture dispatch.
//!
//! `FlyerView` is the single owner of the content bounds, the viewport state
//! and the annotation collections. It renders nothing; the host draws from
//! its queries and feeds it the viewport collaborator's signals:
//!
//! - `set_viewport_frame` when the viewport is laid out or resized
//! - `handle_gesture` / `handle_touch` for taps and long presses
//! - `update_from_viewport` and `set_interaction_state` for pan and pinch
//! - `tick` and `poll_loading` once per frame
//!
//! Everything runs on the owner thread. Only the fetch collaborator may
//! complete on another thread, and its completions are applied in
//! `poll_loading`.

use std::rc::{Rc, Weak};

use web_time::Instant;

use crate::annotation::{AnnotationRegistry, BadgeAnnotation, HighlightAnnotation, TapAnnotation};
use crate::config::ViewerConfig;
use crate::delegate::FlyerViewDelegate;
use crate::error::{FlyerError, GeometryError};
use crate::geometry::{Point, Rect, Size, ViewFrame};
use crate::gesture::{GestureEvent, TapClassifier, TouchPhase};
use crate::hit_test;
use crate::loader::{ContentDescriptor, ContentFetcher, FetchRequest, FlyerLoader, LoadState};
use crate::transform::ViewTransform;
use crate::zoom::{ZoomController, ZoomState};

#[cfg(test)]
mod tests;

/// Zoomable flyer surface with interactive annotations.
pub struct FlyerView {
    config: ViewerConfig,
    /// Viewport placement in window coordinates
    viewport: ViewFrame,
    zoom: ZoomController,
    annotations: AnnotationRegistry,
    loader: FlyerLoader,
    fetcher: Box<dyn ContentFetcher>,
    delegate: Option<Weak<dyn FlyerViewDelegate>>,
    taps: TapClassifier,
    flyer_id: Option<i64>,
    content: Option<ContentDescriptor>,
}

impl FlyerView {
    /// Create an empty view. Fails if `config` does not validate.
    pub fn new(config: ViewerConfig, fetcher: Box<dyn ContentFetcher>) -> Result<Self, FlyerError> {
        config.validate()?;
        Ok(Self {
            viewport: ViewFrame::WINDOW,
            zoom: ZoomController::new(&config),
            annotations: AnnotationRegistry::new(),
            loader: FlyerLoader::new(),
            fetcher,
            delegate: None,
            taps: TapClassifier::new(&config.gestures),
            flyer_id: None,
            content: None,
            config,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    // Delegate

    /// Attach a delegate. Only a weak reference is kept.
    pub fn set_delegate<D: FlyerViewDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        let weak: Weak<D> = Rc::downgrade(delegate);
        self.delegate = Some(weak as Weak<dyn FlyerViewDelegate>);
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// The delegate, if attached and still alive.
    pub fn delegate(&self) -> Option<Rc<dyn FlyerViewDelegate>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }

    // Annotations

    pub fn highlight_annotations(&self) -> Option<Rc<[HighlightAnnotation]>> {
        self.annotations.highlights()
    }

    pub fn set_highlight_annotations(&mut self, highlights: Option<Vec<HighlightAnnotation>>) {
        self.annotations.set_highlights(highlights);
    }

    pub fn tap_annotations(&self) -> Option<Rc<[TapAnnotation]>> {
        self.annotations.taps()
    }

    pub fn set_tap_annotations(&mut self, taps: Option<Vec<TapAnnotation>>) {
        self.annotations.set_taps(taps);
    }

    pub fn badge_annotations(&self) -> Option<Rc<[BadgeAnnotation]>> {
        self.annotations.badges()
    }

    pub fn set_badge_annotations(&mut self, badges: Option<Vec<BadgeAnnotation>>) {
        self.annotations.set_badges(badges);
    }

    /// First tap annotation containing `point` (content coordinates).
    pub fn hit_test(&self, point: Point) -> Option<&TapAnnotation> {
        hit_test::hit_test(self.annotations.tap_slice(), &point)
    }

    /// Every tap annotation containing `point`, in list order.
    pub fn hit_test_all(&self, point: Point) -> Vec<&TapAnnotation> {
        hit_test::hit_test_all(self.annotations.tap_slice(), point).collect()
    }

    // Loading

    pub fn flyer_id(&self) -> Option<i64> {
        self.flyer_id
    }

    pub fn load_state(&self) -> &LoadState {
        self.loader.state()
    }

    /// Page rectangles of the loaded content; empty until loaded.
    pub fn pages(&self) -> &[Rect] {
        self.content
            .as_ref()
            .map(|c| c.pages.as_slice())
            .unwrap_or_default()
    }

    /// Renderer reference of the loaded content.
    pub fn content_source(&self) -> Option<&str> {
        self.content.as_ref().and_then(|c| c.source.as_deref())
    }

    /// Start loading a flyer, superseding any load in flight.
    ///
    /// The content bounds are cleared immediately; annotations are left as
    /// they are. The fetch collaborator is invoked before this returns, and
    /// its completion is applied by a later `poll_loading`.
    pub fn set_flyer_id(
        &mut self,
        flyer_id: i64,
        root_url: impl Into<String>,
        version: impl Into<String>,
        access_token: Option<String>,
    ) {
        log::debug!("Loading flyer {flyer_id}");
        self.flyer_id = Some(flyer_id);
        self.content = None;
        self.zoom.clear_content();
        self.taps.reset();

        let reply = self.loader.begin();
        if let Some(delegate) = self.delegate() {
            delegate.on_will_begin_loading(self);
        }

        let request = FetchRequest {
            flyer_id,
            root_url: root_url.into(),
            version: version.into(),
            access_token,
        };
        self.fetcher.fetch(request, reply);
    }

    /// Apply a finished fetch, if one has arrived. Returns true if the load
    /// state changed.
    pub fn poll_loading(&mut self) -> bool {
        let Some(result) = self.loader.take_completion() else {
            return false;
        };

        match result {
            Ok(descriptor) => {
                let size = descriptor.content_size;
                log::info!(
                    "Flyer {:?} loaded: {}x{}, {} pages",
                    self.flyer_id,
                    size.width,
                    size.height,
                    descriptor.pages.len()
                );
                self.zoom.set_content(size, self.config.initial_zoom);
                self.content = Some(descriptor);
                if let Some(delegate) = self.delegate() {
                    delegate.on_did_finish_loading(self);
                }
            }
            Err(err) => {
                log::warn!("Flyer {:?} failed to load: {}", self.flyer_id, err);
                if let Some(delegate) = self.delegate() {
                    delegate.on_did_fail_loading(self, Some(&err));
                }
            }
        }
        true
    }

    // Viewport queries

    pub fn is_tracking(&self) -> bool {
        self.zoom.is_tracking()
    }

    pub fn is_decelerating(&self) -> bool {
        self.zoom.is_decelerating()
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.zoom.state()
    }

    /// Content bounds, or `Size::ZERO` while nothing is loaded.
    pub fn content_size(&self) -> Size {
        self.zoom.content_size()
    }

    /// Current scale and offset, including any in-flight animation.
    pub fn transform(&self) -> ViewTransform {
        self.zoom.current(Instant::now())
    }

    /// Visible rectangle in content coordinates.
    pub fn visible_content(&self) -> Rect {
        self.zoom.visible_content(Instant::now())
    }

    /// Visible height over content height, in 0..=1.
    pub fn visible_fraction(&self) -> f64 {
        self.zoom.visible_fraction(Instant::now())
    }

    // Zoom commands

    /// Zoom so `rect` (content coordinates) fills the viewport, clamped to
    /// the scale limits and content bounds.
    pub fn zoom_to_rect(&mut self, rect: Rect, animated: bool) -> Result<(), FlyerError> {
        self.zoom_to_rect_at(rect, animated, Instant::now())
    }

    fn zoom_to_rect_at(&mut self, rect: Rect, animated: bool, now: Instant) -> Result<(), FlyerError> {
        let before = self.zoom.transform();
        self.zoom.zoom_to_rect(rect, animated, now)?;
        // Animated zooms report progress from `tick`
        if self.zoom.state() == ZoomState::AtRest && self.zoom.transform() != before {
            self.notify_scroll_changed();
        }
        Ok(())
    }

    /// Zoom to page `index` of the loaded content.
    pub fn zoom_to_page(&mut self, index: usize, animated: bool) -> Result<(), FlyerError> {
        let page = {
            let content = self.content.as_ref().ok_or(FlyerError::NotLoaded)?;
            *content.pages.get(index).ok_or(FlyerError::PageOutOfRange {
                index,
                count: content.pages.len(),
            })?
        };
        self.zoom_to_rect(page, animated)
    }

    /// Double-tap zoom toggle around `point` (content coordinates).
    ///
    /// Zoomed in, this zooms back out to fit the content height; otherwise it
    /// zooms into a square of the configured size centred on the point.
    pub fn toggle_zoom_at(&mut self, point: Point, animated: bool) -> Result<(), FlyerError> {
        if !self.zoom.has_content() {
            return Err(FlyerError::NotLoaded);
        }
        let now = Instant::now();
        match self
            .zoom
            .toggle_rect(point, self.config.double_tap_zoom_size, now)
        {
            Some(rect) => self.zoom_to_rect_at(rect, animated, now),
            None => Ok(()),
        }
    }

    // Conversions

    /// Map a point in `from` coordinates into content coordinates.
    pub fn convert_point_to_content(&self, point: Point, from: &ViewFrame) -> Point {
        self.transform().to_content(point, from, &self.viewport)
    }

    pub fn convert_rect_to_content(&self, rect: Rect, from: &ViewFrame) -> Rect {
        self.transform().rect_to_content(rect, from, &self.viewport)
    }

    /// Map a content point into `to`, or into window coordinates for `None`.
    pub fn convert_content_point(&self, point: Point, to: Option<&ViewFrame>) -> Point {
        self.transform().to_view(point, to, &self.viewport)
    }

    pub fn convert_content_rect(&self, rect: Rect, to: Option<&ViewFrame>) -> Rect {
        self.transform().rect_to_view(rect, to, &self.viewport)
    }

    // Viewport collaborator inputs

    /// Place the viewport, in window coordinates.
    pub fn set_viewport_frame(&mut self, frame: Rect) -> Result<(), FlyerError> {
        // Zero is allowed: the viewport may not be laid out yet
        let size_ok = frame.width.is_finite()
            && frame.height.is_finite()
            && frame.width >= 0.0
            && frame.height >= 0.0;
        if !size_ok {
            return Err(GeometryError::degenerate(&frame).into());
        }
        self.viewport = ViewFrame::at(frame.origin())?;

        let before = self.zoom.transform();
        self.zoom.set_viewport_size(frame.size(), Instant::now());
        if self.zoom.transform() != before {
            self.notify_scroll_changed();
        }
        Ok(())
    }

    pub fn viewport_frame(&self) -> Rect {
        Rect::from_origin_size(self.viewport.origin(), self.zoom.viewport_size())
    }

    /// Dispatch a recognized gesture to the delegate.
    pub fn handle_gesture(&self, event: GestureEvent) {
        self.dispatch(event, Instant::now());
    }

    /// Feed a raw touch through the built-in tap classifier.
    pub fn handle_touch(&mut self, phase: TouchPhase, point: Point) {
        self.handle_touch_at(phase, point, Instant::now());
    }

    pub fn handle_touch_at(&mut self, phase: TouchPhase, point: Point, now: Instant) {
        self.taps.handle(phase, point, now);
        for event in self.taps.poll(now) {
            self.dispatch(event, now);
        }
    }

    /// Mirror the collaborator's tracking/decelerating flags.
    pub fn set_interaction_state(&mut self, tracking: bool, decelerating: bool) {
        self.zoom
            .set_interaction_state(tracking, decelerating, Instant::now());
    }

    /// Apply a user pan/pinch reported by the collaborator.
    pub fn update_from_viewport(&mut self, scale: f64, offset: Point) -> Result<(), FlyerError> {
        if self.zoom.update_from_viewport(scale, offset)? {
            self.notify_scroll_changed();
        }
        Ok(())
    }

    /// Advance animations and gesture timers. Call once per frame.
    /// Returns true while a zoom animation is still running.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> bool {
        if self.zoom.tick(now) {
            log::trace!("Zoom tick moved viewport");
            self.notify_scroll_changed();
        }
        for event in self.taps.poll(now) {
            self.dispatch(event, now);
        }
        self.zoom.state() == ZoomState::Animating
    }

    // Dispatch

    fn dispatch(&self, event: GestureEvent, now: Instant) {
        let Some(device) = event.point() else {
            self.notify_scroll_changed();
            return;
        };
        let Some(delegate) = self.delegate() else {
            log::trace!("No delegate for {event:?}");
            return;
        };

        let point = self
            .zoom
            .current(now)
            .to_content(device, &ViewFrame::WINDOW, &self.viewport);
        let annotation = self.hit_test(point);
        log::trace!(
            "{event:?} at content {point:?} hit {:?}",
            annotation.map(|a| a.id)
        );

        match event {
            GestureEvent::SingleTap(_) => delegate.on_single_tap(self, annotation, point),
            GestureEvent::DoubleTap(_) => delegate.on_double_tap(self, annotation, point),
            GestureEvent::LongPress(_) => delegate.on_long_press(self, annotation, point),
            GestureEvent::ScrollChanged => delegate.on_scroll_changed(self),
        }
    }

    fn notify_scroll_changed(&self) {
        if let Some(delegate) = self.delegate() {
            delegate.on_scroll_changed(self);
        }
    }
}

impl std::fmt::Debug for FlyerView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlyerView")
            .field("flyer_id", &self.flyer_id)
            .field("load_state", self.loader.state())
            .field("viewport", &self.viewport)
            .field("zoom", &self.zoom)
            .field("annotations", &self.annotations)
            .field("has_delegate", &self.delegate().is_some())
            .finish_non_exhaustive()
    }
}
