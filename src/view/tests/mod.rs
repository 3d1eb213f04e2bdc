//! Scenario tests for `FlyerView`.
//!
//! These drive the view the way a host would: a manual fetch collaborator
//! completes requests on demand and a recording delegate captures every
//! callback in order.


use std::cell::RefCell;
use std::rc::Rc;

use crate::annotation::TapAnnotation;
use crate::config::{InitialZoom, ViewerConfig};
use crate::delegate::FlyerViewDelegate;
use crate::error::FetchError;
use crate::geometry::{Point, Rect, Size};
use crate::loader::{ContentDescriptor, ContentFetcher, FetchReply, FetchRequest};
use crate::view::FlyerView;

pub(super) const EPSILON: f64 = 1e-6;

pub(super) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

pub(super) fn approx_point(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

pub(super) fn approx_rect(a: Rect, b: Rect) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.width, b.width) && approx_eq(a.height, b.height)
}

/// Fetch collaborator that parks requests until the test completes them.
#[derive(Clone, Default)]
pub(super) struct ManualFetcher {
    pending: Rc<RefCell<Vec<(FetchRequest, FetchReply)>>>,
}

impl ManualFetcher {
    /// Take every parked request, oldest first.
    pub(super) fn take(&self) -> Vec<(FetchRequest, FetchReply)> {
        self.pending.borrow_mut().drain(..).collect()
    }

    /// Complete the most recent request.
    pub(super) fn complete(&self, result: Result<ContentDescriptor, FetchError>) {
        let (_, reply) = self
            .pending
            .borrow_mut()
            .pop()
            .expect("no pending fetch");
        reply.send(result);
    }
}

impl ContentFetcher for ManualFetcher {
    fn fetch(&self, request: FetchRequest, reply: FetchReply) {
        self.pending.borrow_mut().push((request, reply));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Call {
    SingleTap(Option<u64>, Point),
    DoubleTap(Option<u64>, Point),
    LongPress(Option<u64>, Point),
    ScrollChanged,
    WillBeginLoading(Option<i64>),
    DidFinishLoading(Size),
    DidFailLoading(Option<FetchError>),
}

#[derive(Default)]
pub(super) struct RecordingDelegate {
    calls: RefCell<Vec<Call>>,
}

impl RecordingDelegate {
    pub(super) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(super) fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl FlyerViewDelegate for RecordingDelegate {
    fn on_single_tap(&self, _view: &FlyerView, annotation: Option<&TapAnnotation>, point: Point) {
        self.record(Call::SingleTap(annotation.map(|a| a.id), point));
    }

    fn on_double_tap(&self, _view: &FlyerView, annotation: Option<&TapAnnotation>, point: Point) {
        self.record(Call::DoubleTap(annotation.map(|a| a.id), point));
    }

    fn on_long_press(&self, _view: &FlyerView, annotation: Option<&TapAnnotation>, point: Point) {
        self.record(Call::LongPress(annotation.map(|a| a.id), point));
    }

    fn on_scroll_changed(&self, _view: &FlyerView) {
        self.record(Call::ScrollChanged);
    }

    fn on_will_begin_loading(&self, view: &FlyerView) {
        self.record(Call::WillBeginLoading(view.flyer_id()));
    }

    fn on_did_finish_loading(&self, view: &FlyerView) {
        self.record(Call::DidFinishLoading(view.content_size()));
    }

    fn on_did_fail_loading(&self, _view: &FlyerView, error: Option<&FetchError>) {
        self.record(Call::DidFailLoading(error.cloned()));
    }
}

/// Four 500x500 pages tiling the 1000x1000 content.
pub(super) fn quadrant_pages() -> Vec<Rect> {
    vec![
        Rect::new(0.0, 0.0, 500.0, 500.0),
        Rect::new(500.0, 0.0, 500.0, 500.0),
        Rect::new(0.0, 500.0, 500.0, 500.0),
        Rect::new(500.0, 500.0, 500.0, 500.0),
    ]
}

/// An empty view in a 100x100 viewport at the window origin.
pub(super) fn create_view() -> (FlyerView, ManualFetcher, Rc<RecordingDelegate>) {
    let fetcher = ManualFetcher::default();
    let config = ViewerConfig::default().with_initial_zoom(InitialZoom::Scale(1.0));
    let mut view = FlyerView::new(config, Box::new(fetcher.clone())).unwrap();
    view.set_viewport_frame(Rect::new(0.0, 0.0, 100.0, 100.0))
        .unwrap();

    let delegate = Rc::new(RecordingDelegate::default());
    view.set_delegate(&delegate);
    (view, fetcher, delegate)
}

/// A view with 1000x1000 content loaded at scale 1, delegate log cleared.
pub(super) fn create_loaded_view() -> (FlyerView, ManualFetcher, Rc<RecordingDelegate>) {
    let (mut view, fetcher, delegate) = create_view();
    view.set_flyer_id(7, "https://api.example.com/", "v1", None);
    fetcher.complete(Ok(
        ContentDescriptor::new(Size::new(1000.0, 1000.0)).with_pages(quadrant_pages())
    ));
    assert!(view.poll_loading());
    delegate.clear();
    (view, fetcher, delegate)
}
