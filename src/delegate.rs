//! Callbacks from `FlyerView` to its host.

use crate::annotation::TapAnnotation;
use crate::error::FetchError;
use crate::geometry::Point;
use crate::view::FlyerView;

/// Receives gesture and loading notifications.
///
/// Every method has a no-op default, so hosts implement only what they care
/// about. Points are in content coordinates. The view holds its delegate
/// weakly; a dropped delegate simply stops receiving calls.
///
/// Calls are made synchronously on the owner thread while the view is
/// borrowed, so implementations may query the view but cannot mutate it.
/// Queue any follow-up commands and apply them after the call returns.
pub trait FlyerViewDelegate {
    fn on_single_tap(&self, _view: &FlyerView, _annotation: Option<&TapAnnotation>, _point: Point) {}

    fn on_double_tap(&self, _view: &FlyerView, _annotation: Option<&TapAnnotation>, _point: Point) {}

    fn on_long_press(&self, _view: &FlyerView, _annotation: Option<&TapAnnotation>, _point: Point) {}

    /// The visible content rectangle changed (pan, zoom or animation step).
    fn on_scroll_changed(&self, _view: &FlyerView) {}

    fn on_will_begin_loading(&self, _view: &FlyerView) {}

    fn on_did_finish_loading(&self, _view: &FlyerView) {}

    /// The error is `None` only when the failure carried no detail.
    fn on_did_fail_loading(&self, _view: &FlyerView, _error: Option<&FetchError>) {}
}
