//! Gesture signals and tap classification.
//!
//! `GestureEvent` is what the viewport collaborator reports to the view.
//! Hosts whose platform already recognizes taps send those directly; hosts
//! that only see raw touches can run them through `TapClassifier`, which
//! disambiguates single tap, double tap and long press.

use std::collections::VecDeque;
use std::time::Duration;

use web_time::Instant;

use crate::config::GestureConfig;
use crate::geometry::Point;

/// A gesture reported by the viewport, with its point in device (window) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    SingleTap(Point),
    DoubleTap(Point),
    LongPress(Point),
    /// The visible rectangle changed
    ScrollChanged,
}

impl GestureEvent {
    /// Device-space point of tap-classified gestures.
    pub fn point(&self) -> Option<Point> {
        match self {
            GestureEvent::SingleTap(p) | GestureEvent::DoubleTap(p) | GestureEvent::LongPress(p) => {
                Some(*p)
            }
            GestureEvent::ScrollChanged => None,
        }
    }
}

/// Phase of a raw touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// A touch currently held down.
#[derive(Debug, Clone, Copy)]
struct Press {
    start: Point,
    began: Instant,
    /// Moved beyond the slop; can no longer be a tap
    cancelled: bool,
    long_fired: bool,
}

/// A completed tap waiting to see whether a second one follows.
#[derive(Debug, Clone, Copy)]
struct PendingTap {
    point: Point,
    ended: Instant,
}

/// Turns raw touch phases into tap gestures.
///
/// Single taps are held back until the double-tap interval has passed, so a
/// double tap never also produces a single tap. Timers are evaluated in
/// `poll`, which the host calls every frame.
#[derive(Debug)]
pub struct TapClassifier {
    double_tap_interval: Duration,
    long_press: Duration,
    slop: f64,
    press: Option<Press>,
    pending: Option<PendingTap>,
    ready: VecDeque<GestureEvent>,
}

impl TapClassifier {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            double_tap_interval: config.double_tap_interval(),
            long_press: config.long_press_duration(),
            slop: config.tap_slop,
            press: None,
            pending: None,
            ready: VecDeque::new(),
        }
    }

    /// Feed one raw touch sample.
    pub fn handle(&mut self, phase: TouchPhase, point: Point, now: Instant) {
        match phase {
            TouchPhase::Began => self.began(point, now),
            TouchPhase::Moved => self.moved(point),
            TouchPhase::Ended => self.ended(now),
            TouchPhase::Cancelled => {
                log::trace!("Touch cancelled");
                self.press = None;
            }
        }
    }

    fn began(&mut self, point: Point, now: Instant) {
        self.flush_expired(now);
        self.press = Some(Press {
            start: point,
            began: now,
            cancelled: false,
            long_fired: false,
        });
    }

    fn moved(&mut self, point: Point) {
        let slop = self.slop;
        if let Some(press) = self.press.as_mut() {
            if !press.cancelled && press.start.distance_to(&point) > slop {
                log::trace!("Touch moved beyond slop, not a tap");
                press.cancelled = true;
            }
        }
    }

    fn ended(&mut self, now: Instant) {
        let Some(press) = self.press.take() else {
            return;
        };
        if press.cancelled || press.long_fired {
            return;
        }
        if now.saturating_duration_since(press.began) >= self.long_press {
            // Released before poll noticed the hold
            self.flush_pending();
            self.ready.push_back(GestureEvent::LongPress(press.start));
            return;
        }

        match self.pending.take() {
            Some(pending) if self.pairs_with(&pending, &press) => {
                self.ready.push_back(GestureEvent::DoubleTap(pending.point));
            }
            Some(pending) => {
                self.ready.push_back(GestureEvent::SingleTap(pending.point));
                self.pending = Some(PendingTap {
                    point: press.start,
                    ended: now,
                });
            }
            None => {
                self.pending = Some(PendingTap {
                    point: press.start,
                    ended: now,
                });
            }
        }
    }

    /// Whether `press` is the second tap of a double tap started by `pending`.
    fn pairs_with(&self, pending: &PendingTap, press: &Press) -> bool {
        press.began.saturating_duration_since(pending.ended) <= self.double_tap_interval
            && pending.point.distance_to(&press.start) <= self.slop
    }

    fn flush_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.ready.push_back(GestureEvent::SingleTap(pending.point));
        }
    }

    fn flush_expired(&mut self, now: Instant) {
        let expired = self
            .pending
            .is_some_and(|p| now.saturating_duration_since(p.ended) > self.double_tap_interval);
        if expired {
            self.flush_pending();
        }
    }

    /// Evaluate timers and drain every gesture recognized so far, oldest first.
    pub fn poll(&mut self, now: Instant) -> Vec<GestureEvent> {
        let long_press_due = self.press.is_some_and(|press| {
            !press.cancelled
                && !press.long_fired
                && now.saturating_duration_since(press.began) >= self.long_press
        });
        if long_press_due {
            self.flush_pending();
            if let Some(press) = self.press.as_mut() {
                press.long_fired = true;
                self.ready.push_back(GestureEvent::LongPress(press.start));
            }
        }

        // A held second touch may still turn the pending tap into a double tap
        let awaiting_second = match (self.pending, self.press) {
            (Some(pending), Some(press)) => self.pairs_with(&pending, &press),
            _ => false,
        };
        if !awaiting_second {
            self.flush_expired(now);
        }

        self.ready.drain(..).collect()
    }

    /// Forget any touch in progress and any pending tap.
    pub fn reset(&mut self) {
        self.press = None;
        self.pending = None;
        self.ready.clear();
    }
}
