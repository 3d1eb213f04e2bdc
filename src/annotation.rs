//! Annotation data model and registry.
//!
//! This module provides the three annotation variants a host can attach to a
//! flyer, all expressed in content coordinates:
//! - `HighlightAnnotation` (visual only)
//! - `TapAnnotation` (participates in hit-testing and gesture dispatch)
//! - `BadgeAnnotation` (image overlay)
//!
//! and `AnnotationRegistry`, which holds one immutable snapshot per variant.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

// ============================================================================
// Annotation Types
// ============================================================================

/// A rectangle to highlight on the flyer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightAnnotation {
    /// Region in content coordinates
    pub frame: Rect,
}

impl HighlightAnnotation {
    pub fn new(frame: Rect) -> Self {
        Self { frame }
    }
}

/// A region that responds to single tap, double tap and long press.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapAnnotation {
    /// Host-chosen key used to map the annotation back to host data
    pub id: u64,
    /// Region in content coordinates
    pub frame: Rect,
}

impl TapAnnotation {
    pub fn new(id: u64, frame: Rect) -> Self {
        Self { id, frame }
    }
}

/// An image shown on top of the flyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeAnnotation {
    /// Host-chosen key
    pub id: u64,
    /// Region in content coordinates
    pub frame: Rect,
    /// Image reference resolved by the renderer, or none for an empty badge
    #[serde(default)]
    pub image: Option<String>,
}

impl BadgeAnnotation {
    pub fn new(id: u64, frame: Rect) -> Self {
        Self {
            id,
            frame,
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

// ============================================================================
// Annotation Registry
// ============================================================================

/// Storage for the three annotation collections of a flyer view.
///
/// Every setter swaps in a whole new snapshot; readers holding a previous
/// snapshot keep seeing the old list in full. `None` means "no annotations of
/// this kind", which is distinct from an empty list only for the host's
/// benefit. Rectangles are never validated against the content size.
#[derive(Debug, Clone, Default)]
pub struct AnnotationRegistry {
    highlights: Option<Rc<[HighlightAnnotation]>>,
    taps: Option<Rc<[TapAnnotation]>>,
    badges: Option<Rc<[BadgeAnnotation]>>,
}

impl AnnotationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlights(&self) -> Option<Rc<[HighlightAnnotation]>> {
        self.highlights.clone()
    }

    pub fn set_highlights(&mut self, highlights: Option<Vec<HighlightAnnotation>>) {
        log::trace!(
            "Highlight annotations replaced ({} entries)",
            highlights.as_ref().map_or(0, Vec::len)
        );
        self.highlights = highlights.map(Rc::from);
    }

    pub fn taps(&self) -> Option<Rc<[TapAnnotation]>> {
        self.taps.clone()
    }

    pub fn set_taps(&mut self, taps: Option<Vec<TapAnnotation>>) {
        log::trace!(
            "Tap annotations replaced ({} entries)",
            taps.as_ref().map_or(0, Vec::len)
        );
        self.taps = taps.map(Rc::from);
    }

    /// Borrow the current tap list without cloning the snapshot handle.
    pub(crate) fn tap_slice(&self) -> &[TapAnnotation] {
        self.taps.as_deref().unwrap_or(&[])
    }

    pub fn badges(&self) -> Option<Rc<[BadgeAnnotation]>> {
        self.badges.clone()
    }

    pub fn set_badges(&mut self, badges: Option<Vec<BadgeAnnotation>>) {
        log::trace!(
            "Badge annotations replaced ({} entries)",
            badges.as_ref().map_or(0, Vec::len)
        );
        self.badges = badges.map(Rc::from);
    }

    /// Total number of annotations across all three collections.
    pub fn len(&self) -> usize {
        self.highlights.as_ref().map_or(0, |h| h.len())
            + self.taps.as_ref().map_or(0, |t| t.len())
            + self.badges.as_ref().map_or(0, |b| b.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all three collections.
    pub fn clear(&mut self) {
        self.highlights = None;
        self.taps = None;
        self.badges = None;
    }
}
