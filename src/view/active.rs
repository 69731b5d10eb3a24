//! Active-heading tracking for table-of-contents sync
//!
//! Two strategies, picked by the view:
//! - laid out in full: [`band_active_heading`] compares each heading's rows with
//!   a band in the upper part of the viewport
//! - virtualized: [`heading_at_index`] binary-searches heading positions for
//!   the block under the reading line

use super::throttle::FrameThrottle;
use crate::model::anchors::HeadingPosition;
use std::ops::Range;

/// Rows a heading occupies, absolute, `bottom` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingExtent<'a> {
    pub id: &'a str,
    pub top: u64,
    pub bottom: u64,
}

/// Absolute rows of the activation band for a viewport
///
/// The band spans `top_percent..bottom_percent` of the viewport height and is
/// at least one row tall.
pub fn active_band(scroll_offset: u64, viewport_height: u32, top_percent: u8, bottom_percent: u8) -> Range<u64> {
    let height = viewport_height as u64;
    let start = scroll_offset + height * top_percent as u64 / 100;
    let end = (scroll_offset + height * bottom_percent as u64 / 100).max(start + 1);
    start..end
}

/// Heading considered current for a band
///
/// The topmost heading overlapping the band wins. With none overlapping, the
/// last heading already scrolled above the band stays current. `headings`
/// must be in document order.
pub fn band_active_heading<'a>(headings: &[HeadingExtent<'a>], band: Range<u64>) -> Option<&'a str> {
    if let Some(hit) = headings
        .iter()
        .find(|h| h.top < band.end && band.start < h.bottom)
    {
        return Some(hit.id);
    }
    headings
        .iter()
        .take_while(|h| h.bottom <= band.start)
        .last()
        .map(|h| h.id)
}

/// Greatest heading whose block index is `<= index`
pub fn heading_at_index(positions: &[HeadingPosition], index: usize) -> Option<&HeadingPosition> {
    let count = positions.partition_point(|p| p.block_index <= index);
    count.checked_sub(1).map(|i| &positions[i])
}

/// Reports the active heading upward, once per change
///
/// Scroll events only request a frame; the heading is recomputed when the
/// frame runs, from whatever the scroll position is by then.
pub struct ActiveHeadingTracker {
    active: Option<String>,
    throttle: FrameThrottle,
    on_change: Box<dyn FnMut(Option<&str>)>,
}

impl ActiveHeadingTracker {
    pub fn new(on_change: impl FnMut(Option<&str>) + 'static) -> Self {
        Self {
            active: None,
            throttle: FrameThrottle::new(),
            on_change: Box::new(on_change),
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Note a scroll or resize; returns false if a frame was already pending
    pub fn on_scroll(&mut self) -> bool {
        self.throttle.request()
    }

    /// Run the pending update, if any, with the heading `probe` computes
    ///
    /// Returns true when the active heading changed.
    pub fn on_frame(&mut self, probe: impl FnOnce() -> Option<String>) -> bool {
        if !self.throttle.take() {
            return false;
        }
        self.update(probe())
    }

    /// Set the active heading directly, reporting only a change
    pub fn update(&mut self, active: Option<String>) -> bool {
        if self.active == active {
            return false;
        }
        tracing::debug!("active heading: {:?} -> {:?}", self.active, active);
        self.active = active;
        (self.on_change)(self.active.as_deref());
        true
    }
}
