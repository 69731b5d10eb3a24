//! Variable-height block virtualizer
//!
//! Only a window of blocks around the viewport is mounted; everything else is
//! represented by its size. Sizes start out as estimates and are replaced by
//! real measurements as blocks mount, so offsets of later blocks get
//! corrected over time.
//!
//! # Measurement states
//! - [`MeasureState::Uninitialized`]: pure estimates, nothing measured yet
//! - [`MeasureState::Measuring`]: some mounted blocks still await measurement
//! - [`MeasureState::Stable`]: every mounted block has a real size
//!
//! # Scroll anchoring
//! When a block that starts above the viewport top changes size, the scroll
//! offset moves by the same amount so the visible content doesn't jump.
//!
//! Offsets are rows from the top of the document. Item `i` occupies
//! `[start(i), start(i) + size(i))` followed by `gap` blank rows.

use super::fenwick::Fenwick;
use std::collections::BTreeSet;
use std::ops::Range;

/// One mounted block and where it sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualItem {
    pub index: usize,
    /// Absolute row offset from the top of the document
    pub start: u64,
    pub size: u32,
}

impl VirtualItem {
    pub fn end(&self) -> u64 {
        self.start + self.size as u64
    }
}

/// Where a scrolled-to item should land in the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlign {
    #[default]
    Start,
    Center,
    End,
    /// Don't move if already fully visible, otherwise the nearest edge
    Auto,
}

/// How the backend should perform a scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Instant,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollToOptions {
    pub align: ScrollAlign,
    pub behavior: ScrollBehavior,
}

impl ScrollToOptions {
    pub fn aligned(align: ScrollAlign) -> Self {
        Self {
            align,
            behavior: ScrollBehavior::Auto,
        }
    }
}

/// A single scroll request for the backend to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCommand {
    pub offset: u64,
    pub behavior: ScrollBehavior,
}

/// Scroll offset placing rows `[start, start + size)` per `align` in a
/// viewport currently at `scroll_offset` (not clamped)
pub fn aligned_offset(start: u64, size: u64, align: ScrollAlign, scroll_offset: u64, viewport: u64) -> u64 {
    let end = start + size;
    match align {
        ScrollAlign::Start => start,
        ScrollAlign::End => end.saturating_sub(viewport),
        ScrollAlign::Center => (start + size / 2).saturating_sub(viewport / 2),
        ScrollAlign::Auto => {
            if start >= scroll_offset && end <= scroll_offset + viewport {
                scroll_offset
            } else if start < scroll_offset || size > viewport {
                start
            } else {
                end.saturating_sub(viewport)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureState {
    Uninitialized,
    Measuring,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualizerOptions {
    /// Items mounted beyond each edge of the visible range
    pub overscan: usize,
    /// Rows between consecutive items
    pub gap: u32,
}

impl Default for VirtualizerOptions {
    fn default() -> Self {
        Self { overscan: 6, gap: 1 }
    }
}

#[derive(Debug, Clone)]
pub struct Virtualizer {
    estimates: Vec<u32>,
    sizes: Vec<u32>,
    measured: Vec<bool>,
    measured_count: usize,
    /// Per-item `size + gap`
    offsets: Fenwick,
    options: VirtualizerOptions,
    scroll_offset: u64,
    viewport_height: u32,
    /// Mounted items still waiting for a measurement
    pending: BTreeSet<usize>,
}

impl Virtualizer {
    /// Create a virtualizer from per-item size estimates
    pub fn new(estimates: Vec<u32>, options: VirtualizerOptions) -> Self {
        let estimates: Vec<u32> = estimates.into_iter().map(|e| e.max(1)).collect();
        let offsets = Self::build_offsets(&estimates, options.gap);
        Self {
            measured: vec![false; estimates.len()],
            sizes: estimates.clone(),
            estimates,
            measured_count: 0,
            offsets,
            options,
            scroll_offset: 0,
            viewport_height: 0,
            pending: BTreeSet::new(),
        }
    }

    /// Create a virtualizer for `count` items sized by `estimate`
    pub fn with_estimator(
        count: usize,
        estimate: impl Fn(usize) -> u32,
        options: VirtualizerOptions,
    ) -> Self {
        Self::new((0..count).map(estimate).collect(), options)
    }

    fn build_offsets(sizes: &[u32], gap: u32) -> Fenwick {
        let weights: Vec<u64> = sizes.iter().map(|&s| s as u64 + gap as u64).collect();
        Fenwick::from_values(&weights)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn options(&self) -> VirtualizerOptions {
        self.options
    }

    // ===== Geometry =====

    /// Total document height: all sizes plus the gaps between them
    pub fn total_size(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        self.offsets.total() - self.options.gap as u64
    }

    /// Absolute start of item `index` (clamped to the last item)
    pub fn start_of(&self, index: usize) -> u64 {
        self.offsets.prefix(index.min(self.len().saturating_sub(1)))
    }

    pub fn size_of(&self, index: usize) -> Option<u32> {
        self.sizes.get(index).copied()
    }

    pub fn item(&self, index: usize) -> Option<VirtualItem> {
        let size = self.size_of(index)?;
        Some(VirtualItem {
            index,
            start: self.offsets.prefix(index),
            size,
        })
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    /// Item covering row `offset`; a gap belongs to the item above it
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        Some(self.offsets.count_within(offset).min(self.len() - 1))
    }

    // ===== Viewport =====

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    /// Largest offset that still fills the viewport
    pub fn max_scroll_offset(&self) -> u64 {
        self.total_size().saturating_sub(self.viewport_height as u64)
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
    }

    /// Record a scroll position reported by the backend (clamped)
    pub fn set_scroll_offset(&mut self, offset: u64) {
        self.scroll_offset = offset.min(self.max_scroll_offset());
    }

    pub fn scroll_by(&mut self, rows: i64) -> u64 {
        let target = (self.scroll_offset as i64).saturating_add(rows).max(0) as u64;
        self.set_scroll_offset(target);
        self.scroll_offset
    }

    /// Items intersecting the viewport, without overscan
    pub fn visible_range(&self) -> Range<usize> {
        if self.is_empty() || self.viewport_height == 0 {
            return 0..0;
        }
        let bottom = self.scroll_offset + self.viewport_height as u64 - 1;
        let (Some(first), Some(last)) = (
            self.index_at_offset(self.scroll_offset),
            self.index_at_offset(bottom),
        ) else {
            return 0..0;
        };
        first..last + 1
    }

    /// Items to mount: the visible range widened by the overscan margin
    pub fn mount_range(&self) -> Range<usize> {
        let visible = self.visible_range();
        if visible.is_empty() {
            return visible;
        }
        let start = visible.start.saturating_sub(self.options.overscan);
        let end = (visible.end + self.options.overscan).min(self.len());
        start..end
    }

    /// Items of the mount range with their current offsets
    pub fn virtual_items(&self) -> Vec<VirtualItem> {
        self.mount_range()
            .filter_map(|index| self.item(index))
            .collect()
    }

    pub fn is_index_visible(&self, index: usize) -> bool {
        let Some(item) = self.item(index) else {
            return false;
        };
        let bottom = self.scroll_offset + self.viewport_height as u64;
        item.end() > self.scroll_offset && item.start < bottom
    }

    // ===== Measurement =====

    /// Mount the current window: returns its items and queues the unmeasured
    /// ones for measurement
    pub fn mount_window(&mut self) -> Vec<VirtualItem> {
        let items = self.virtual_items();
        for item in &items {
            if !self.measured[item.index] {
                self.pending.insert(item.index);
            }
        }
        tracing::trace!(
            "mount window {:?} at offset {} ({} pending)",
            self.mount_range(),
            self.scroll_offset,
            self.pending.len()
        );
        items
    }

    /// Record the real size of a mounted item
    ///
    /// Returns how many rows the scroll offset moved to keep the visible
    /// content in place (non-zero only when the item starts above the viewport
    /// top).
    pub fn measure(&mut self, index: usize, size: u32) -> i64 {
        if index >= self.len() {
            return 0;
        }
        let size = size.max(1);
        self.pending.remove(&index);
        if !self.measured[index] {
            self.measured[index] = true;
            self.measured_count += 1;
        }

        let old = self.sizes[index];
        if old == size {
            return 0;
        }
        let start = self.offsets.prefix(index);
        let delta = size as i64 - old as i64;
        self.sizes[index] = size;
        self.offsets.add(index, delta);

        if start < self.scroll_offset {
            let before = self.scroll_offset;
            self.set_scroll_offset((before as i64 + delta).max(0) as u64);
            let moved = self.scroll_offset as i64 - before as i64;
            tracing::trace!(
                "measure {}: {} -> {} rows above viewport, offset adjusted by {}",
                index,
                old,
                size,
                moved
            );
            return moved;
        }
        tracing::trace!("measure {}: {} -> {} rows", index, old, size);
        0
    }

    pub fn state(&self) -> MeasureState {
        if !self.pending.is_empty() {
            MeasureState::Measuring
        } else if self.measured_count == 0 {
            MeasureState::Uninitialized
        } else {
            MeasureState::Stable
        }
    }

    /// Drop all measurements (content or width changed), keeping the first
    /// visible item at the same place in the viewport
    pub fn invalidate_measurements(&mut self) {
        let anchor = self
            .index_at_offset(self.scroll_offset)
            .map(|index| (index, self.scroll_offset - self.start_of(index)));

        self.sizes.clone_from(&self.estimates);
        self.measured.iter_mut().for_each(|m| *m = false);
        self.measured_count = 0;
        self.pending.clear();
        self.offsets = Self::build_offsets(&self.sizes, self.options.gap);

        if let Some((index, within)) = anchor {
            let within = within.min(self.sizes[index] as u64);
            self.set_scroll_offset(self.start_of(index) + within);
        }
        tracing::debug!("virtualizer measurements invalidated ({} items)", self.len());
    }

    // ===== Scrolling =====

    /// Offset that brings `index` into view with `align`
    pub fn offset_for_index(&self, index: usize, align: ScrollAlign) -> Option<u64> {
        let item = self.item(index.min(self.len().checked_sub(1)?))?;
        let offset = aligned_offset(
            item.start,
            item.size as u64,
            align,
            self.scroll_offset,
            self.viewport_height as u64,
        );
        Some(offset.min(self.max_scroll_offset()))
    }

    /// Scroll so `index` lands per `options`, based on current sizes
    ///
    /// Lands exactly only if everything above `index` has been measured;
    /// callers needing exact placement fine-tune once the target is mounted.
    pub fn scroll_to_index(&mut self, index: usize, options: ScrollToOptions) -> Option<ScrollCommand> {
        let offset = self.offset_for_index(index, options.align)?;
        tracing::debug!(
            "scroll_to_index {} ({:?}) -> offset {} [{:?}]",
            index,
            options.align,
            offset,
            self.state()
        );
        Some(self.scroll_to_offset(offset, options.behavior))
    }

    pub fn scroll_to_offset(&mut self, offset: u64, behavior: ScrollBehavior) -> ScrollCommand {
        self.set_scroll_offset(offset);
        ScrollCommand {
            offset: self.scroll_offset,
            behavior,
        }
    }
}
