//! The viewport owner
//!
//! `DocumentView` decides once, by block count, whether a document is
//! virtualized. Small documents are laid out in full; large ones go through
//! the [`Virtualizer`] and only the window around the viewport is laid out
//! each frame. Either way the rest of the app sees the same surface: mounted
//! blocks with absolute starts, a scroll offset, anchor lookup.

use super::active::{active_band, band_active_heading, heading_at_index, HeadingExtent};
use super::estimate::estimate_all;
use super::layout::{layout_block, BlockLayout};
use super::scroll::ScrollSurface;
use super::virtualizer::{
    aligned_offset, MeasureState, ScrollCommand, ScrollToOptions, Virtualizer, VirtualizerOptions,
};
use crate::config::ViewerConfig;
use crate::find::MatchLocation;
use crate::model::anchors::{definition_term, heading_positions, AnchorMap, HeadingPosition};
use crate::model::document::{Block, Document};
use crate::primitives::option_terms::parse_option_terms;
use crate::primitives::ranges::{RangePattern, RunMarker};
use ratatui::text::Line;
use std::collections::HashMap;

/// Pseudo-anchor resolving to the line of the current find match
pub const CURRENT_MATCH_ANCHOR: &str = "manview:current-match";

/// Mount/measure rounds per frame before settling for estimates
const MAX_MOUNT_PASSES: usize = 8;

/// What to paint over the text
#[derive(Debug, Clone, Default)]
pub struct Highlights {
    pub find: Option<RangePattern>,
    pub current: Option<MatchLocation>,
    pub option: Option<OptionFocus>,
}

/// Option flags highlighted inside one block
#[derive(Debug, Clone)]
pub struct OptionFocus {
    pub block_index: usize,
    pub terms: Vec<String>,
    pub pattern: RangePattern,
}

#[derive(Debug, Clone)]
pub struct MountedBlock {
    pub index: usize,
    pub start: u64,
    pub layout: BlockLayout,
}

impl MountedBlock {
    pub fn end(&self) -> u64 {
        self.start + self.layout.height() as u64
    }
}

#[derive(Debug, Clone)]
enum Mode {
    /// Every block laid out
    Full {
        scroll_offset: u64,
        total: u64,
        dirty: bool,
        /// Block and row within it to put back at the viewport top after relayout
        keep_top: Option<(usize, u64)>,
    },
    Virtual(Virtualizer),
}

#[derive(Debug, Clone)]
pub struct DocumentView {
    document: Document,
    config: ViewerConfig,
    anchors: AnchorMap,
    headings: Vec<HeadingPosition>,
    width: u16,
    height: u16,
    mode: Mode,
    /// Laid-out blocks in index order
    mounted: Vec<MountedBlock>,
    highlights: Highlights,
}

fn layout_at(blocks: &[Block], highlights: &Highlights, index: usize, width: u16) -> BlockLayout {
    let current = highlights
        .current
        .filter(|c| c.block_index == index)
        .map(|c| c.within_block_index);
    let option = highlights
        .option
        .as_ref()
        .filter(|o| o.block_index == index)
        .map(|o| &o.pattern);
    let mut marker = RunMarker::new(highlights.find.as_ref(), option, current);
    match blocks.get(index) {
        Some(block) => layout_block(block, width, &mut marker),
        None => BlockLayout::default(),
    }
}

impl DocumentView {
    pub fn new(document: Document, config: ViewerConfig, width: u16, height: u16) -> Self {
        let virtualized = document.len() >= config.virtualization_threshold;
        let mode = if virtualized {
            let mut virtualizer = Virtualizer::new(
                estimate_all(&document.blocks, &config.estimates),
                VirtualizerOptions {
                    overscan: config.overscan,
                    gap: config.block_gap,
                },
            );
            virtualizer.set_viewport_height(height as u32);
            Mode::Virtual(virtualizer)
        } else {
            Mode::Full {
                scroll_offset: 0,
                total: 0,
                dirty: true,
                keep_top: None,
            }
        };
        tracing::info!(
            "document view: {} blocks, {}",
            document.len(),
            if virtualized { "virtualized" } else { "full layout" }
        );

        let mut view = Self {
            anchors: AnchorMap::build(&document.blocks),
            headings: heading_positions(&document.blocks),
            document,
            config,
            width,
            height,
            mode,
            mounted: Vec::new(),
            highlights: Highlights::default(),
        };
        view.frame();
        view
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn anchors(&self) -> &AnchorMap {
        &self.anchors
    }

    pub fn headings(&self) -> &[HeadingPosition] {
        &self.headings
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn mounted(&self) -> &[MountedBlock] {
        &self.mounted
    }

    pub fn virtualizer(&self) -> Option<&Virtualizer> {
        match &self.mode {
            Mode::Virtual(virtualizer) => Some(virtualizer),
            Mode::Full { .. } => None,
        }
    }

    /// Measurement state; `None` when laid out in full
    pub fn measure_state(&self) -> Option<MeasureState> {
        self.virtualizer().map(Virtualizer::state)
    }

    fn mark_dirty(&mut self) {
        if let Mode::Full { dirty, .. } = &mut self.mode {
            *dirty = true;
        }
    }

    /// Lay out what the viewport needs; call once per frame before drawing
    pub fn frame(&mut self) {
        let Self {
            document,
            config,
            height,
            mode,
            mounted,
            highlights,
            width,
            ..
        } = self;
        let blocks = document.blocks.as_slice();
        let width = *width;
        let lay = |index: usize| layout_at(blocks, highlights, index, width);

        match mode {
            Mode::Full {
                scroll_offset,
                total,
                dirty,
                keep_top,
            } => {
                if !*dirty {
                    return;
                }
                let gap = config.block_gap as u64;
                let mut start = 0;
                *mounted = (0..blocks.len())
                    .map(|index| {
                        let block = MountedBlock {
                            index,
                            start,
                            layout: lay(index),
                        };
                        start = block.end() + gap;
                        block
                    })
                    .collect();
                *total = mounted.last().map(MountedBlock::end).unwrap_or(0);
                if let Some((index, within)) = keep_top.take() {
                    if let Some(block) = mounted.get(index) {
                        *scroll_offset = block.start + within.min(block.layout.height() as u64);
                    }
                }
                *scroll_offset = (*scroll_offset).min(total.saturating_sub(*height as u64));
                *dirty = false;
                tracing::debug!("full layout: {} blocks, {} rows", blocks.len(), total);
            }
            Mode::Virtual(virtualizer) => {
                let mut layouts: HashMap<usize, BlockLayout> = HashMap::new();
                for _ in 0..MAX_MOUNT_PASSES {
                    let mut corrected = false;
                    for item in virtualizer.mount_window() {
                        let height = layouts
                            .entry(item.index)
                            .or_insert_with(|| lay(item.index))
                            .height();
                        if !virtualizer.is_measured(item.index)
                            || virtualizer.size_of(item.index) != Some(height)
                        {
                            virtualizer.measure(item.index, height);
                            corrected = true;
                        }
                    }
                    if !corrected {
                        break;
                    }
                }
                *mounted = virtualizer
                    .virtual_items()
                    .into_iter()
                    .map(|item| MountedBlock {
                        index: item.index,
                        start: item.start,
                        layout: layouts
                            .remove(&item.index)
                            .unwrap_or_else(|| lay(item.index)),
                    })
                    .collect();
            }
        }
    }

    // ===== Highlights =====

    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    /// Set the find pattern and current match
    pub fn set_find(&mut self, pattern: Option<RangePattern>, current: Option<MatchLocation>) {
        self.highlights.find = pattern;
        self.highlights.current = current;
        self.mark_dirty();
    }

    /// Highlight the option flags of the definition term anchored at `id`
    ///
    /// Returns false, clearing any previous focus, when `id` is not a
    /// definition term or its term has no flags.
    pub fn focus_option(&mut self, id: &str) -> bool {
        let focus = self.anchors.owner(id).and_then(|block_index| {
            let term = definition_term(self.document.blocks.get(block_index)?, id)?;
            let terms = parse_option_terms(&term);
            let pattern = RangePattern::option_terms(&terms)?;
            Some(OptionFocus {
                block_index,
                terms,
                pattern,
            })
        });
        let focused = focus.is_some();
        if let Some(focus) = &focus {
            tracing::debug!("option focus on {:?}: {:?}", id, focus.terms);
        }
        self.highlights.option = focus;
        self.mark_dirty();
        focused
    }

    pub fn clear_option_focus(&mut self) {
        if self.highlights.option.take().is_some() {
            self.mark_dirty();
        }
    }

    // ===== Scrolling =====

    pub fn scroll_offset(&self) -> u64 {
        match &self.mode {
            Mode::Full { scroll_offset, .. } => *scroll_offset,
            Mode::Virtual(virtualizer) => virtualizer.scroll_offset(),
        }
    }

    pub fn total_rows(&self) -> u64 {
        match &self.mode {
            Mode::Full { total, .. } => *total,
            Mode::Virtual(virtualizer) => virtualizer.total_size(),
        }
    }

    pub fn max_scroll(&self) -> u64 {
        self.total_rows().saturating_sub(self.height as u64)
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        let max = self.max_scroll();
        match &mut self.mode {
            Mode::Full { scroll_offset, .. } => *scroll_offset = offset.min(max),
            Mode::Virtual(virtualizer) => virtualizer.set_scroll_offset(offset),
        }
    }

    pub fn scroll_by(&mut self, rows: i64) {
        let target = (self.scroll_offset() as i64).saturating_add(rows).max(0) as u64;
        self.set_scroll_offset(target);
    }

    /// Scroll by whole pages, keeping one row of context
    pub fn scroll_pages(&mut self, pages: i64) {
        let page = (self.height as i64 - 1).max(1);
        self.scroll_by(pages * page);
    }

    pub fn scroll_to_top(&mut self) {
        self.set_scroll_offset(0);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.set_scroll_offset(u64::MAX);
    }

    /// How far down the document the viewport is, 0..=100
    pub fn scroll_percent(&self) -> u16 {
        let max = self.max_scroll();
        if max == 0 {
            return 100;
        }
        (self.scroll_offset().min(max) * 100 / max) as u16
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let width_changed = width != self.width;
        let top = self.top_position();
        self.width = width;
        self.height = height;
        match &mut self.mode {
            Mode::Full {
                scroll_offset,
                total,
                dirty,
                keep_top,
            } => {
                if width_changed {
                    // Rows move after re-wrap; frame() restores the top block
                    *dirty = true;
                    if keep_top.is_none() {
                        *keep_top = top;
                    }
                } else if !*dirty {
                    *scroll_offset = (*scroll_offset).min(total.saturating_sub(height as u64));
                }
            }
            Mode::Virtual(virtualizer) => {
                virtualizer.set_viewport_height(height as u32);
                if width_changed {
                    virtualizer.invalidate_measurements();
                }
            }
        }
    }

    // ===== Queries =====

    /// Block at the viewport top
    pub fn first_visible_block(&self) -> Option<usize> {
        let top = self.scroll_offset();
        match &self.mode {
            Mode::Virtual(virtualizer) => virtualizer.index_at_offset(top),
            Mode::Full { .. } => {
                let count = self.mounted.partition_point(|b| b.start <= top);
                count.checked_sub(1).map(|i| self.mounted[i].index)
            }
        }
    }

    /// Mounted block at the viewport top and the row offset into it
    fn top_position(&self) -> Option<(usize, u64)> {
        let top = self.scroll_offset();
        let count = self.mounted.partition_point(|b| b.start <= top);
        let block = self.mounted.get(count.checked_sub(1)?)?;
        Some((block.index, top - block.start))
    }

    /// Absolute row of a mounted anchor
    pub fn anchor_row(&self, id: &str) -> Option<u64> {
        if id == CURRENT_MATCH_ANCHOR {
            let current = self.highlights.current?;
            let block = self.mounted.iter().find(|b| b.index == current.block_index)?;
            return Some(block.start + block.layout.current_match_line? as u64);
        }
        let owner = self.anchors.owner(id)?;
        let block = self.mounted.iter().find(|b| b.index == owner)?;
        Some(block.start + block.layout.anchor_line(id)? as u64)
    }

    fn line_at(&self, row: u64) -> Line<'static> {
        let count = self.mounted.partition_point(|b| b.start <= row);
        count
            .checked_sub(1)
            .and_then(|i| {
                let block = &self.mounted[i];
                block.layout.lines.get((row - block.start) as usize).cloned()
            })
            .unwrap_or_default()
    }

    /// The lines filling the viewport, gaps included
    pub fn visible_lines(&self) -> Vec<Line<'static>> {
        let top = self.scroll_offset();
        (0..self.height as u64).map(|row| self.line_at(top + row)).collect()
    }

    /// Heading considered current for the table of contents
    pub fn active_heading(&self) -> Option<String> {
        match &self.mode {
            Mode::Virtual(virtualizer) => {
                let line = virtualizer.scroll_offset() + self.config.reading_line_offset as u64;
                let index = virtualizer.index_at_offset(line)?;
                heading_at_index(&self.headings, index).map(|p| p.heading_id.clone())
            }
            Mode::Full { scroll_offset, .. } => {
                let extents: Vec<HeadingExtent<'_>> = self
                    .headings
                    .iter()
                    .filter_map(|p| {
                        let block = self.mounted.get(p.block_index)?;
                        Some(HeadingExtent {
                            id: &p.heading_id,
                            top: block.start,
                            bottom: block.end(),
                        })
                    })
                    .collect();
                let band = active_band(
                    *scroll_offset,
                    self.height as u32,
                    self.config.active_band_top_percent,
                    self.config.active_band_bottom_percent,
                );
                band_active_heading(&extents, band).map(str::to_string)
            }
        }
    }
}

impl ScrollSurface for DocumentView {
    fn is_virtualized(&self) -> bool {
        matches!(self.mode, Mode::Virtual(_))
    }

    fn scroll_to_block_index(&mut self, index: usize, options: ScrollToOptions) -> Option<ScrollCommand> {
        if let Mode::Virtual(virtualizer) = &mut self.mode {
            return virtualizer.scroll_to_index(index, options);
        }
        let last = self.mounted.len().checked_sub(1)?;
        let block = &self.mounted[index.min(last)];
        let offset = aligned_offset(
            block.start,
            block.layout.height() as u64,
            options.align,
            self.scroll_offset(),
            self.height as u64,
        );
        self.set_scroll_offset(offset);
        Some(ScrollCommand {
            offset: self.scroll_offset(),
            behavior: options.behavior,
        })
    }

    fn anchor_owner(&self, id: &str) -> Option<usize> {
        if id == CURRENT_MATCH_ANCHOR {
            return self.highlights.current.map(|c| c.block_index);
        }
        self.anchors.owner(id)
    }

    fn is_anchor_mounted(&self, id: &str) -> bool {
        self.anchor_row(id).is_some()
    }

    fn scroll_anchor_into_view(&mut self, id: &str, options: ScrollToOptions) -> bool {
        let Some(row) = self.anchor_row(id) else {
            return false;
        };
        let offset = aligned_offset(row, 1, options.align, self.scroll_offset(), self.height as u64);
        self.set_scroll_offset(offset);
        tracing::debug!("anchor {:?} at row {} -> offset {}", id, row, self.scroll_offset());
        true
    }
}
