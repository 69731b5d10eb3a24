//! Find-in-page navigation state
//!
//! Typing only records the raw query; the index is rebuilt later by
//! [`FindSession::settle`], which the event loop calls on an idle pass. In
//! between, [`FindSession::is_pending`] reports the transitional state so the
//! UI can show it instead of stale counts.

use super::index::{build_find_index_with, normalize_query, FindIndex, MatchLocation};
use crate::model::document::{Block, Document};
use crate::primitives::ranges::RangePattern;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FindSession {
    raw_query: String,
    min_len: usize,
    index: FindIndex,
    /// Block list the current index was built from
    indexed_blocks: Option<Arc<Vec<Block>>>,
    pattern: Option<RangePattern>,
    /// Global ordinal of the current match
    current: usize,
    /// The single highlighted match; cleared before every reassignment
    highlighted: Option<MatchLocation>,
}

impl FindSession {
    pub fn new(min_len: usize) -> Self {
        Self {
            raw_query: String::new(),
            min_len,
            index: FindIndex::default(),
            indexed_blocks: None,
            pattern: None,
            current: 0,
            highlighted: None,
        }
    }

    /// Record new query text; cheap, does not touch the index
    pub fn set_query(&mut self, raw: &str) {
        if self.raw_query != raw {
            self.raw_query.clear();
            self.raw_query.push_str(raw);
        }
    }

    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    fn normalized(&self) -> Option<String> {
        normalize_query(&self.raw_query, self.min_len)
    }

    /// Whether the query is long enough to search
    pub fn is_active(&self) -> bool {
        self.normalized().is_some()
    }

    /// Whether the index lags behind the query or the document
    pub fn is_pending(&self, document: &Document) -> bool {
        let wanted = self.normalized().unwrap_or_default();
        if wanted != self.index.query {
            return true;
        }
        match &self.indexed_blocks {
            Some(blocks) => !document.same_blocks(blocks),
            None => !wanted.is_empty(),
        }
    }

    /// Rebuild the index if the query or the document changed
    ///
    /// Returns true when a rebuild happened. The current match resets to the
    /// first one.
    pub fn settle(&mut self, document: &Document) -> bool {
        if !self.is_pending(document) {
            return false;
        }
        self.index = build_find_index_with(&document.blocks, &self.raw_query, self.min_len);
        self.pattern = RangePattern::literal(&self.index.query);
        self.indexed_blocks = Some(Arc::clone(&document.blocks));
        self.current = 0;
        self.clear_highlight();
        tracing::debug!(
            "find settled: query={:?} total={}",
            self.index.query,
            self.index.total
        );
        true
    }

    pub fn index(&self) -> &FindIndex {
        &self.index
    }

    /// Pattern for painting matches of the settled query
    pub fn pattern(&self) -> Option<&RangePattern> {
        self.pattern.as_ref()
    }

    pub fn total(&self) -> usize {
        self.index.total
    }

    /// Ordinal of the current match, when there are matches
    pub fn current(&self) -> Option<usize> {
        (self.index.total > 0).then_some(self.current)
    }

    pub fn current_location(&self) -> Option<MatchLocation> {
        self.current().and_then(|k| self.index.locate(k))
    }

    /// Select match `ordinal`, wrapping modulo the total
    pub fn select(&mut self, ordinal: usize) -> Option<MatchLocation> {
        let total = self.index.total;
        if total == 0 {
            self.clear_highlight();
            return None;
        }
        self.current = ordinal % total;
        let location = self.index.locate(self.current)?;
        self.focus(location);
        Some(location)
    }

    pub fn next(&mut self) -> Option<MatchLocation> {
        if self.highlighted.is_none() {
            return self.select(self.current);
        }
        self.select(self.current + 1)
    }

    pub fn prev(&mut self) -> Option<MatchLocation> {
        let total = self.index.total;
        if total == 0 {
            return self.select(0);
        }
        if self.highlighted.is_none() {
            return self.select(self.current);
        }
        self.select(self.current + total - 1)
    }

    /// Select the first match at or after `block_index`, wrapping to the top
    pub fn select_from_block(&mut self, block_index: usize) -> Option<MatchLocation> {
        let starts = self.index.prefix_by_block.get(block_index).copied();
        let ordinal = match starts {
            Some(start) if start < self.index.total => start,
            _ => 0,
        };
        self.select(ordinal)
    }

    /// The highlighted match, if any
    pub fn highlighted(&self) -> Option<MatchLocation> {
        self.highlighted
    }

    fn focus(&mut self, location: MatchLocation) {
        self.clear_highlight();
        self.highlighted = Some(location);
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    /// Forget the query and the index
    pub fn clear(&mut self) {
        self.raw_query.clear();
        self.index = FindIndex::default();
        self.indexed_blocks = None;
        self.pattern = None;
        self.current = 0;
        self.clear_highlight();
    }
}
