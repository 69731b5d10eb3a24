use crate::model::document::{Block, TocEntry};
use crate::view::ScrollToOptions;

/// Which pane receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Document,
    FindBar,
    Toc,
}

/// An anchor jump waiting to be handed to the scroll controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct JumpRequest {
    pub anchor: String,
    pub options: ScrollToOptions,
}

/// Table of contents: the payload's own, or one derived from top-level
/// headings when the payload has none
pub(super) fn toc_entries(toc: &[TocEntry], blocks: &[Block]) -> Vec<TocEntry> {
    if !toc.is_empty() {
        return toc.to_vec();
    }
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::Heading { id, level, text } => Some(TocEntry {
                id: id.clone(),
                title: text.clone(),
                level: *level,
            }),
            _ => None,
        })
        .collect()
}
