//! Anchor and heading lookups, built once per document.

use super::document::{Block, DefinitionItem};
use super::text::flatten_inlines;
use std::collections::HashMap;

/// Maps every anchor id to the top-level block that owns it
///
/// Anchors are heading ids, code-block ids and definition-item ids at any
/// nesting depth. When an id is repeated the first owner wins.
#[derive(Debug, Clone, Default)]
pub struct AnchorMap {
    owners: HashMap<String, usize>,
}

impl AnchorMap {
    pub fn build(blocks: &[Block]) -> Self {
        let mut owners = HashMap::new();
        for (index, block) in blocks.iter().enumerate() {
            collect_block_anchors(block, &mut |id| {
                owners.entry(id.to_string()).or_insert(index);
            });
        }
        tracing::debug!("anchor map built: {} anchors over {} blocks", owners.len(), blocks.len());
        Self { owners }
    }

    /// Index of the top-level block owning `id`
    pub fn owner(&self, id: &str) -> Option<usize> {
        self.owners.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Visit every anchor id declared inside a block, in reading order
pub fn collect_block_anchors(block: &Block, visit: &mut dyn FnMut(&str)) {
    match block {
        Block::Heading { id, .. } => visit(id),
        Block::CodeBlock { id: Some(id), .. } => visit(id),
        Block::List { items, .. } => {
            for item in items {
                for child in item {
                    collect_block_anchors(child, visit);
                }
            }
        }
        Block::DefinitionList { items } => {
            for item in items {
                if let Some(id) = &item.id {
                    visit(id);
                }
                for child in &item.definition_blocks {
                    collect_block_anchors(child, visit);
                }
            }
        }
        _ => {}
    }
}

/// A top-level heading and the block index it sits at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingPosition {
    pub heading_id: String,
    pub block_index: usize,
}

/// Ascending list of top-level headings by block index
pub fn heading_positions(blocks: &[Block]) -> Vec<HeadingPosition> {
    blocks
        .iter()
        .enumerate()
        .filter_map(|(block_index, block)| match block {
            Block::Heading { id, .. } => Some(HeadingPosition {
                heading_id: id.clone(),
                block_index,
            }),
            _ => None,
        })
        .collect()
}

/// Plain term text of the definition item with anchor `id`, at any depth
pub fn definition_term(block: &Block, id: &str) -> Option<String> {
    fn in_items(items: &[DefinitionItem], id: &str) -> Option<String> {
        items.iter().find_map(|item| {
            if item.id.as_deref() == Some(id) {
                return Some(flatten_inlines(&item.term_inlines));
            }
            item.definition_blocks
                .iter()
                .find_map(|child| definition_term(child, id))
        })
    }

    match block {
        Block::DefinitionList { items } => in_items(items, id),
        Block::List { items, .. } => items
            .iter()
            .flatten()
            .find_map(|child| definition_term(child, id)),
        _ => None,
    }
}
