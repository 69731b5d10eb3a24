//! Row estimates for blocks that haven't been laid out yet
//!
//! Every block kind has an estimate, so the virtualizer never lacks a size.

use crate::config::EstimateConfig;
use crate::model::document::Block;

/// Estimated height of `block` in rows (at least 1)
pub fn estimate_block_rows(block: &Block, estimates: &EstimateConfig) -> u32 {
    let rows = match block {
        Block::Heading { level, .. } => match level {
            1 => estimates.heading_level1,
            2 => estimates.heading_level2,
            _ => estimates.heading_other,
        },
        Block::Paragraph { .. } => estimates.paragraph,
        Block::List { .. } => estimates.list,
        Block::DefinitionList { .. } => estimates.definition_list,
        Block::Table { .. } => estimates.table,
        Block::CodeBlock { text, .. } => {
            let lines = text.lines().count().max(1) as u32;
            lines
                .saturating_add(estimates.code_block_chrome)
                .min(estimates.code_block_max)
        }
        Block::HorizontalRule {} => estimates.horizontal_rule,
    };
    rows.max(1)
}

/// Estimates for a whole block list
pub fn estimate_all(blocks: &[Block], estimates: &EstimateConfig) -> Vec<u32> {
    blocks
        .iter()
        .map(|block| estimate_block_rows(block, estimates))
        .collect()
}
