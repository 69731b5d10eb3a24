//! Cross-block find index
//!
//! Counts query occurrences per top-level block and keeps a prefix sum over
//! those counts, so "which block holds global match k" is a binary search
//! instead of a scan over rendered output (which doesn't exist for blocks the
//! virtualizer hasn't mounted).

use crate::model::document::Block;
use crate::model::text::for_each_text_run;
use crate::primitives::ranges::{count_ranges, RangePattern};

/// Queries shorter than this (after trimming) mean "no search active"
pub const MIN_QUERY_LEN: usize = 2;

/// Trim a raw query; `None` when it is shorter than `min_len` chars
pub fn normalize_query(raw: &str, min_len: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < min_len.max(1) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Per-block match counts and their prefix sums
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindIndex {
    /// Normalized query this index was built for (empty for the empty index)
    pub query: String,
    /// Matches inside each block
    pub per_block_count: Vec<usize>,
    /// `prefix_by_block[i]` = matches in blocks `[0, i)`; has `n + 1` entries,
    /// the last being `total`
    pub prefix_by_block: Vec<usize>,
    pub total: usize,
}

/// Location of one match: the block and the match's ordinal inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchLocation {
    pub block_index: usize,
    pub within_block_index: usize,
}

impl FindIndex {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Locate global match `global_index`
    pub fn locate(&self, global_index: usize) -> Option<MatchLocation> {
        locate_find_match(&self.prefix_by_block, global_index)
    }

    /// Global match number of the first match in `block_index`
    pub fn first_match_of_block(&self, block_index: usize) -> Option<usize> {
        let count = *self.per_block_count.get(block_index)?;
        (count > 0).then(|| self.prefix_by_block[block_index])
    }
}

/// Occurrences of `pattern` across all text runs of one block
pub fn block_match_count(block: &Block, pattern: &RangePattern) -> usize {
    let mut count = 0;
    for_each_text_run(block, &mut |run| count += count_ranges(run, pattern));
    count
}

/// Build the index for `query` using the default minimum length
pub fn build_find_index(blocks: &[Block], query: &str) -> FindIndex {
    build_find_index_with(blocks, query, MIN_QUERY_LEN)
}

/// Build the index for `query`, treating queries shorter than `min_len` as empty
pub fn build_find_index_with(blocks: &[Block], query: &str, min_len: usize) -> FindIndex {
    let Some(query) = normalize_query(query, min_len) else {
        return FindIndex::default();
    };
    let Some(pattern) = RangePattern::literal(&query) else {
        return FindIndex::default();
    };

    let mut per_block_count = Vec::with_capacity(blocks.len());
    let mut prefix_by_block = Vec::with_capacity(blocks.len() + 1);
    let mut running = 0;
    for block in blocks {
        prefix_by_block.push(running);
        let count = block_match_count(block, &pattern);
        per_block_count.push(count);
        running += count;
    }
    prefix_by_block.push(running);

    tracing::debug!(
        "find index for {:?}: {} matches in {} blocks",
        query,
        running,
        blocks.len()
    );

    FindIndex {
        query,
        per_block_count,
        prefix_by_block,
        total: running,
    }
}

/// Total matches of `query` across the document (0 for short queries)
pub fn count_find_matches(blocks: &[Block], query: &str) -> usize {
    build_find_index(blocks, query).total
}

/// Find the block holding global match `global_index`
///
/// `prefix_by_block` is the sentinel-terminated prefix array of a
/// [`FindIndex`]. Returns `None` when `global_index` is outside `[0, total)`.
pub fn locate_find_match(prefix_by_block: &[usize], global_index: usize) -> Option<MatchLocation> {
    let (&total, starts) = prefix_by_block.split_last()?;
    if global_index >= total {
        return None;
    }
    // Greatest i with starts[i] <= global_index. Blocks without matches share
    // their start with the next block, so the greatest one is the block that
    // actually contains the match.
    let block_index = starts.partition_point(|&start| start <= global_index).checked_sub(1)?;
    Some(MatchLocation {
        block_index,
        within_block_index: global_index - starts[block_index],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::document::{DefinitionItem, Inline};

    /// The canonical mixed-block example: "tar" appears 11 times
    fn tar_blocks() -> Vec<Block> {
        vec![
            Block::heading("synopsis", 2, "SYNOPSIS"),
            Block::paragraph("Tar tarball"),
            Block::List {
                ordered: false,
                items: vec![vec![Block::paragraph("use tar to create tar archives")]],
            },
            Block::DefinitionList {
                items: vec![DefinitionItem {
                    id: None,
                    term_inlines: vec![Inline::text("tar")],
                    definition_blocks: vec![Block::paragraph("tar extracts")],
                }],
            },
            Block::code("tar -xvf /tmp/tar"),
            Block::Table {
                headers: vec!["tar".into()],
                rows: vec![
                    vec!["TAR".into(), "untar".into()],
                    vec!["nope".into(), "".into()],
                ],
            },
        ]
    }

    #[test]
    fn test_count_tar_example() {
        assert_eq!(count_find_matches(&tar_blocks(), "tar"), 11);
        assert_eq!(count_find_matches(&tar_blocks(), "  TAR "), 11);
    }

    #[test]
    fn test_short_queries_are_inactive() {
        for query in ["", "t", " t ", "   "] {
            let index = build_find_index(&tar_blocks(), query);
            assert_eq!(index.total, 0);
            assert!(index.per_block_count.is_empty());
            assert_eq!(count_find_matches(&tar_blocks(), query), 0);
        }
    }

    #[test]
    fn test_prefix_sums() {
        let index = build_find_index(&tar_blocks(), "tar");
        assert_eq!(index.per_block_count, vec![0, 2, 2, 2, 2, 3]);
        assert_eq!(index.prefix_by_block, vec![0, 0, 2, 4, 6, 8, 11]);
        assert_eq!(index.total, 11);
        assert_eq!(index.first_match_of_block(0), None);
        assert_eq!(index.first_match_of_block(5), Some(8));
    }

    #[test]
    fn test_locate_skips_empty_blocks() {
        let index = build_find_index(&tar_blocks(), "tar");
        assert_eq!(
            index.locate(0),
            Some(MatchLocation { block_index: 1, within_block_index: 0 })
        );
        assert_eq!(
            index.locate(7),
            Some(MatchLocation { block_index: 4, within_block_index: 1 })
        );
        assert_eq!(
            index.locate(10),
            Some(MatchLocation { block_index: 5, within_block_index: 2 })
        );
        assert_eq!(index.locate(11), None);
    }

    #[test]
    fn test_locate_on_degenerate_prefixes() {
        assert_eq!(locate_find_match(&[], 0), None);
        assert_eq!(locate_find_match(&[0], 0), None);
        assert_eq!(locate_find_match(&[0, 0, 0], 0), None);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let blocks = tar_blocks();
        assert_eq!(build_find_index(&blocks, "tar"), build_find_index(&blocks, "tar"));
    }

    #[test]
    fn test_min_len_is_configurable() {
        let index = build_find_index_with(&tar_blocks(), "t", 1);
        assert!(index.total > 11);
        assert_eq!(build_find_index_with(&tar_blocks(), "tar", 4).total, 0);
    }
}
