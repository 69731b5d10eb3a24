//! Visible-text traversal over blocks.
//!
//! Find counting and find highlighting must agree on which strings a block
//! shows and in what order, otherwise "match 3 of block 12" would point at a
//! different occurrence than the one painted. Both go through
//! [`for_each_text_run`]: a block is a sequence of independent text runs
//! (heading text, one flattened inline run, code text, one table cell) and a
//! match never spans two runs.

use super::document::{Block, Inline};

/// Append the plain text of an inline tree to `out`
pub fn push_inline_text(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Text { text } | Inline::Code { text } => out.push_str(text),
        Inline::Emphasis { inlines } | Inline::Strong { inlines } | Inline::Link { inlines, .. } => {
            for child in inlines {
                push_inline_text(child, out);
            }
        }
    }
}

/// Plain text of a sequence of inlines
pub fn flatten_inlines(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        push_inline_text(inline, &mut out);
    }
    out
}

/// Visit every visible text run of a block in reading order
pub fn for_each_text_run(block: &Block, visit: &mut dyn FnMut(&str)) {
    match block {
        Block::Heading { text, .. } => visit(text),
        Block::Paragraph { inlines } => visit(&flatten_inlines(inlines)),
        Block::List { items, .. } => {
            for item in items {
                for child in item {
                    for_each_text_run(child, visit);
                }
            }
        }
        Block::DefinitionList { items } => {
            for item in items {
                visit(&flatten_inlines(&item.term_inlines));
                for child in &item.definition_blocks {
                    for_each_text_run(child, visit);
                }
            }
        }
        Block::CodeBlock { text, .. } => visit(text),
        Block::Table { headers, rows } => {
            for header in headers {
                visit(header);
            }
            for row in rows {
                for cell in row {
                    visit(cell);
                }
            }
        }
        Block::HorizontalRule {} => {}
    }
}

/// Collect a block's text runs (mostly useful for tests and CLI output)
pub fn block_text_runs(block: &Block) -> Vec<String> {
    let mut runs = Vec::new();
    for_each_text_run(block, &mut |run| runs.push(run.to_string()));
    runs
}
