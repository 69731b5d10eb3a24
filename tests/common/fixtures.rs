// Test fixtures for manual-page payloads

use manview::model::document::{Block, DefinitionItem, Document, Inline, TocEntry};
use std::io::Write;
use tempfile::NamedTempFile;

/// A page with a level-2 heading every ten blocks and paragraphs in between
///
/// Heading ids are `h-<block index>`; every paragraph mentions "tar" once.
pub fn long_page(blocks: usize) -> Document {
    let mut toc = Vec::new();
    let blocks = (0..blocks)
        .map(|i| {
            if i % 10 == 0 {
                toc.push(TocEntry {
                    id: format!("h-{i}"),
                    title: format!("Section {i}"),
                    level: 2,
                });
                Block::heading(format!("h-{i}"), 2, format!("Section {i}"))
            } else {
                Block::paragraph(format!("paragraph {i} mentions tar archives briefly"))
            }
        })
        .collect();
    Document::new(blocks, toc)
}

fn option(id: &str, flags: &str, description: &str) -> DefinitionItem {
    DefinitionItem {
        id: Some(id.to_string()),
        term_inlines: vec![Inline::code(flags)],
        definition_blocks: vec![Block::paragraph(description)],
    }
}

/// A short grep-like page with an OPTIONS definition list
pub fn options_page() -> Document {
    let blocks = vec![
        Block::heading("name", 1, "NAME"),
        Block::paragraph("grep - print lines that match patterns"),
        Block::heading("synopsis", 2, "SYNOPSIS"),
        Block::code("grep [OPTION...] PATTERNS [FILE...]"),
        Block::heading("options", 2, "OPTIONS"),
        Block::DefinitionList {
            items: vec![
                option(
                    "opt-recursive",
                    "-r, --recursive",
                    "Read all files under each directory. Note that -r follows \
                     symlinks only on the command line, unlike --recursive=deep.",
                ),
                option(
                    "opt-color",
                    "--color[=WHEN]",
                    "Surround matched strings with escape sequences.",
                ),
            ],
        },
        Block::heading("see-also", 2, "SEE ALSO"),
        Block::paragraph("sed(1), awk(1)"),
    ];
    let toc = ["name:NAME:1", "synopsis:SYNOPSIS:2", "options:OPTIONS:2", "see-also:SEE ALSO:2"]
        .iter()
        .map(|entry| {
            let parts: Vec<&str> = entry.split(':').collect();
            TocEntry {
                id: parts[0].to_string(),
                title: parts[1].to_string(),
                level: parts[2].parse().unwrap(),
            }
        })
        .collect();
    Document::new(blocks, toc)
}

/// Write a document to a temporary JSON payload file
pub fn write_payload(document: &Document) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    serde_json::to_writer(&mut file, document).unwrap();
    file.flush().unwrap();
    file
}
