//! Immutable document model for a rendered manual page.
//!
//! A document is an ordered list of top-level [`Block`]s plus a table of
//! contents. Block order is the reading order and defines the global position
//! used by both virtualization and find-match numbering, so the block list is
//! shared behind an `Arc` and never mutated after load: a new page replaces the
//! whole model.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Top-level structural unit of a manual page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Block {
    Heading {
        id: String,
        level: u8,
        text: String,
    },
    Paragraph {
        inlines: Vec<Inline>,
    },
    List {
        #[serde(default)]
        ordered: bool,
        /// Each item is itself a sequence of blocks
        items: Vec<Vec<Block>>,
    },
    DefinitionList {
        items: Vec<DefinitionItem>,
    },
    CodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language_hint: Option<String>,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    HorizontalRule {},
}

/// One term/definition pair of a definition list (typically an option)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub term_inlines: Vec<Inline>,
    pub definition_blocks: Vec<Block>,
}

/// Text-level node nested under a paragraph, list item or definition term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Inline {
    Text {
        text: String,
    },
    Code {
        text: String,
    },
    Emphasis {
        inlines: Vec<Inline>,
    },
    Strong {
        inlines: Vec<Inline>,
    },
    Link {
        link_type: LinkType,
        href: String,
        inlines: Vec<Inline>,
    },
}

/// How a link target resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// Another manual page known to the backend
    Internal,
    External,
    /// A reference the backend could not resolve
    Unresolved,
}

/// Table-of-contents entry as supplied by the document payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub id: String,
    pub title: String,
    pub level: u8,
}

/// A loaded manual page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Top-level blocks in reading order
    pub blocks: Arc<Vec<Block>>,
    #[serde(default)]
    pub toc: Vec<TocEntry>,
}

impl Document {
    /// Create a document from its blocks and table of contents
    pub fn new(blocks: Vec<Block>, toc: Vec<TocEntry>) -> Self {
        Self {
            blocks: Arc::new(blocks),
            toc,
        }
    }

    /// Number of top-level blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether two documents share the same block list instance
    ///
    /// Block lists are immutable, so identity is the cheapest staleness check
    /// for anything derived from them.
    pub fn same_blocks(&self, other: &Arc<Vec<Block>>) -> bool {
        Arc::ptr_eq(&self.blocks, other)
    }
}

impl Block {
    /// Convenience constructor for a paragraph made of one plain text run
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            inlines: vec![Inline::text(text)],
        }
    }

    pub fn heading(id: impl Into<String>, level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            id: id.into(),
            level,
            text: text.into(),
        }
    }

    pub fn code(text: impl Into<String>) -> Self {
        Block::CodeBlock {
            id: None,
            text: text.into(),
            language_hint: None,
        }
    }

    /// Short name of the block kind, used in logs and CLI output
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Paragraph { .. } => "paragraph",
            Block::List { .. } => "list",
            Block::DefinitionList { .. } => "definition_list",
            Block::CodeBlock { .. } => "code_block",
            Block::Table { .. } => "table",
            Block::HorizontalRule {} => "horizontal_rule",
        }
    }
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text { text: text.into() }
    }

    pub fn code(text: impl Into<String>) -> Self {
        Inline::Code { text: text.into() }
    }
}
