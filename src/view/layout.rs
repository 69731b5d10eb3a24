//! Block layout: turning one top-level block into wrapped terminal lines
//!
//! Text runs are marked in the same order [`for_each_text_run`] visits them,
//! so the n-th find mark painted in a block is the n-th match the find index
//! counted for it.
//!
//! [`for_each_text_run`]: crate::model::text::for_each_text_run

use crate::model::document::{Block, DefinitionItem, Inline, LinkType};
use crate::primitives::ranges::{HighlightKind, MarkedText, RunMarker};
use crate::primitives::wrap::{cells_to_line, cells_width, plain_cells, wrap_cells, Cell};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const LIST_BULLET: &str = "• ";
const DEFINITION_INDENT: &str = "    ";
const CODE_GUTTER: &str = "│ ";
const TABLE_SEPARATOR: &str = " │ ";
const CURRENT_MATCH_BG: Color = Color::LightRed;

/// A laid-out block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockLayout {
    pub lines: Vec<Line<'static>>,
    /// Anchor ids declared in the block with the line they start on
    pub anchors: Vec<(String, usize)>,
    /// Line holding the current find match, if this block has it
    pub current_match_line: Option<usize>,
}

impl BlockLayout {
    /// Rendered height in rows; this is the block's measurement
    pub fn height(&self) -> u32 {
        self.lines.len().max(1) as u32
    }

    pub fn anchor_line(&self, id: &str) -> Option<usize> {
        self.anchors
            .iter()
            .find(|(anchor, _)| anchor == id)
            .map(|(_, line)| *line)
    }

    fn push_anchor(&mut self, id: &str) {
        self.anchors.push((id.to_string(), self.lines.len()));
    }

    /// Append `other` with every line prefixed
    fn extend_prefixed(&mut self, other: BlockLayout, first: &str, rest: &str) {
        let base = self.lines.len();
        for (n, line) in other.lines.into_iter().enumerate() {
            let prefix = if n == 0 { first } else { rest };
            let mut spans = Vec::with_capacity(line.spans.len() + 1);
            spans.push(Span::raw(prefix.to_string()));
            spans.extend(line.spans);
            self.lines.push(Line::from(spans));
        }
        self.anchors
            .extend(other.anchors.into_iter().map(|(id, line)| (id, base + line)));
    }
}

/// Style painted over a highlighted range
pub fn mark_style(kind: HighlightKind) -> Style {
    match kind {
        HighlightKind::Find => Style::default().fg(Color::Black).bg(Color::Yellow),
        HighlightKind::CurrentFind => Style::default()
            .fg(Color::Black)
            .bg(CURRENT_MATCH_BG)
            .add_modifier(Modifier::BOLD),
        HighlightKind::Option => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    }
}

fn heading_style(level: u8) -> Style {
    match level {
        1 => Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        2 => Style::default().add_modifier(Modifier::BOLD),
        _ => Style::default().add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}

fn inline_cells(inline: &Inline, style: Style, out: &mut Vec<Cell>) {
    match inline {
        Inline::Text { text } => out.extend(text.chars().map(|c| (c, style))),
        Inline::Code { text } => {
            let style = style.fg(Color::Green);
            out.extend(text.chars().map(|c| (c, style)));
        }
        Inline::Emphasis { inlines } => {
            let style = style.add_modifier(Modifier::ITALIC);
            for child in inlines {
                inline_cells(child, style, out);
            }
        }
        Inline::Strong { inlines } => {
            let style = style.add_modifier(Modifier::BOLD);
            for child in inlines {
                inline_cells(child, style, out);
            }
        }
        Inline::Link {
            link_type, inlines, ..
        } => {
            let style = match link_type {
                LinkType::Internal => style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
                LinkType::External => style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                LinkType::Unresolved => style.add_modifier(Modifier::DIM),
            };
            for child in inlines {
                inline_cells(child, style, out);
            }
        }
    }
}

/// Paint marks over cells built from `marked.text` (one cell per char)
fn apply_marks(cells: &mut [Cell], marked: &MarkedText<'_>) {
    if marked.marks.is_empty() {
        return;
    }
    let mut marks = marked.marks.iter().peekable();
    for (cell, (byte, _)) in cells.iter_mut().zip(marked.text.char_indices()) {
        while marks.peek().is_some_and(|m| m.range.end <= byte) {
            marks.next();
        }
        if let Some(mark) = marks.peek() {
            if mark.range.start <= byte {
                cell.1 = cell.1.patch(mark_style(mark.kind));
            }
        }
    }
}

/// Cells for one text run, highlights applied
fn marked_cells(text: &str, mut cells: Vec<Cell>, marker: &mut RunMarker<'_>) -> Vec<Cell> {
    let marked = marker.mark(text);
    apply_marks(&mut cells, &marked);
    cells
}

fn inline_run_cells(inlines: &[Inline], style: Style, marker: &mut RunMarker<'_>) -> Vec<Cell> {
    let mut cells = Vec::new();
    let mut text = String::new();
    for inline in inlines {
        inline_cells(inline, style, &mut cells);
        crate::model::text::push_inline_text(inline, &mut text);
    }
    marked_cells(&text, cells, marker)
}

fn push_wrapped(layout: &mut BlockLayout, cells: &[Cell], width: usize) {
    layout
        .lines
        .extend(wrap_cells(cells, width).iter().map(|line| cells_to_line(line)));
}

/// Split at newlines and hard-wrap at `width` without touching whitespace
fn chunk_cells(cells: &[Cell], width: usize) -> Vec<Vec<Cell>> {
    let width = width.max(1);
    let mut lines: Vec<Vec<Cell>> = cells
        .split(|(c, _)| *c == '\n')
        .flat_map(|line| {
            if line.is_empty() {
                return vec![Vec::new()];
            }
            let mut chunks = Vec::new();
            let mut chunk = Vec::new();
            let mut chunk_width = 0;
            for &cell in line {
                let w = cells_width(&[cell]);
                if chunk_width + w > width && !chunk.is_empty() {
                    chunks.push(std::mem::take(&mut chunk));
                    chunk_width = 0;
                }
                chunk.push(cell);
                chunk_width += w;
            }
            chunks.push(chunk);
            chunks
        })
        .collect();
    if lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Lay out a block at `width` columns
///
/// `marker` carries the block's highlight patterns and current match; it is
/// advanced across all runs of the block, nested ones included.
pub fn layout_block(block: &Block, width: u16, marker: &mut RunMarker<'_>) -> BlockLayout {
    let mut layout = BlockLayout::default();
    layout_into(block, (width as usize).max(1), marker, &mut layout);
    if layout.lines.is_empty() {
        layout.lines.push(Line::default());
    }
    layout.current_match_line = layout.lines.iter().position(|line| {
        line.spans
            .iter()
            .any(|span| span.style.bg == Some(CURRENT_MATCH_BG))
    });
    layout
}

fn layout_into(block: &Block, width: usize, marker: &mut RunMarker<'_>, out: &mut BlockLayout) {
    match block {
        Block::Heading { id, level, text } => {
            out.push_anchor(id);
            let style = heading_style(*level);
            let cells = marked_cells(text, plain_cells(text, style), marker);
            let start = out.lines.len();
            push_wrapped(out, &cells, width);
            if *level == 1 {
                let underline = out.lines[start..]
                    .iter()
                    .map(|line| line.width())
                    .max()
                    .unwrap_or(0)
                    .max(1);
                out.lines.push(Line::styled("━".repeat(underline), Style::default()));
            }
        }
        Block::Paragraph { inlines } => {
            let cells = inline_run_cells(inlines, Style::default(), marker);
            push_wrapped(out, &cells, width);
        }
        Block::List { ordered, items } => {
            for (n, item) in items.iter().enumerate() {
                let bullet = if *ordered {
                    format!("{}. ", n + 1)
                } else {
                    LIST_BULLET.to_string()
                };
                let indent = " ".repeat(bullet.chars().count());
                let inner_width = width.saturating_sub(indent.len()).max(1);
                let mut item_layout = BlockLayout::default();
                for child in item {
                    layout_into(child, inner_width, marker, &mut item_layout);
                }
                if item_layout.lines.is_empty() {
                    item_layout.lines.push(Line::default());
                }
                out.extend_prefixed(item_layout, &bullet, &indent);
            }
        }
        Block::DefinitionList { items } => {
            for (n, item) in items.iter().enumerate() {
                if n > 0 {
                    out.lines.push(Line::default());
                }
                layout_definition_item(item, width, marker, out);
            }
        }
        Block::CodeBlock {
            id,
            text,
            language_hint,
        } => {
            if let Some(id) = id {
                out.push_anchor(id);
            }
            let frame = Style::default().fg(Color::DarkGray);
            let code = Style::default().fg(Color::Green);
            let label = language_hint
                .as_deref()
                .map(|lang| format!("─ {} ", lang))
                .unwrap_or_default();
            let rule_width = width.saturating_sub(1 + label.chars().count()).max(1);
            out.lines.push(Line::styled(
                format!("┌{}{}", label, "─".repeat(rule_width)),
                frame,
            ));
            let cells = marked_cells(text, plain_cells(text, code), marker);
            let body_width = width.saturating_sub(CODE_GUTTER.chars().count()).max(1);
            for chunk in chunk_cells(&cells, body_width) {
                let mut line = vec![Span::styled(CODE_GUTTER, frame)];
                line.extend(cells_to_line(&chunk).spans);
                out.lines.push(Line::from(line));
            }
            out.lines.push(Line::styled(
                format!("└{}", "─".repeat(width.saturating_sub(1).max(1))),
                frame,
            ));
        }
        Block::Table { headers, rows } => layout_table(headers, rows, width, marker, out),
        Block::HorizontalRule {} => {
            out.lines.push(Line::styled(
                "─".repeat(width),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }
}

fn layout_definition_item(
    item: &DefinitionItem,
    width: usize,
    marker: &mut RunMarker<'_>,
    out: &mut BlockLayout,
) {
    if let Some(id) = &item.id {
        out.push_anchor(id);
    }
    let term_style = Style::default().add_modifier(Modifier::BOLD);
    let cells = inline_run_cells(&item.term_inlines, term_style, marker);
    push_wrapped(out, &cells, width);

    let inner_width = width.saturating_sub(DEFINITION_INDENT.len()).max(1);
    let mut body = BlockLayout::default();
    for child in &item.definition_blocks {
        layout_into(child, inner_width, marker, &mut body);
    }
    out.extend_prefixed(body, DEFINITION_INDENT, DEFINITION_INDENT);
}

/// Column widths that fit `width`, shrinking wide columns proportionally
fn column_widths(natural: &[usize], width: usize) -> Vec<usize> {
    let separators = TABLE_SEPARATOR.chars().count() * natural.len().saturating_sub(1);
    let available = width.saturating_sub(separators).max(natural.len());
    let sum: usize = natural.iter().sum();
    if sum <= available {
        return natural.to_vec();
    }
    natural
        .iter()
        .map(|&w| (w * available / sum.max(1)).clamp(1, w.max(1)))
        .collect()
}

fn layout_table(
    headers: &[String],
    rows: &[Vec<String>],
    width: usize,
    marker: &mut RunMarker<'_>,
    out: &mut BlockLayout,
) {
    let columns = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return;
    }

    let header_style = Style::default().add_modifier(Modifier::BOLD);
    let header_cells: Vec<Vec<Cell>> = headers
        .iter()
        .map(|h| marked_cells(h, plain_cells(h, header_style), marker))
        .collect();
    let row_cells: Vec<Vec<Vec<Cell>>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| marked_cells(cell, plain_cells(cell, Style::default()), marker))
                .collect()
        })
        .collect();

    let mut natural = vec![1usize; columns];
    for row in std::iter::once(&header_cells).chain(row_cells.iter()) {
        for (col, cells) in row.iter().enumerate() {
            natural[col] = natural[col].max(cells_width(cells));
        }
    }
    let widths = column_widths(&natural, width);

    if !headers.is_empty() {
        push_table_row(&header_cells, &widths, out);
        let rule: Vec<String> = widths.iter().map(|&w| "─".repeat(w)).collect();
        out.lines.push(Line::styled(
            rule.join("─┼─"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    for row in &row_cells {
        push_table_row(row, &widths, out);
    }
}

fn push_table_row(row: &[Vec<Cell>], widths: &[usize], out: &mut BlockLayout) {
    let wrapped: Vec<Vec<Vec<Cell>>> = widths
        .iter()
        .enumerate()
        .map(|(col, &w)| match row.get(col) {
            Some(cells) => wrap_cells(cells, w),
            None => vec![Vec::new()],
        })
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);
    let separator = Style::default().fg(Color::DarkGray);

    for line_no in 0..height {
        let mut cells: Vec<Cell> = Vec::new();
        for (col, column) in wrapped.iter().enumerate() {
            if col > 0 {
                cells.extend(plain_cells(TABLE_SEPARATOR, separator));
            }
            let part = column.get(line_no).map(Vec::as_slice).unwrap_or(&[]);
            cells.extend_from_slice(part);
            let pad = widths[col].saturating_sub(cells_width(part));
            if col + 1 < widths.len() {
                cells.extend(std::iter::repeat((' ', Style::default())).take(pad));
            }
        }
        out.lines.push(cells_to_line(&cells));
    }
}
