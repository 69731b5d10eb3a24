//! Word wrapping for styled text
//!
//! Works on `(char, Style)` cells so wrapping never has to care where one
//! highlight or inline style ends and the next begins.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// A single styled character
pub type Cell = (char, Style);

fn cell_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Collapse consecutive cells with equal style into spans
pub fn cells_to_line(cells: &[Cell]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut current_style: Option<Style> = None;
    for &(c, style) in cells {
        if current_style != Some(style) {
            if let Some(prev) = current_style {
                spans.push(Span::styled(std::mem::take(&mut current), prev));
            }
            current_style = Some(style);
        }
        current.push(c);
    }
    if let Some(style) = current_style {
        spans.push(Span::styled(current, style));
    }
    Line::from(spans)
}

/// Display width of a line of cells
pub fn cells_width(cells: &[Cell]) -> usize {
    cells.iter().map(|&(c, _)| cell_width(c)).sum()
}

/// Greedy word wrap of `cells` to `width` columns
///
/// Hard newlines always break. Words wider than a full line are split. Always
/// returns at least one (possibly empty) line.
pub fn wrap_cells(cells: &[Cell], width: usize) -> Vec<Vec<Cell>> {
    let width = width.max(1);
    let mut lines: Vec<Vec<Cell>> = Vec::new();
    let mut line: Vec<Cell> = Vec::new();
    let mut line_width = 0;

    let mut i = 0;
    while i < cells.len() {
        let (c, _) = cells[i];
        if c == '\n' {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
            i += 1;
            continue;
        }

        // Gather one token: a whitespace run or a word
        let is_space = c.is_whitespace();
        let mut end = i;
        while end < cells.len() && cells[end].0 != '\n' && cells[end].0.is_whitespace() == is_space {
            end += 1;
        }
        let token = &cells[i..end];
        let token_width = cells_width(token);
        i = end;

        if is_space {
            // Leading spaces are kept on the first line only (indentation)
            if line_width + token_width <= width && (line_width > 0 || lines.is_empty()) {
                line.extend_from_slice(token);
                line_width += token_width;
            } else if line_width > 0 {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            continue;
        }

        if line_width + token_width <= width {
            line.extend_from_slice(token);
            line_width += token_width;
            continue;
        }

        if token_width <= width {
            if line_width > 0 {
                trim_trailing_space(&mut line);
                lines.push(std::mem::take(&mut line));
            }
            line.extend_from_slice(token);
            line_width = token_width;
            continue;
        }

        // Word longer than a line: split it at the width
        for &cell in token {
            let w = cell_width(cell.0);
            if line_width + w > width && line_width > 0 {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            line.push(cell);
            line_width += w;
        }
    }

    trim_trailing_space(&mut line);
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

fn trim_trailing_space(line: &mut Vec<Cell>) {
    while line.last().is_some_and(|(c, _)| *c == ' ') {
        line.pop();
    }
}

/// Wrap and convert to ratatui lines, prefixing each line
///
/// `first_prefix` goes on the first line and `rest_prefix` on the others;
/// both are counted against `width`.
pub fn wrap_with_prefix(
    cells: &[Cell],
    width: usize,
    first_prefix: &[Cell],
    rest_prefix: &[Cell],
) -> Vec<Line<'static>> {
    let prefix_width = cells_width(first_prefix).max(cells_width(rest_prefix));
    let body_width = width.saturating_sub(prefix_width).max(1);
    wrap_cells(cells, body_width)
        .into_iter()
        .enumerate()
        .map(|(n, body)| {
            let prefix = if n == 0 { first_prefix } else { rest_prefix };
            let mut full = Vec::with_capacity(prefix.len() + body.len());
            full.extend_from_slice(prefix);
            full.extend(body);
            cells_to_line(&full)
        })
        .collect()
}

/// Cells for a plain string in one style
pub fn plain_cells(text: &str, style: Style) -> Vec<Cell> {
    text.chars().map(|c| (c, style)).collect()
}

/// Cut `text` to at most `width` columns, ending in `…` when cut
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.chars().map(cell_width).sum::<usize>() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = cell_width(c);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    if width > 0 {
        out.push('…');
    }
    out
}
