use super::*;
use crate::primitives::wrap::truncate_to_width;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

impl Viewer {
    /// Draw the whole screen
    ///
    /// Resizes the document view to the pane it gets, so the layout follows
    /// the terminal and the find bar opening or closing.
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        self.resize(area.width, area.height);
        self.view.borrow_mut().frame();

        let find_rows = if self.focus == Focus::FindBar { 1 } else { 0 };
        let [main, find_bar, status] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(find_rows),
            Constraint::Length(1),
        ])
        .areas(area);

        let toc_width = self.toc_pane_width(area.width);
        let [toc, document] =
            Layout::horizontal([Constraint::Length(toc_width), Constraint::Min(1)]).areas(main);

        if toc_width > 0 {
            self.render_toc(frame, toc);
        }
        let lines = self.view.borrow().visible_lines();
        frame.render_widget(Paragraph::new(lines), document);
        if find_rows > 0 {
            self.render_find_bar(frame, find_bar);
        }
        self.render_status(frame, status);
    }

    fn render_toc(&self, frame: &mut Frame, area: Rect) {
        let height = area.height as usize;
        let active = self.active_heading();
        // Keep the selection on screen
        let first = (self.toc_selected + 1).saturating_sub(height);

        let lines: Vec<Line> = self
            .toc
            .iter()
            .enumerate()
            .skip(first)
            .take(height)
            .map(|(i, entry)| {
                let indent = "  ".repeat(entry.level.saturating_sub(1) as usize);
                let mut style = Style::default();
                if active == Some(entry.id.as_str()) {
                    style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
                }
                if self.focus == Focus::Toc && i == self.toc_selected {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Line::from(Span::styled(format!("{indent}{}", entry.title), style))
            })
            .collect();

        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_find_bar(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(self.find.raw_query().to_string()),
            Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Match counter text, empty when find is inactive
    pub fn match_status(&self) -> String {
        if !self.find.is_active() {
            return String::new();
        }
        if self.is_searching() {
            return "searching…".to_string();
        }
        match (self.find.current(), self.find.total()) {
            (_, 0) => "no matches".to_string(),
            (Some(current), total) => format!("{}/{}", current + 1, total),
            (None, total) => format!("{total} matches"),
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let style = Style::default().bg(Color::DarkGray).fg(Color::White);
        let heading = self
            .active_heading()
            .and_then(|id| self.toc.iter().find(|entry| entry.id == id))
            .map(|entry| entry.title.as_str())
            .unwrap_or("");

        let mut left = format!(" {}", self.title);
        if !heading.is_empty() {
            left.push_str(" › ");
            left.push_str(heading);
        }
        let mut right = self.match_status();
        if !right.is_empty() {
            right.push_str("  ");
        }
        right.push_str(&format!("{:>3}% ", self.view.borrow().scroll_percent()));

        let width = area.width as usize;
        let right_width = right.width();
        let left = truncate_to_width(&left, width.saturating_sub(right_width + 1));
        let pad = width
            .saturating_sub(left.width() + right_width);

        let line = Line::from(vec![
            Span::raw(left),
            Span::raw(" ".repeat(pad)),
            Span::raw(right),
        ])
        .style(style);
        frame.render_widget(Paragraph::new(line), area);
    }
}
