use super::*;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

impl Viewer {
    /// Handle a key event
    ///
    /// This is the single entry point for keys, used by the event loop and
    /// by tests.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        tracing::trace!("handle_key: {:?} in {:?}", key, self.focus);

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.focus {
            Focus::Document => self.handle_document_key(key),
            Focus::FindBar => self.handle_find_bar_key(key),
            Focus::Toc => self.handle_toc_key(key),
        }
    }

    fn handle_document_key(&mut self, key: KeyEvent) {
        let mut view = self.view.borrow_mut();
        let half_page = view.height() as i64 / 2;
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => view.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => view.scroll_by(-1),
            KeyCode::Char(' ') | KeyCode::PageDown => view.scroll_pages(1),
            KeyCode::Char('b') | KeyCode::PageUp => view.scroll_pages(-1),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                view.scroll_by(half_page)
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                view.scroll_by(-half_page)
            }
            KeyCode::Char('g') | KeyCode::Home => view.scroll_to_top(),
            KeyCode::Char('G') | KeyCode::End => view.scroll_to_bottom(),
            KeyCode::Char('/') => self.focus = Focus::FindBar,
            KeyCode::Char('n') => {
                drop(view);
                self.next_match();
            }
            KeyCode::Char('N') => {
                drop(view);
                self.prev_match();
            }
            KeyCode::Tab => {
                if !self.toc.is_empty() {
                    self.focus = Focus::Toc;
                }
            }
            KeyCode::Esc => {
                drop(view);
                self.clear_find();
                self.view.borrow_mut().clear_option_focus();
            }
            _ => {}
        }
    }

    fn handle_find_bar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.focus = Focus::Document;
                // Settle now so Enter lands on a match even mid-typing
                self.settle_find();
            }
            KeyCode::Esc => {
                self.focus = Focus::Document;
                self.clear_find();
            }
            KeyCode::Backspace => {
                let mut query = self.find.raw_query().to_string();
                query.pop();
                self.set_query(&query);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut query = self.find.raw_query().to_string();
                query.push(c);
                self.set_query(&query);
            }
            _ => {}
        }
    }

    fn handle_toc_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.toc_selected + 1 < self.toc.len() {
                    self.toc_selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.toc_selected = self.toc_selected.saturating_sub(1);
            }
            KeyCode::Char('g') | KeyCode::Home => self.toc_selected = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.toc_selected = self.toc.len().saturating_sub(1);
            }
            KeyCode::Enter => {
                if let Some(entry) = self.toc.get(self.toc_selected) {
                    let anchor = entry.id.clone();
                    self.jump_to_anchor(&anchor);
                }
                self.focus = Focus::Document;
            }
            KeyCode::Tab | KeyCode::Esc => self.focus = Focus::Document,
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }
}
