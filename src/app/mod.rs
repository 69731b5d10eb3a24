mod input;
mod render;
mod run;
pub mod types;

pub use run::run_event_loop;

use self::types::{toc_entries, Focus, JumpRequest};
use crate::config::ViewerConfig;
use crate::find::FindSession;
use crate::model::document::{Document, TocEntry};
use crate::services::retry::RetryPolicy;
use crate::view::active::ActiveHeadingTracker;
use crate::view::{DocumentView, ScrollAlign, ScrollController, ScrollToOptions, CURRENT_MATCH_ANCHOR};
use std::cell::RefCell;
use std::rc::Rc;

/// The terminal pager
///
/// Owns the document view (shared with in-flight anchor jumps), the find
/// session and the table-of-contents state. Input handling is synchronous;
/// anything that must wait for frames is queued and started by [`Viewer::tick`].
pub struct Viewer {
    title: String,
    config: ViewerConfig,
    view: Rc<RefCell<DocumentView>>,
    scroll: ScrollController<DocumentView>,
    find: FindSession,
    /// Query changed since the last draw; settle on the next tick
    find_deferred: bool,
    tracker: ActiveHeadingTracker,
    /// Set by the tracker callback, drained on tick to move the TOC selection
    active_changed: Rc<RefCell<Option<Option<String>>>>,
    toc: Vec<TocEntry>,
    toc_selected: usize,
    focus: Focus,
    pending_jumps: Vec<JumpRequest>,
    last_scroll_offset: Option<u64>,
    should_quit: bool,
}

impl Viewer {
    /// Create a viewer for a terminal of `width` x `height` cells
    pub fn new(title: impl Into<String>, document: Document, config: ViewerConfig, width: u16, height: u16) -> Self {
        let toc = toc_entries(&document.toc, &document.blocks);
        let view = DocumentView::new(document, config.clone(), width, height);
        let view = Rc::new(RefCell::new(view));
        let scroll = ScrollController::new(
            Rc::clone(&view),
            RetryPolicy::new(config.anchor_poll_attempts, config.frame_interval()),
        );

        let active_changed = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&active_changed);
        let tracker = ActiveHeadingTracker::new(move |id| {
            *sink.borrow_mut() = Some(id.map(str::to_string));
        });

        let mut viewer = Self {
            title: title.into(),
            find: FindSession::new(config.min_query_len),
            config,
            view,
            scroll,
            find_deferred: false,
            tracker,
            active_changed,
            toc,
            toc_selected: 0,
            focus: Focus::Document,
            pending_jumps: Vec::new(),
            last_scroll_offset: None,
            should_quit: false,
        };
        // Content area is smaller than the terminal; render fixes it up
        viewer.resize(width, height);
        viewer
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn view(&self) -> &Rc<RefCell<DocumentView>> {
        &self.view
    }

    pub fn find(&self) -> &FindSession {
        &self.find
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    pub fn toc_selected(&self) -> usize {
        self.toc_selected
    }

    pub fn active_heading(&self) -> Option<&str> {
        self.tracker.active()
    }

    pub fn is_virtualized(&self) -> bool {
        self.scroll.is_virtualized()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Whether the find bar should show the "searching" state
    pub fn is_searching(&self) -> bool {
        self.find.is_pending(self.view.borrow().document())
    }

    /// Queue a jump to an anchor (heading, code block, definition term)
    ///
    /// Jumping to a definition term also highlights its option flags.
    pub fn jump_to_anchor(&mut self, anchor: &str) {
        {
            let mut view = self.view.borrow_mut();
            if !view.focus_option(anchor) {
                view.clear_option_focus();
            }
        }
        tracing::info!("jump to anchor {:?}", anchor);
        self.pending_jumps.push(JumpRequest {
            anchor: anchor.to_string(),
            options: ScrollToOptions::aligned(ScrollAlign::Start),
        });
    }

    /// Make the session's current match the highlighted one and bring it into
    /// view
    fn reveal_current_match(&mut self) {
        let location = self.find.highlighted();
        self.view
            .borrow_mut()
            .set_find(self.find.pattern().cloned(), location);
        if location.is_some() {
            self.pending_jumps.push(JumpRequest {
                anchor: CURRENT_MATCH_ANCHOR.to_string(),
                options: ScrollToOptions::aligned(ScrollAlign::Center),
            });
        }
    }

    pub fn next_match(&mut self) {
        self.settle_find();
        if self.find.next().is_some() {
            self.reveal_current_match();
        }
    }

    pub fn prev_match(&mut self) {
        self.settle_find();
        if self.find.prev().is_some() {
            self.reveal_current_match();
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.find.set_query(query);
        self.find_deferred = false;
    }

    pub fn clear_find(&mut self) {
        self.find.clear();
        self.find_deferred = false;
        self.view.borrow_mut().set_find(None, None);
    }

    /// Rebuild the find index now if it lags behind the query
    fn settle_find(&mut self) {
        let rebuilt = {
            let view = self.view.borrow();
            self.find.settle(view.document())
        };
        self.find_deferred = false;
        if !rebuilt {
            return;
        }
        let from = self.view.borrow().first_visible_block().unwrap_or(0);
        if self.find.total() > 0 {
            self.find.select_from_block(from);
        }
        self.reveal_current_match();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let (content_width, content_height) = self.content_size(width, height);
        let mut view = self.view.borrow_mut();
        if view.width() != content_width || view.height() != content_height {
            view.resize(content_width, content_height);
            view.frame();
        }
    }

    /// Width of the TOC pane, border included; 0 when hidden
    pub fn toc_pane_width(&self, width: u16) -> u16 {
        if self.config.show_toc && !self.toc.is_empty() {
            self.config.toc_width.saturating_add(1).min(width / 2)
        } else {
            0
        }
    }

    /// Rows taken by the find bar and status bar
    fn bar_rows(&self) -> u16 {
        if self.focus == Focus::FindBar {
            2
        } else {
            1
        }
    }

    /// Size of the document pane for a terminal size
    pub fn content_size(&self, width: u16, height: u16) -> (u16, u16) {
        (
            width.saturating_sub(self.toc_pane_width(width)).max(1),
            height.saturating_sub(self.bar_rows()).max(1),
        )
    }

    /// One frame of background work: start queued jumps, settle a deferred
    /// query, lay out the viewport and update the active heading
    ///
    /// Must run inside a `LocalSet`.
    pub fn tick(&mut self) {
        for jump in self.pending_jumps.drain(..) {
            let scroll = self.scroll.clone();
            tokio::task::spawn_local(async move {
                scroll.scroll_to_anchor(&jump.anchor, jump.options).await;
            });
        }

        if self.find_deferred {
            self.settle_find();
        } else if self.is_searching() {
            // Leave one draw for the transitional state
            self.find_deferred = true;
        }

        let offset = {
            let mut view = self.view.borrow_mut();
            view.frame();
            view.scroll_offset()
        };
        if self.last_scroll_offset != Some(offset) {
            self.last_scroll_offset = Some(offset);
            self.tracker.on_scroll();
        }
        let view = Rc::clone(&self.view);
        self.tracker.on_frame(|| view.borrow().active_heading());

        if let Some(active) = self.active_changed.borrow_mut().take() {
            if self.focus != Focus::Toc {
                if let Some(position) = active
                    .as_deref()
                    .and_then(|id| self.toc.iter().position(|entry| entry.id == id))
                {
                    self.toc_selected = position;
                }
            }
        }
    }
}
