// ViewerTestHarness - Virtual terminal environment for E2E testing

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use manview::app::Viewer;
use manview::config::ViewerConfig;
use manview::model::document::Document;
use ratatui::{backend::TestBackend, Terminal};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

/// Frames allowed for an anchor jump to finish polling
const SETTLE_FRAMES: usize = 40;

/// Virtual pager environment for testing
///
/// Time is paused, so frame sleeps complete instantly and tests stay
/// deterministic. Spawned jump tasks live on the harness's `LocalSet` and make
/// progress whenever a frame runs.
pub struct ViewerTestHarness {
    viewer: Viewer,
    terminal: Terminal<TestBackend>,
    runtime: Runtime,
    local: LocalSet,
}

impl ViewerTestHarness {
    pub fn new(document: Document, width: u16, height: u16) -> Self {
        Self::with_config(document, ViewerConfig::default(), width, height)
    }

    pub fn with_config(document: Document, config: ViewerConfig, width: u16, height: u16) -> Self {
        // RUST_LOG=debug shows anchor resolution in failing tests
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();
        let terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let viewer = Viewer::new("test", document, config, width, height);

        let mut harness = Self {
            viewer,
            terminal,
            runtime,
            local: LocalSet::new(),
        };
        harness.frame();
        harness
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut Viewer {
        &mut self.viewer
    }

    /// Run one frame: tick, let spawned tasks run for a frame interval, draw
    pub fn frame(&mut self) {
        let interval = self.viewer.config().frame_interval();
        let Self {
            viewer,
            terminal,
            runtime,
            local,
        } = self;
        local.block_on(runtime, async {
            viewer.tick();
            tokio::time::sleep(interval).await;
        });
        terminal.draw(|frame| viewer.render(frame)).unwrap();
    }

    /// Run enough frames for pending jumps and deferred searches to finish
    pub fn settle(&mut self) {
        for _ in 0..SETTLE_FRAMES {
            self.frame();
        }
    }

    pub fn send_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        self.viewer.handle_key(KeyEvent::new(code, modifiers));
        self.frame();
    }

    /// Send the same key press multiple times, rendering once at the end
    pub fn send_key_repeat(&mut self, code: KeyCode, modifiers: KeyModifiers, count: usize) {
        for _ in 0..count {
            self.viewer.handle_key(KeyEvent::new(code, modifiers));
        }
        self.frame();
    }

    /// Simulate typing a string of text
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.viewer
                .handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
        self.frame();
    }

    /// Open the find bar, type `query` and confirm with Enter
    pub fn search(&mut self, query: &str) {
        self.send_key(KeyCode::Char('/'), KeyModifiers::NONE);
        self.type_text(query);
        self.send_key(KeyCode::Enter, KeyModifiers::NONE);
        self.settle();
    }

    pub fn buffer(&self) -> &ratatui::buffer::Buffer {
        self.terminal.backend().buffer()
    }

    /// Get the text content of a specific screen row
    pub fn get_row_text(&self, y: u16) -> String {
        let buffer = self.buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }

    /// Get the style of a specific cell
    pub fn get_cell_style(&self, x: u16, y: u16) -> ratatui::style::Style {
        self.buffer()[(x, y)].style()
    }

    /// The bottom row
    pub fn status_bar(&self) -> String {
        self.get_row_text(self.buffer().area.height - 1)
    }

    pub fn screen_to_string(&self) -> String {
        (0..self.buffer().area.height)
            .map(|y| self.get_row_text(y).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn assert_screen_contains(&self, text: &str) {
        let screen = self.screen_to_string();
        assert!(
            screen.contains(text),
            "Expected screen to contain '{}'\nScreen content:\n{}",
            text,
            screen
        );
    }

    pub fn assert_screen_not_contains(&self, text: &str) {
        let screen = self.screen_to_string();
        assert!(
            !screen.contains(text),
            "Expected screen to not contain '{}'\nScreen content:\n{}",
            text,
            screen
        );
    }

    /// Row of the first screen line containing `text`
    pub fn find_row(&self, text: &str) -> Option<u16> {
        (0..self.buffer().area.height).find(|&y| self.get_row_text(y).contains(text))
    }
}
