use super::Viewer;
use anyhow::Result as AnyhowResult;
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;
use std::time::Duration;

/// Main event loop
///
/// Each iteration is one frame: tick, draw, then drain pending terminal
/// events. When nothing arrived the loop sleeps for a frame interval so
/// spawned anchor jumps get to run their polls.
///
/// Must be awaited inside a `LocalSet`.
pub async fn run_event_loop(viewer: &mut Viewer, terminal: &mut DefaultTerminal) -> AnyhowResult<()> {
    let frame_interval = viewer.config().frame_interval();

    loop {
        viewer.tick();
        terminal.draw(|frame| viewer.render(frame))?;

        if viewer.should_quit() {
            tracing::info!("quit requested");
            break;
        }

        let mut handled = false;
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => viewer.handle_key(key),
                Event::Resize(width, height) => viewer.resize(width, height),
                _ => {}
            }
            handled = true;
            if viewer.should_quit() {
                break;
            }
        }

        if handled {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(frame_interval).await;
        }
    }
    Ok(())
}
