use crate::common::fixtures::{long_page, options_page};
use crate::common::harness::ViewerTestHarness;
use crossterm::event::{KeyCode, KeyModifiers};
use manview::app::types::Focus;
use ratatui::style::Modifier;

#[test]
fn test_tab_focuses_toc_and_enter_jumps() {
    let mut harness = ViewerTestHarness::new(long_page(500), 80, 24);
    harness.send_key(KeyCode::Tab, KeyModifiers::NONE);
    assert_eq!(harness.viewer().focus(), Focus::Toc);

    harness.send_key_repeat(KeyCode::Down, KeyModifiers::NONE, 3);
    assert_eq!(harness.viewer().toc_selected(), 3);

    harness.send_key(KeyCode::Enter, KeyModifiers::NONE);
    assert_eq!(harness.viewer().focus(), Focus::Document);
    harness.settle();

    assert_eq!(
        harness.viewer().view().borrow().first_visible_block(),
        Some(30)
    );
    assert_eq!(harness.viewer().active_heading(), Some("h-30"));
}

#[test]
fn test_selected_entry_is_reversed() {
    let mut harness = ViewerTestHarness::new(options_page(), 80, 24);
    harness.send_key(KeyCode::Tab, KeyModifiers::NONE);
    harness.send_key(KeyCode::Home, KeyModifiers::NONE);
    harness.send_key(KeyCode::Char('j'), KeyModifiers::NONE);
    assert_eq!(harness.viewer().toc_selected(), 1);

    let row = harness.find_row("SYNOPSIS").unwrap();
    let style = harness.get_cell_style(2, row);
    assert!(style.add_modifier.contains(Modifier::REVERSED));
}

#[test]
fn test_toc_follows_active_heading() {
    let mut harness = ViewerTestHarness::new(long_page(500), 80, 24);
    harness.viewer_mut().jump_to_anchor("h-420");
    harness.settle();
    assert_eq!(harness.viewer().toc_selected(), 42);

    // The active entry is scrolled into the last TOC row
    assert!(harness.get_row_text(22).starts_with("  Section 420"));
}

#[test]
fn test_tab_ignored_without_toc() {
    let document = manview::model::document::Document::new(
        vec![manview::model::document::Block::paragraph("no headings here")],
        Vec::new(),
    );
    let mut harness = ViewerTestHarness::new(document, 80, 24);
    harness.send_key(KeyCode::Tab, KeyModifiers::NONE);
    assert_eq!(harness.viewer().focus(), Focus::Document);
}

#[test]
fn test_toc_derived_from_headings_when_payload_has_none() {
    let mut document = long_page(40);
    document.toc.clear();
    let harness = ViewerTestHarness::new(document, 80, 24);
    assert_eq!(harness.viewer().toc().len(), 4);
    harness.assert_screen_contains("Section 30");
}
