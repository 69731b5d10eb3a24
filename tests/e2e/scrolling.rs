use crate::common::fixtures::long_page;
use crate::common::harness::ViewerTestHarness;
use crossterm::event::{KeyCode, KeyModifiers};

fn scroll_offset(harness: &ViewerTestHarness) -> u64 {
    harness.viewer().view().borrow().scroll_offset()
}

#[test]
fn test_line_and_page_scrolling() {
    let mut harness = ViewerTestHarness::new(long_page(40), 80, 24);
    harness.send_key(KeyCode::Char('j'), KeyModifiers::NONE);
    harness.send_key(KeyCode::Down, KeyModifiers::NONE);
    assert_eq!(scroll_offset(&harness), 2);

    harness.send_key(KeyCode::Char('k'), KeyModifiers::NONE);
    assert_eq!(scroll_offset(&harness), 1);

    // 23 content rows, one row of overlap
    harness.send_key(KeyCode::PageDown, KeyModifiers::NONE);
    assert_eq!(scroll_offset(&harness), 23);
    harness.send_key(KeyCode::PageUp, KeyModifiers::NONE);
    assert_eq!(scroll_offset(&harness), 1);

    harness.send_key(KeyCode::Char('d'), KeyModifiers::CONTROL);
    assert_eq!(scroll_offset(&harness), 12);
}

#[test]
fn test_top_and_bottom() {
    let mut harness = ViewerTestHarness::new(long_page(40), 80, 24);
    harness.send_key(KeyCode::Char('G'), KeyModifiers::SHIFT);
    // 79 rows of content in a 23-row pane
    assert_eq!(scroll_offset(&harness), 56);
    assert!(harness.status_bar().contains("100%"), "{}", harness.status_bar());
    harness.assert_screen_contains("paragraph 39 mentions");

    harness.send_key(KeyCode::Char('g'), KeyModifiers::NONE);
    assert_eq!(scroll_offset(&harness), 0);
    assert!(harness.status_bar().contains(" 0%"), "{}", harness.status_bar());
}

#[test]
fn test_scroll_up_at_top_is_clamped() {
    let mut harness = ViewerTestHarness::new(long_page(500), 80, 24);
    harness.send_key_repeat(KeyCode::Char('k'), KeyModifiers::NONE, 5);
    assert_eq!(scroll_offset(&harness), 0);
    harness.assert_screen_contains("Section 0");
}

#[test]
fn test_virtualized_scrolling_mounts_new_blocks() {
    let mut harness = ViewerTestHarness::new(long_page(500), 80, 24);
    harness.send_key_repeat(KeyCode::PageDown, KeyModifiers::NONE, 10);
    harness.settle();

    let first = harness
        .viewer()
        .view()
        .borrow()
        .first_visible_block()
        .unwrap();
    assert!(first > 30, "first visible block {first}");
    // Paragraph text only appears in the document pane
    let paragraph = (first + 1..).find(|i| i % 10 != 0).unwrap();
    harness.assert_screen_contains(&format!("paragraph {paragraph} mentions"));
}

#[test]
fn test_virtualized_bottom_shows_last_block() {
    let mut harness = ViewerTestHarness::new(long_page(500), 80, 24);
    harness.send_key(KeyCode::End, KeyModifiers::NONE);
    harness.settle();
    // Estimates shrink as blocks get measured; keep pressing until pinned
    harness.send_key(KeyCode::End, KeyModifiers::NONE);
    harness.settle();

    harness.assert_screen_contains("paragraph 499 mentions");
}

#[test]
fn test_resize_relayouts() {
    let mut harness = ViewerTestHarness::new(long_page(40), 80, 24);
    harness.viewer_mut().resize(60, 30);
    let view = harness.viewer().view().borrow();
    assert_eq!(view.height(), 29);
    assert_eq!(view.width(), 31);
}
