use crate::common::fixtures::{long_page, options_page};
use crate::common::harness::ViewerTestHarness;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::style::Color;

fn has_current_match_cell(harness: &ViewerTestHarness) -> bool {
    let area = harness.buffer().area;
    (0..area.height).any(|y| {
        (0..area.width).any(|x| harness.get_cell_style(x, y).bg == Some(Color::LightRed))
    })
}

#[test]
fn test_find_shows_searching_state_before_counts() {
    let mut harness = ViewerTestHarness::new(long_page(500), 80, 24);
    harness.send_key(KeyCode::Char('/'), KeyModifiers::NONE);
    harness.type_text("tar");

    assert!(harness.status_bar().contains("searching…"), "{}", harness.status_bar());
    harness.assert_screen_contains("/tar");

    harness.frame();
    assert!(harness.status_bar().contains("1/450"), "{}", harness.status_bar());
}

#[test]
fn test_find_navigation_wraps() {
    let mut harness = ViewerTestHarness::new(long_page(500), 80, 24);
    harness.search("tar");
    assert!(harness.status_bar().contains("1/450"));

    harness.send_key(KeyCode::Char('n'), KeyModifiers::NONE);
    assert!(harness.status_bar().contains("2/450"), "{}", harness.status_bar());

    harness.send_key(KeyCode::Char('N'), KeyModifiers::SHIFT);
    harness.send_key(KeyCode::Char('N'), KeyModifiers::SHIFT);
    harness.settle();
    assert!(harness.status_bar().contains("450/450"), "{}", harness.status_bar());

    // The last match is in the last block; it must have been scrolled to
    harness.assert_screen_contains("paragraph 499 mentions");
    assert!(has_current_match_cell(&harness));

    harness.send_key(KeyCode::Char('n'), KeyModifiers::NONE);
    harness.settle();
    assert!(harness.status_bar().contains("1/450"), "{}", harness.status_bar());
    harness.assert_screen_contains("paragraph 1 mentions");
}

#[test]
fn test_find_starts_from_viewport() {
    let mut harness = ViewerTestHarness::new(long_page(500), 80, 24);
    harness.viewer_mut().jump_to_anchor("h-200");
    harness.settle();

    harness.search("tar");
    // Blocks 0..200 hold 180 paragraphs; the next match is in block 201
    assert!(harness.status_bar().contains("181/450"), "{}", harness.status_bar());
    assert!(has_current_match_cell(&harness));
}

#[test]
fn test_find_is_case_insensitive() {
    let mut harness = ViewerTestHarness::new(long_page(40), 80, 24);
    harness.search("SECTION");
    assert!(harness.status_bar().contains("1/4"), "{}", harness.status_bar());
}

#[test]
fn test_find_no_matches() {
    let mut harness = ViewerTestHarness::new(options_page(), 80, 24);
    harness.search("zzzz");
    assert!(harness.status_bar().contains("no matches"), "{}", harness.status_bar());
    assert!(!has_current_match_cell(&harness));
}

#[test]
fn test_short_query_is_inactive() {
    let mut harness = ViewerTestHarness::new(options_page(), 80, 24);
    harness.search("g");
    let status = harness.status_bar();
    assert!(!status.contains("matches") && !status.contains("searching"), "{status}");
}

#[test]
fn test_escape_clears_find() {
    let mut harness = ViewerTestHarness::new(long_page(40), 80, 24);
    harness.search("tar");
    assert!(has_current_match_cell(&harness));

    harness.send_key(KeyCode::Esc, KeyModifiers::NONE);
    assert!(!has_current_match_cell(&harness));
    assert!(!harness.status_bar().contains("/36"));
}

#[test]
fn test_backspace_edits_query() {
    let mut harness = ViewerTestHarness::new(options_page(), 80, 24);
    harness.send_key(KeyCode::Char('/'), KeyModifiers::NONE);
    harness.type_text("grepx");
    harness.send_key(KeyCode::Backspace, KeyModifiers::NONE);
    harness.send_key(KeyCode::Enter, KeyModifiers::NONE);
    harness.settle();

    assert_eq!(harness.viewer().find().raw_query(), "grep");
    // NAME paragraph and the synopsis code block
    assert!(harness.status_bar().contains("/2"), "{}", harness.status_bar());
}
