use crate::common::fixtures::{long_page, options_page};
use crate::common::harness::ViewerTestHarness;
use crossterm::event::{KeyCode, KeyModifiers};

#[test]
fn test_renders_page_and_status_bar() {
    let harness = ViewerTestHarness::new(options_page(), 80, 24);
    harness.assert_screen_contains("NAME");
    harness.assert_screen_contains("grep - print lines that match patterns");
    harness.assert_screen_contains("grep [OPTION...] PATTERNS [FILE...]");

    let status = harness.status_bar();
    assert!(status.contains("test"), "status: {status}");
    assert!(status.contains('%'), "status: {status}");
}

#[test]
fn test_toc_pane_lists_headings() {
    let harness = ViewerTestHarness::new(options_page(), 80, 24);
    let toc_row = harness.find_row("SYNOPSIS").unwrap();
    // TOC entries are indented by level
    assert!(harness.get_row_text(toc_row).starts_with("  SYNOPSIS"));
    harness.assert_screen_contains("SEE ALSO");
}

#[test]
fn test_toc_hidden_by_config() {
    let mut config = manview::config::ViewerConfig::default();
    config.show_toc = false;
    let harness = ViewerTestHarness::with_config(long_page(40), config, 80, 24);
    assert!(harness.get_row_text(0).starts_with("Section 0"));
}

#[test]
fn test_virtualization_threshold() {
    assert!(ViewerTestHarness::new(long_page(500), 80, 24).viewer().is_virtualized());
    assert!(ViewerTestHarness::new(long_page(100), 80, 24).viewer().is_virtualized());
    assert!(!ViewerTestHarness::new(long_page(99), 80, 24).viewer().is_virtualized());
    assert!(!ViewerTestHarness::new(long_page(40), 80, 24).viewer().is_virtualized());
}

#[test]
fn test_virtualized_view_mounts_only_a_window() {
    let harness = ViewerTestHarness::new(long_page(500), 80, 24);
    let view = harness.viewer().view().borrow();
    let mounted = view.mounted().len();
    assert!(mounted > 0 && mounted < 60, "mounted {mounted} blocks");
    assert_eq!(view.mounted()[0].index, 0);
}

#[test]
fn test_quit_keys() {
    let mut harness = ViewerTestHarness::new(options_page(), 80, 24);
    harness.send_key(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(harness.viewer().should_quit());

    let mut harness = ViewerTestHarness::new(options_page(), 80, 24);
    harness.send_key(KeyCode::Char('q'), KeyModifiers::NONE);
    assert!(harness.viewer().should_quit());
}
