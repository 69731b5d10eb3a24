use crate::common::fixtures::{long_page, options_page};
use crate::common::harness::ViewerTestHarness;
use crate::e2e::count_option_cells;
use crossterm::event::{KeyCode, KeyModifiers};

/// A heading far outside the mounted window still lands at the viewport top
#[test]
fn test_jump_to_unmounted_heading_when_virtualized() {
    let mut harness = ViewerTestHarness::new(long_page(500), 80, 24);
    harness.viewer_mut().jump_to_anchor("h-300");
    harness.settle();

    {
        let view = harness.viewer().view().borrow();
        assert_eq!(view.first_visible_block(), Some(300));
        assert_eq!(Some(view.scroll_offset()), view.anchor_row("h-300"));
    }
    assert!(harness.get_row_text(0).contains("Section 300"));
    assert_eq!(harness.viewer().active_heading(), Some("h-300"));
}

#[test]
fn test_jump_when_not_virtualized() {
    let mut harness = ViewerTestHarness::new(long_page(40), 80, 24);
    harness.viewer_mut().jump_to_anchor("h-20");
    harness.settle();

    let view = harness.viewer().view().borrow();
    assert_eq!(view.first_visible_block(), Some(20));
    drop(view);
    assert_eq!(harness.viewer().active_heading(), Some("h-20"));
}

#[test]
fn test_unknown_anchor_gives_up_quietly() {
    let mut harness = ViewerTestHarness::new(long_page(500), 80, 24);
    harness.viewer_mut().jump_to_anchor("no-such-anchor");
    harness.settle();

    assert_eq!(harness.viewer().view().borrow().scroll_offset(), 0);
    harness.assert_screen_contains("Section 0");
}

#[test]
fn test_later_jump_wins() {
    let mut harness = ViewerTestHarness::new(long_page(500), 80, 24);
    harness.viewer_mut().jump_to_anchor("h-100");
    harness.viewer_mut().jump_to_anchor("h-400");
    harness.settle();

    assert_eq!(
        harness.viewer().view().borrow().first_visible_block(),
        Some(400)
    );
}

#[test]
fn test_option_focus_follows_jump_target() {
    let mut harness = ViewerTestHarness::new(options_page(), 80, 24);
    assert_eq!(count_option_cells(&harness), 0);

    harness.viewer_mut().jump_to_anchor("opt-color");
    harness.settle();
    let color_cells = count_option_cells(&harness);
    // "--color" in the term
    assert!(color_cells >= "--color".len(), "{color_cells}");

    // Jumping to a heading drops the option highlight
    harness.viewer_mut().jump_to_anchor("see-also");
    harness.settle();
    assert_eq!(count_option_cells(&harness), 0);

    harness.viewer_mut().jump_to_anchor("opt-recursive");
    harness.settle();
    assert!(count_option_cells(&harness) > 0);
    harness.send_key(KeyCode::Esc, KeyModifiers::NONE);
    assert_eq!(count_option_cells(&harness), 0);
}
