pub mod anchors;
pub mod basic;
pub mod find;
pub mod scrolling;
pub mod toc;

use crate::common::harness::ViewerTestHarness;
use ratatui::style::{Color, Modifier};

/// Cells painted with the option-flag highlight
pub fn count_option_cells(harness: &ViewerTestHarness) -> usize {
    let area = harness.buffer().area;
    let mut count = 0;
    for y in 0..area.height {
        for x in 0..area.width {
            let style = harness.get_cell_style(x, y);
            if style.fg == Some(Color::Cyan) && style.add_modifier.contains(Modifier::UNDERLINED) {
                count += 1;
            }
        }
    }
    count
}
