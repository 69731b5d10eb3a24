//! Viewport layer: virtualization, layout, scrolling and active-heading sync

pub mod active;
pub mod document_view;
pub mod estimate;
mod fenwick;
pub mod layout;
pub mod scroll;
pub mod throttle;
pub mod virtualizer;

pub use document_view::{DocumentView, Highlights, CURRENT_MATCH_ANCHOR};
pub use scroll::{ScrollController, ScrollSurface};
pub use virtualizer::{ScrollAlign, ScrollBehavior, ScrollCommand, ScrollToOptions, Virtualizer};
