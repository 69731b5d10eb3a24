pub mod anchors;
pub mod document;
pub mod load;
pub mod text;
