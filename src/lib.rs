// Library crate: the document engine plus, with the `runtime` feature, the
// terminal pager built on it

pub mod config;
pub mod find;
pub mod model;
pub mod primitives;
pub mod services;
pub mod view;

#[cfg(feature = "runtime")]
pub mod app;
