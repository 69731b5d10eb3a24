//! Supporting services: bounded retry and logging setup

pub mod retry;
#[cfg(feature = "runtime")]
pub mod tracing_setup;
