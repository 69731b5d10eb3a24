//! Low-level primitives and utilities
//!
//! This module contains match-range computation, option-flag parsing,
//! and styled text wrapping.

pub mod option_terms;
pub mod ranges;
pub mod wrap;
