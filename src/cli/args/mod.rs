//! Shared CLI argument types
//!
//! This module contains reusable argument structs that can be flattened
//! into commands using `#[command(flatten)]`.

mod common;
mod pagination;

pub use common::OutputFormat;
pub use pagination::HistoryArgs;
