//! Core functionality for the GitHub users dashboard
//!
//! This crate provides the data model, the shared filter state,
//! and the pure aggregation layer every chart derives its dataset from.

pub mod aggregate;
pub mod events;
pub mod model;
pub mod selection;

// Re-export commonly used types
pub use model::{parse_topics, Dataset, FetchState, Row};
pub use selection::{reduce, FilterAction, FilterState, FilterStore};
