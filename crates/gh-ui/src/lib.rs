//! User interface chrome for the dashboard
//!
//! This crate provides the egui-based chrome around the charts: theming,
//! the active-filter bar, and the summary cards.

pub mod filter_bar;
pub mod summary;
pub mod theme;

pub use filter_bar::filter_bar;
pub use summary::{arc_progress_card, user_count_card};
pub use theme::{apply_theme, Theme};
