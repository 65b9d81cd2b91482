//! Chart views for the dashboard - dockable, cross-filtering egui panels

pub mod charts;
pub mod viewport;

use std::sync::Arc;

use egui::Ui;
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use gh_core::{FetchState, FilterState, FilterStore};
use gh_data::WorldAtlas;

pub use charts::{
    AdoptionTrendView, CountryMapView, GrowthLineView, HireableBarView, LanguageDonutView,
    LanguageRankingView, RepoHistogramView, TopicCloudView,
};
pub use viewport::Viewport;

/// Unique identifier for a dashboard view
pub type ViewId = Uuid;

/// Shared state every view draws from.
pub struct ViewerContext {
    /// The dataset, or the loading/error state preceding it.
    pub dataset: Arc<RwLock<FetchState>>,
    /// The shared (country, year, language) selection.
    pub filters: Arc<FilterStore>,
    /// Country outlines, present once the atlas fetch completes.
    pub atlas: Arc<RwLock<Option<WorldAtlas>>>,
}

impl ViewerContext {
    /// Cache key for derived chart data: changes whenever the dataset is
    /// swapped (Arc identity) or the selection moves.
    pub fn data_generation(&self) -> DataGeneration {
        let generation = match &*self.dataset.read() {
            FetchState::Ready(rows) => Arc::as_ptr(rows) as usize,
            _ => 0,
        };
        DataGeneration {
            generation,
            filters: self.filters.snapshot(),
        }
    }
}

/// Identity of one (dataset, selection) configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DataGeneration {
    generation: usize,
    pub filters: FilterState,
}

/// Base trait for all dashboard views
pub trait DashboardView: Send + Sync {
    /// Get the unique ID of this view
    fn id(&self) -> ViewId;

    /// Get the display name
    fn display_name(&self) -> &str;

    /// Get the view type (for serialization)
    fn view_type(&self) -> &str;

    /// Draw the UI
    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui);

    /// Save configuration
    fn save_config(&self) -> Value;

    /// Load configuration
    fn load_config(&mut self, config: Value);

    /// Convert to Any for downcasting
    fn as_any(&self) -> &dyn std::any::Any;
}
