//! Main application entry point

use std::sync::Arc;

use anyhow::Result;
use eframe::egui::{self, Context};
use parking_lot::RwLock;
use tracing::{error, info};

use gh_core::events::{events, handler_from_fn, EventBus};
use gh_core::{FetchState, FilterStore};
use gh_data::{ApiConfig, DatasetCache, ProfileApiClient, WorldAtlas};
use gh_ui::Theme;
use gh_views::{
    AdoptionTrendView, CountryMapView, DashboardView, GrowthLineView, HireableBarView,
    LanguageDonutView, LanguageRankingView, RepoHistogramView, TopicCloudView, Viewport,
    ViewerContext,
};

/// Main application state
struct DashboardApp {
    /// The viewport managing all docked charts
    viewport: Viewport,

    /// Viewer context shared between all charts
    viewer_context: Arc<ViewerContext>,

    /// Cache in front of the profile API, shared with the fetch tasks
    dataset_cache: Option<Arc<DatasetCache<ProfileApiClient>>>,

    config: ApiConfig,

    event_bus: Arc<EventBus>,

    /// Tokio runtime driving the fetch tasks
    runtime: tokio::runtime::Runtime,

    /// Egui context, for repaints from async tasks
    egui_ctx: egui::Context,
}

impl DashboardApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Result<Self> {
        gh_ui::apply_theme(&cc.egui_ctx, &Theme::default());

        let runtime = tokio::runtime::Runtime::new()?;
        let config = ApiConfig::from_env();

        let event_bus = Arc::new(EventBus::new());
        event_bus.subscribe::<events::DatasetLoaded>(handler_from_fn(|event| {
            if let Some(loaded) = event.as_any().downcast_ref::<events::DatasetLoaded>() {
                info!(rows = loaded.row_count, "dataset ready");
            }
        }));
        event_bus.subscribe::<events::DatasetError>(handler_from_fn(|event| {
            if let Some(failed) = event.as_any().downcast_ref::<events::DatasetError>() {
                error!(error = %failed.error, "dataset load failed");
            }
        }));
        event_bus.subscribe::<events::FilterChanged>(handler_from_fn(|event| {
            if let Some(changed) = event.as_any().downcast_ref::<events::FilterChanged>() {
                info!(filters = ?changed.filters, "selection changed");
            }
        }));

        let viewer_context = Arc::new(ViewerContext {
            dataset: Arc::new(RwLock::new(FetchState::Pending)),
            filters: Arc::new(FilterStore::new(event_bus.clone())),
            atlas: Arc::new(RwLock::new(None)),
        });

        let dataset_cache = match ProfileApiClient::new(&config) {
            Ok(client) => Some(Arc::new(DatasetCache::new(client))),
            Err(e) => {
                *viewer_context.dataset.write() = FetchState::Failed(e.to_string());
                None
            }
        };

        let mut viewport = Viewport::new();
        viewport.create_grid_layout(build_charts());

        let app = Self {
            viewport,
            viewer_context,
            dataset_cache,
            config,
            event_bus,
            runtime,
            egui_ctx: cc.egui_ctx.clone(),
        };
        app.spawn_dataset_fetch();
        app.spawn_atlas_fetch();
        Ok(app)
    }

    /// Load the dataset in the background, then wake the UI.
    fn spawn_dataset_fetch(&self) {
        let Some(cache) = self.dataset_cache.clone() else {
            return;
        };
        let dataset = self.viewer_context.dataset.clone();
        let event_bus = self.event_bus.clone();
        let egui_ctx = self.egui_ctx.clone();

        *dataset.write() = FetchState::Pending;
        self.runtime.spawn(async move {
            match cache.get_or_fetch().await {
                Ok(rows) => {
                    let row_count = rows.len();
                    *dataset.write() = FetchState::Ready(rows);
                    event_bus.publish(events::DatasetLoaded { row_count });
                }
                Err(e) => {
                    *dataset.write() = FetchState::Failed(e.to_string());
                    event_bus.publish(events::DatasetError {
                        error: e.to_string(),
                    });
                }
            }
            egui_ctx.request_repaint();
        });
    }

    /// Load the country outlines; the map shows a placeholder until done.
    fn spawn_atlas_fetch(&self) {
        let atlas = self.viewer_context.atlas.clone();
        let config = self.config.clone();
        let egui_ctx = self.egui_ctx.clone();

        self.runtime.spawn(async move {
            match WorldAtlas::fetch(&config).await {
                Ok(loaded) => {
                    *atlas.write() = Some(loaded);
                    egui_ctx.request_repaint();
                }
                Err(e) => {
                    // The rest of the dashboard works without the map.
                    error!(error = %e, "world atlas load failed");
                }
            }
        });
    }

    fn show_header(&self, ctx: &Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading("GitHub Users Dashboard");
                ui.separator();
                gh_ui::filter_bar(ui, &self.viewer_context.filters);
            });

            let dataset = self.viewer_context.dataset.read();
            if let Some(rows) = dataset.rows() {
                let filters = self.viewer_context.filters.snapshot();
                let total = gh_core::aggregate::total_users(rows, &filters);
                ui.horizontal(|ui| {
                    gh_ui::user_count_card(ui, total, &filters);
                    gh_ui::arc_progress_card(ui, total, rows.len());
                });
            }
            ui.add_space(4.0);
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.show_header(ctx);

        // Snapshot the fetch phase first so the dataset lock is not held
        // while the charts draw (they take it themselves).
        enum Phase {
            Pending,
            Failed(String),
            Ready,
        }
        let phase = match &*self.viewer_context.dataset.read() {
            FetchState::Pending => Phase::Pending,
            FetchState::Failed(e) => Phase::Failed(e.clone()),
            FetchState::Ready(_) => Phase::Ready,
        };

        egui::CentralPanel::default().show(ctx, |ui| match phase {
            Phase::Pending => {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.spinner();
                        ui.label("Loading profile data...");
                    });
                });
            }
            Phase::Failed(message) => {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.colored_label(egui::Color32::LIGHT_RED, "Failed to load data");
                        ui.label(message);
                        if ui.button("Retry").clicked() {
                            self.spawn_dataset_fetch();
                        }
                    });
                });
            }
            Phase::Ready => {
                self.viewport.ui(ui, &self.viewer_context);
            }
        });
    }
}

/// The eight charts, in grid order.
fn build_charts() -> Vec<Box<dyn DashboardView>> {
    let id = uuid::Uuid::new_v4;
    vec![
        Box::new(CountryMapView::new(id(), "Users by Country".to_string())),
        Box::new(LanguageDonutView::new(id(), "Language Share".to_string())),
        Box::new(GrowthLineView::new(id(), "User Growth".to_string())),
        Box::new(HireableBarView::new(id(), "Hireable".to_string())),
        Box::new(RepoHistogramView::new(id(), "Repository Counts".to_string())),
        Box::new(LanguageRankingView::new(id(), "Top Languages".to_string())),
        Box::new(AdoptionTrendView::new(id(), "Language Adoption".to_string())),
        Box::new(TopicCloudView::new(id(), "Topics".to_string())),
    ]
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting GitHub Users Dashboard");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([800.0, 600.0]),
        default_theme: eframe::Theme::Dark,
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "GitHub Users Dashboard",
        options,
        Box::new(|cc| match DashboardApp::new(cc) {
            Ok(app) => Box::new(app),
            Err(e) => {
                error!(error = %e, "failed to initialize");
                std::process::exit(1);
            }
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
