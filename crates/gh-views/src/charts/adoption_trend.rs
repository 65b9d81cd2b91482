//! Per-year language adoption rate line

use egui::Ui;
use egui_plot::{Line, Plot, PlotPoints};
use serde_json::{json, Value};

use gh_core::aggregate::{adoption_series, AdoptionSeries};

use crate::charts::colors;
use crate::{DashboardView, DataGeneration, ViewId, ViewerContext};

#[derive(Debug, Clone)]
pub struct AdoptionTrendConfig {
    pub show_grid: bool,
    pub line_width: f32,
}

impl Default for AdoptionTrendConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            line_width: 2.0,
        }
    }
}

/// Share of accounts created each year whose most used language is the
/// selected one, defaulting to the overall most frequent language when
/// nothing is selected. Display only.
pub struct AdoptionTrendView {
    id: ViewId,
    title: String,
    pub config: AdoptionTrendConfig,

    cached: Option<(DataGeneration, Option<AdoptionSeries>)>,
}

impl AdoptionTrendView {
    pub fn new(id: ViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: AdoptionTrendConfig::default(),
            cached: None,
        }
    }

    fn refresh(&mut self, ctx: &ViewerContext) {
        let generation = ctx.data_generation();
        if matches!(&self.cached, Some((g, _)) if *g == generation) {
            return;
        }
        let dataset = ctx.dataset.read();
        let Some(rows) = dataset.rows() else {
            return;
        };
        let series = adoption_series(rows, generation.filters.language.as_deref());
        self.cached = Some((generation, series));
    }
}

impl DashboardView for AdoptionTrendView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "AdoptionTrendView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        self.refresh(ctx);
        let Some((_, series)) = &self.cached else {
            ui.centered_and_justified(|ui| ui.spinner());
            return;
        };
        let Some(series) = series else {
            ui.centered_and_justified(|ui| {
                ui.label("No language data");
            });
            return;
        };

        ui.label(format!("Adoption of {}", series.language));

        let points: PlotPoints = series
            .points
            .iter()
            .map(|&(year, rate)| [year as f64, rate])
            .collect();
        let name = series.language.clone();

        Plot::new(("adoption_trend", self.id))
            .show_grid(self.config.show_grid)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_boxed_zoom(false)
            .include_y(0.0)
            .include_y(1.0)
            .x_axis_formatter(|val, _range, _specs| format!("{:.0}", val))
            .y_axis_formatter(|val, _range, _specs| format!("{:.0}%", val * 100.0))
            .label_formatter(move |_, value| {
                format!("{name} in {:.0}: {:.1}%", value.x, value.y * 100.0)
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(points)
                        .color(colors::SERIES_ALT)
                        .width(self.config.line_width),
                );
            });
    }

    fn save_config(&self) -> Value {
        json!({
            "show_grid": self.config.show_grid,
            "line_width": self.config.line_width,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(v) = config.get("show_grid").and_then(|v| v.as_bool()) {
            self.config.show_grid = v;
        }
        if let Some(v) = config.get("line_width").and_then(|v| v.as_f64()) {
            self.config.line_width = v as f32;
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
