//! Hireable vs non-hireable bar chart

use egui::Ui;
use egui_plot::{Bar, BarChart, Plot};
use serde_json::{json, Value};

use gh_core::aggregate::{filter_by_country, hireable_counts, HireableCounts};

use crate::charts::colors;
use crate::{DashboardView, DataGeneration, ViewId, ViewerContext};

#[derive(Debug, Clone)]
pub struct HireableBarConfig {
    pub show_grid: bool,
    pub bar_width: f64,
}

impl Default for HireableBarConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            bar_width: 0.6,
        }
    }
}

/// Two-bar hireability split over the country-filtered rows. Display only;
/// hireability is not a shared filter dimension.
pub struct HireableBarView {
    id: ViewId,
    title: String,
    pub config: HireableBarConfig,

    cached: Option<(DataGeneration, HireableCounts)>,
}

impl HireableBarView {
    pub fn new(id: ViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: HireableBarConfig::default(),
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
        let counts = hireable_counts(filter_by_country(
            rows,
            generation.filters.country.as_deref(),
        ));
        self.cached = Some((generation, counts));
    }
}

impl DashboardView for HireableBarView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "HireableBarView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        self.refresh(ctx);
        let Some((_, counts)) = &self.cached else {
            ui.centered_and_justified(|ui| ui.spinner());
            return;
        };

        let bars = vec![
            Bar::new(0.0, counts.hireable as f64)
                .width(self.config.bar_width)
                .name("Hireable")
                .fill(colors::SERIES_ALT),
            Bar::new(1.0, counts.non_hireable as f64)
                .width(self.config.bar_width)
                .name("Not hireable")
                .fill(colors::SERIES),
        ];

        Plot::new(("hireable_bar", self.id))
            .show_grid(self.config.show_grid)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_boxed_zoom(false)
            .show_x(false)
            .x_axis_formatter(|val, _max_chars, _range| match val as i64 {
                0 => "Hireable".to_string(),
                1 => "Not hireable".to_string(),
                _ => String::new(),
            })
            .label_formatter(|name, value| {
                if name.is_empty() {
                    String::new()
                } else {
                    format!("{name}: {:.0}", value.y)
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    fn save_config(&self) -> Value {
        json!({
            "show_grid": self.config.show_grid,
            "bar_width": self.config.bar_width,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(v) = config.get("show_grid").and_then(|v| v.as_bool()) {
            self.config.show_grid = v;
        }
        if let Some(v) = config.get("bar_width").and_then(|v| v.as_f64()) {
            self.config.bar_width = v;
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
