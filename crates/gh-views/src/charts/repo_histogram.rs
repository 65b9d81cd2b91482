//! Repository count histogram with fixed bins

use egui::Ui;
use egui_plot::{Bar, BarChart, Plot};
use serde_json::{json, Value};

use gh_core::aggregate::{repo_count_histogram, RepoBin};

use crate::charts::colors;
use crate::{DashboardView, DataGeneration, ViewId, ViewerContext};

#[derive(Debug, Clone)]
pub struct RepoHistogramConfig {
    pub show_grid: bool,
    pub bar_width: f64,
}

impl Default for RepoHistogramConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            bar_width: 0.8,
        }
    }
}

/// Distribution of repository counts over the language-filtered rows,
/// using the fixed 1-30 bin ladder. Display only.
pub struct RepoHistogramView {
    id: ViewId,
    title: String,
    pub config: RepoHistogramConfig,

    cached: Option<(DataGeneration, Vec<RepoBin>)>,
}

impl RepoHistogramView {
    pub fn new(id: ViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: RepoHistogramConfig::default(),
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
        let bins = repo_count_histogram(rows, generation.filters.language.as_deref());
        self.cached = Some((generation, bins));
    }
}

impl DashboardView for RepoHistogramView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "RepoHistogramView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        self.refresh(ctx);
        let Some((_, bins)) = &self.cached else {
            ui.centered_and_justified(|ui| ui.spinner());
            return;
        };

        let labels: Vec<String> = bins.iter().map(|b| b.label()).collect();
        let bars: Vec<Bar> = bins
            .iter()
            .enumerate()
            .map(|(i, bin)| {
                Bar::new(i as f64, bin.count as f64)
                    .width(self.config.bar_width)
                    .name(bin.label())
                    .fill(colors::SERIES)
            })
            .collect();

        // Horizontal bars: one row per bin, count along the x axis.
        Plot::new(("repo_histogram", self.id))
            .show_grid(self.config.show_grid)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_boxed_zoom(false)
            .show_y(false)
            .y_axis_formatter(move |val, _range, _specs| {
                let i = val.round() as i64;
                if (val - i as f64).abs() > 0.2 {
                    return String::new();
                }
                labels
                    .get(usize::try_from(i).unwrap_or(usize::MAX))
                    .cloned()
                    .unwrap_or_default()
            })
            .label_formatter(|name, value| {
                if name.is_empty() {
                    String::new()
                } else {
                    format!("{name} repos: {:.0} users", value.x)
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal());
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
