//! Top languages ranking bars

use egui::Ui;
use egui_plot::{Bar, BarChart, Plot};
use serde_json::{json, Value};

use gh_core::aggregate::top_languages;
use gh_core::FilterAction;

use crate::charts::colors;
use crate::{DashboardView, DataGeneration, ViewId, ViewerContext};

#[derive(Debug, Clone)]
pub struct LanguageRankingConfig {
    /// How many languages to rank.
    pub top_n: usize,
    pub show_grid: bool,
    pub bar_width: f64,
}

impl Default for LanguageRankingConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            show_grid: true,
            bar_width: 0.7,
        }
    }
}

/// Top-N most used languages over the year-filtered rows. Clicking a bar
/// toggles the shared language filter.
pub struct LanguageRankingView {
    id: ViewId,
    title: String,
    pub config: LanguageRankingConfig,

    cached: Option<(DataGeneration, Vec<(String, usize)>)>,
}

impl LanguageRankingView {
    pub fn new(id: ViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: LanguageRankingConfig::default(),
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
        let ranked = top_languages(rows, generation.filters.year, self.config.top_n);
        self.cached = Some((generation, ranked));
    }
}

impl DashboardView for LanguageRankingView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "LanguageRankingView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        self.refresh(ctx);
        let Some((_, ranked)) = &self.cached else {
            ui.centered_and_justified(|ui| ui.spinner());
            return;
        };
        if ranked.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("No language data");
            });
            return;
        }
        let ranked = ranked.clone();
        let selected = ctx.filters.snapshot().language;

        let names: Vec<String> = ranked.iter().map(|(name, _)| name.clone()).collect();
        let bars: Vec<Bar> = ranked
            .iter()
            .enumerate()
            .map(|(i, (name, count))| {
                let fill = if selected.as_deref() == Some(name.as_str()) {
                    colors::ACCENT
                } else {
                    colors::SERIES
                };
                Bar::new(i as f64, *count as f64)
                    .width(self.config.bar_width)
                    .name(name.clone())
                    .fill(fill)
            })
            .collect();

        let mut clicked_index = None;
        let axis_names = names.clone();
        Plot::new(("language_ranking", self.id))
            .show_grid(self.config.show_grid)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_boxed_zoom(false)
            .show_x(false)
            .x_axis_formatter(move |val, _range, _specs| {
                let i = val.round() as i64;
                if (val - i as f64).abs() > 0.2 {
                    return String::new();
                }
                axis_names
                    .get(usize::try_from(i).unwrap_or(usize::MAX))
                    .cloned()
                    .unwrap_or_default()
            })
            .label_formatter(|name, value| {
                if name.is_empty() {
                    String::new()
                } else {
                    format!("{name}: {:.0} users", value.y)
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
                if plot_ui.response().clicked() {
                    if let Some(coord) = plot_ui.pointer_coordinate() {
                        let i = coord.x.round();
                        if (coord.x - i).abs() <= 0.5 && i >= 0.0 {
                            clicked_index = Some(i as usize);
                        }
                    }
                }
            });

        if let Some(index) = clicked_index {
            if let Some(name) = names.get(index) {
                let action = if selected.as_deref() == Some(name.as_str()) {
                    FilterAction::ClearLanguage
                } else {
                    FilterAction::SelectLanguage(name.clone())
                };
                ctx.filters.dispatch(action);
            }
        }
    }

    fn save_config(&self) -> Value {
        json!({
            "top_n": self.config.top_n,
            "show_grid": self.config.show_grid,
            "bar_width": self.config.bar_width,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(v) = config.get("top_n").and_then(|v| v.as_u64()) {
            self.config.top_n = v as usize;
        }
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
