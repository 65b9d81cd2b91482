//! Cumulative user growth line

use egui::Ui;
use egui_plot::{Line, MarkerShape, Plot, PlotPoints, Points};
use serde_json::{json, Value};

use gh_core::aggregate::cumulative_users_by_year;
use gh_core::FilterAction;

use crate::charts::colors;
use crate::{DashboardView, DataGeneration, ViewId, ViewerContext};

#[derive(Debug, Clone)]
pub struct GrowthLineConfig {
    pub show_grid: bool,
    pub line_width: f32,
}

impl Default for GrowthLineConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            line_width: 2.0,
        }
    }
}

/// Cumulative count of accounts created up to each year, over the whole
/// dataset. Clicking near a point toggles the shared year filter.
pub struct GrowthLineView {
    id: ViewId,
    title: String,
    pub config: GrowthLineConfig,

    cached: Option<(DataGeneration, Vec<(i32, usize)>)>,
}

impl GrowthLineView {
    pub fn new(id: ViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: GrowthLineConfig::default(),
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
        // Growth is an all-dataset series; filters pick a point, they do
        // not reshape the curve.
        self.cached = Some((generation, cumulative_users_by_year(rows)));
    }

    fn nearest_year(series: &[(i32, usize)], x: f64) -> Option<i32> {
        series
            .iter()
            .min_by(|a, b| {
                let da = (a.0 as f64 - x).abs();
                let db = (b.0 as f64 - x).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(year, _)| *year)
    }
}

impl DashboardView for GrowthLineView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "GrowthLineView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        self.refresh(ctx);
        let Some((_, series)) = &self.cached else {
            ui.centered_and_justified(|ui| ui.spinner());
            return;
        };
        if series.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("No account creation dates");
            });
            return;
        }
        let series = series.clone();
        let selected_year = ctx.filters.snapshot().year;

        let line_points: PlotPoints = series
            .iter()
            .map(|&(year, count)| [year as f64, count as f64])
            .collect();

        let mut clicked_year = None;
        Plot::new(("growth_line", self.id))
            .show_grid(self.config.show_grid)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_boxed_zoom(false)
            .x_axis_formatter(|val, _range, _specs| format!("{:.0}", val))
            .label_formatter(|name, value| {
                if name.is_empty() {
                    format!("{:.0}: {:.0} users", value.x, value.y)
                } else {
                    format!("{name}: {:.0}", value.y)
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(line_points)
                        .color(colors::SERIES)
                        .width(self.config.line_width)
                        .name("Users"),
                );
                // Emphasize the selected year's point.
                if let Some(year) = selected_year {
                    if let Some(&(_, count)) = series.iter().find(|(y, _)| *y == year) {
                        plot_ui.points(
                            Points::new(vec![[year as f64, count as f64]])
                                .shape(MarkerShape::Circle)
                                .radius(5.0)
                                .color(colors::ACCENT),
                        );
                    }
                }
                if plot_ui.response().clicked() {
                    if let Some(coord) = plot_ui.pointer_coordinate() {
                        clicked_year = Self::nearest_year(&series, coord.x);
                    }
                }
            });

        if let Some(year) = clicked_year {
            let action = if selected_year == Some(year) {
                FilterAction::ClearYear
            } else {
                FilterAction::SelectYear(year)
            };
            ctx.filters.dispatch(action);
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_year_picks_closest_point() {
        let series = vec![(2019, 1), (2020, 3), (2022, 7)];
        assert_eq!(GrowthLineView::nearest_year(&series, 2019.9), Some(2020));
        assert_eq!(GrowthLineView::nearest_year(&series, 2021.2), Some(2022));
        assert_eq!(GrowthLineView::nearest_year(&[], 2020.0), None);
    }
}
