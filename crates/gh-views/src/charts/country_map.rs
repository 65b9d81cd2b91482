//! Choropleth world map of users per country

use egui::{Align2, Color32, FontId, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui};
use indexmap::IndexMap;
use serde_json::{json, Value};

use gh_core::aggregate::{map_display_name, map_join_name, users_by_country};
use gh_core::{FilterAction, Row};

use crate::charts::colors;
use crate::{DashboardView, DataGeneration, ViewId, ViewerContext};

/// Choropleth configuration
#[derive(Debug, Clone)]
pub struct CountryMapConfig {
    pub show_legend: bool,
}

impl Default for CountryMapConfig {
    fn default() -> Self {
        Self { show_legend: true }
    }
}

/// World map view. Fill intensity encodes users per country; clicking a
/// country toggles the shared country filter.
pub struct CountryMapView {
    id: ViewId,
    title: String,
    pub config: CountryMapConfig,

    cached: Option<CachedCounts>,
}

struct CachedCounts {
    generation: DataGeneration,
    counts: IndexMap<String, usize>,
    max: usize,
}

impl CountryMapView {
    pub fn new(id: ViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: CountryMapConfig::default(),
            cached: None,
        }
    }

    fn refresh(&mut self, ctx: &ViewerContext) {
        let generation = ctx.data_generation();
        if matches!(&self.cached, Some(c) if c.generation == generation) {
            return;
        }
        let dataset = ctx.dataset.read();
        let Some(rows) = dataset.rows() else {
            return;
        };
        // The map reacts to the year filter only; country is what it sets.
        let counts = Self::atlas_keyed_counts(rows, generation.filters.year);
        let max = counts.values().copied().max().unwrap_or(0);
        tracing::debug!(countries = counts.len(), max, "recomputed country counts");
        self.cached = Some(CachedCounts {
            generation,
            counts,
            max,
        });
    }

    /// Per-country counts pushed to the atlas spelling, so shape fills can
    /// look up geometry names directly. The translation happens only here
    /// at the join; clicks go back through [`map_display_name`].
    fn atlas_keyed_counts(rows: &[Row], year: Option<i32>) -> IndexMap<String, usize> {
        users_by_country(rows, year)
            .into_iter()
            .map(|(name, count)| (map_join_name(&name).to_string(), count))
            .collect()
    }

    fn project(lon: f64, lat: f64, rect: &Rect) -> Pos2 {
        // Equirectangular, the whole world fitted to the rect.
        let x = (lon + 180.0) / 360.0;
        let y = (90.0 - lat) / 180.0;
        Pos2::new(
            rect.left() + x as f32 * rect.width(),
            rect.top() + y as f32 * rect.height(),
        )
    }

    fn unproject(pos: Pos2, rect: &Rect) -> (f64, f64) {
        let x = ((pos.x - rect.left()) / rect.width()) as f64;
        let y = ((pos.y - rect.top()) / rect.height()) as f64;
        (x * 360.0 - 180.0, 90.0 - y * 180.0)
    }

    fn draw_legend(&self, ui: &Ui, rect: Rect, max: usize) {
        let painter = ui.painter_at(rect);
        let legend = Rect::from_min_size(
            rect.left_bottom() + egui::vec2(8.0, -24.0),
            egui::vec2(120.0, 10.0),
        );
        let steps = 24;
        for i in 0..steps {
            let t0 = i as f32 / steps as f32;
            let t1 = (i + 1) as f32 / steps as f32;
            let seg = Rect::from_min_max(
                Pos2::new(legend.left() + t0 * legend.width(), legend.top()),
                Pos2::new(legend.left() + t1 * legend.width(), legend.bottom()),
            );
            painter.rect_filled(seg, Rounding::ZERO, colors::blues(t0));
        }
        painter.text(
            legend.left_top() - egui::vec2(0.0, 4.0),
            Align2::LEFT_BOTTOM,
            format!("0 .. {max} users"),
            FontId::proportional(10.0),
            ui.visuals().weak_text_color(),
        );
    }
}

impl DashboardView for CountryMapView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "CountryMapView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        self.refresh(ctx);
        let Some(cached) = &self.cached else {
            ui.centered_and_justified(|ui| ui.spinner());
            return;
        };
        let atlas_guard = ctx.atlas.read();
        let Some(atlas) = atlas_guard.as_ref() else {
            ui.centered_and_justified(|ui| {
                ui.label("Loading world atlas...");
            });
            return;
        };

        let selected = ctx.filters.snapshot().country;

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, Rounding::ZERO, Color32::from_rgb(0x14, 0x14, 0x18));

        for shape in &atlas.countries {
            let count = cached.counts.get(&shape.name).copied().unwrap_or(0);
            let fill = if count == 0 || cached.max == 0 {
                colors::MAP_EMPTY
            } else {
                colors::blues(count as f32 / cached.max as f32)
            };
            let is_selected = selected.as_deref().map(map_join_name) == Some(shape.name.as_str());
            let stroke = if is_selected {
                Stroke::new(1.5, colors::ACCENT)
            } else {
                Stroke::new(0.5, Color32::from_gray(70))
            };

            for ring in shape.rings() {
                let points: Vec<Pos2> = ring
                    .iter()
                    .map(|&(lon, lat)| Self::project(lon, lat, &rect))
                    .collect();
                if points.len() < 3 {
                    continue;
                }
                painter.add(Shape::convex_polygon(points.clone(), fill, Stroke::NONE));
                painter.add(Shape::closed_line(points, stroke));
            }
        }

        if let Some(pos) = response.hover_pos() {
            let (lon, lat) = Self::unproject(pos, &rect);
            if let Some(name) = atlas.locate(lon, lat) {
                let dataset_name = map_display_name(name);
                let count = cached.counts.get(name).copied().unwrap_or(0);
                egui::show_tooltip_at_pointer(
                    ui.ctx(),
                    egui::Id::new((self.id, "map_tooltip")),
                    |ui| {
                        ui.label(format!("{dataset_name}: {count} users"));
                    },
                );
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let (lon, lat) = Self::unproject(pos, &rect);
                if let Some(name) = atlas.locate(lon, lat) {
                    let dataset_name = map_display_name(name);
                    let action = if selected.as_deref() == Some(dataset_name) {
                        FilterAction::ClearCountry
                    } else {
                        FilterAction::SelectCountry(dataset_name.to_string())
                    };
                    ctx.filters.dispatch(action);
                }
            }
        }

        if self.config.show_legend {
            self.draw_legend(ui, rect, cached.max);
        }
    }

    fn save_config(&self) -> Value {
        json!({
            "show_legend": self.config.show_legend,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(v) = config.get("show_legend").and_then(|v| v.as_bool()) {
            self.config.show_legend = v;
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(country: &str, created: &str) -> Row {
        serde_json::from_value(json!({
            "Country": country,
            "Account Created At": created,
        }))
        .unwrap()
    }

    #[test]
    fn counts_are_keyed_by_atlas_spelling() {
        let rows = vec![
            row("United States", "2020-01-01"),
            row("United States", "2021-01-01"),
            row("France", "2020-01-01"),
        ];
        let counts = CountryMapView::atlas_keyed_counts(&rows, None);

        // The dataset spelling is translated at the join; geometry lookups
        // hit the atlas name directly.
        assert_eq!(counts.get("United States of America"), Some(&2));
        assert_eq!(counts.get("United States"), None);
        assert_eq!(counts.get("France"), Some(&1));

        // A click on the shape round-trips back to the dataset spelling.
        assert_eq!(map_display_name("United States of America"), "United States");
    }

    #[test]
    fn atlas_keyed_counts_respect_year_filter() {
        let rows = vec![
            row("United States", "2020-01-01"),
            row("United States", "2021-01-01"),
        ];
        let counts = CountryMapView::atlas_keyed_counts(&rows, Some(2020));
        assert_eq!(counts.get("United States of America"), Some(&1));
    }
}
