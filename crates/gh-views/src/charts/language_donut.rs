//! Language share donut with an "Others" drill-down

use std::f32::consts::TAU;

use egui::{Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui};
use indexmap::IndexMap;
use serde_json::{json, Value};

use gh_core::aggregate::{language_breakdown, others_breakdown, LANGUAGE_THRESHOLD, OTHERS_LABEL};
use gh_core::FilterAction;

use crate::charts::colors;
use crate::{DashboardView, DataGeneration, ViewId, ViewerContext};

#[derive(Debug, Clone)]
pub struct LanguageDonutConfig {
    /// Languages with fewer users than this fold into "Others".
    pub threshold: usize,
    pub show_legend: bool,
}

impl Default for LanguageDonutConfig {
    fn default() -> Self {
        Self {
            threshold: LANGUAGE_THRESHOLD,
            show_legend: true,
        }
    }
}

/// Donut of most-used-language share over the country-filtered rows.
/// Clicking a language toggles the shared language filter; clicking
/// "Others" drills into the merged languages instead.
pub struct LanguageDonutView {
    id: ViewId,
    title: String,
    pub config: LanguageDonutConfig,

    cached: Option<(DataGeneration, IndexMap<String, usize>)>,
    /// True while showing the second-level "Others" breakdown.
    drilled_down: bool,
}

struct Wedge {
    label: String,
    count: usize,
    start_angle: f32,
    end_angle: f32,
    color: Color32,
}

impl LanguageDonutView {
    pub fn new(id: ViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: LanguageDonutConfig::default(),
            cached: None,
            drilled_down: false,
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
        let country = generation.filters.country.as_deref();
        let buckets = if self.drilled_down {
            others_breakdown(rows, country, self.config.threshold)
        } else {
            language_breakdown(rows, country, self.config.threshold).buckets
        };
        self.cached = Some((generation, buckets));
    }

    fn wedges(buckets: &IndexMap<String, usize>) -> Vec<Wedge> {
        let total: usize = buckets.values().sum();
        if total == 0 {
            return Vec::new();
        }
        let mut angle = -TAU / 4.0; // start at 12 o'clock
        buckets
            .iter()
            .enumerate()
            .map(|(i, (label, &count))| {
                let sweep = count as f32 / total as f32 * TAU;
                let wedge = Wedge {
                    label: label.clone(),
                    count,
                    start_angle: angle,
                    end_angle: angle + sweep,
                    color: colors::donut_color(i),
                };
                angle += sweep;
                wedge
            })
            .collect()
    }

    /// Wedge under the pointer, if it falls inside the ring.
    fn hit_test<'w>(
        wedges: &'w [Wedge],
        pos: Pos2,
        center: Pos2,
        inner: f32,
        outer: f32,
    ) -> Option<&'w Wedge> {
        let offset = pos - center;
        let distance = offset.length();
        if distance < inner || distance > outer {
            return None;
        }
        let mut angle = offset.y.atan2(offset.x);
        // Normalize into the same [-TAU/4, 3*TAU/4) range the wedges use.
        if angle < -TAU / 4.0 {
            angle += TAU;
        }
        wedges
            .iter()
            .find(|w| angle >= w.start_angle && angle < w.end_angle)
    }
}

impl DashboardView for LanguageDonutView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "LanguageDonutView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        if self.drilled_down && ui.button("< All languages").clicked() {
            self.drilled_down = false;
            self.cached = None;
        }
        self.refresh(ctx);
        let Some((_, buckets)) = &self.cached else {
            ui.centered_and_justified(|ui| ui.spinner());
            return;
        };
        let wedges = Self::wedges(buckets);
        if wedges.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("No language data");
            });
            return;
        }
        let total: usize = buckets.values().sum();
        let selected = ctx.filters.snapshot().language;

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let outer = rect.width().min(rect.height()) * 0.38;
        let inner = outer * 0.55;

        for wedge in &wedges {
            let steps = ((wedge.end_angle - wedge.start_angle) / 0.05).ceil().max(2.0) as usize;
            let mut points = Vec::with_capacity(steps * 2 + 2);
            for i in 0..=steps {
                let a = wedge.start_angle
                    + (wedge.end_angle - wedge.start_angle) * i as f32 / steps as f32;
                points.push(center + egui::vec2(a.cos(), a.sin()) * outer);
            }
            for i in (0..=steps).rev() {
                let a = wedge.start_angle
                    + (wedge.end_angle - wedge.start_angle) * i as f32 / steps as f32;
                points.push(center + egui::vec2(a.cos(), a.sin()) * inner);
            }
            let emphasized = selected.as_deref() == Some(wedge.label.as_str());
            let stroke = if emphasized {
                Stroke::new(2.0, colors::ACCENT)
            } else {
                Stroke::new(1.0, Color32::from_gray(20))
            };
            painter.add(Shape::convex_polygon(points, wedge.color, stroke));
        }

        painter.text(
            center,
            Align2::CENTER_CENTER,
            format!("{total}"),
            FontId::proportional(18.0),
            ui.visuals().strong_text_color(),
        );

        if let Some(pos) = response.hover_pos() {
            if let Some(wedge) = Self::hit_test(&wedges, pos, center, inner, outer) {
                let pct = wedge.count as f32 / total as f32 * 100.0;
                egui::show_tooltip_at_pointer(
                    ui.ctx(),
                    egui::Id::new((self.id, "donut_tooltip")),
                    |ui| {
                        ui.label(format!("{}: {} ({pct:.1}%)", wedge.label, wedge.count));
                    },
                );
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(wedge) = Self::hit_test(&wedges, pos, center, inner, outer) {
                    if wedge.label == OTHERS_LABEL {
                        self.drilled_down = true;
                        self.cached = None;
                    } else if selected.as_deref() == Some(wedge.label.as_str()) {
                        ctx.filters.dispatch(FilterAction::ClearLanguage);
                    } else {
                        ctx.filters
                            .dispatch(FilterAction::SelectLanguage(wedge.label.clone()));
                    }
                }
            }
        }

        if self.config.show_legend {
            let mut cursor = rect.left_top() + egui::vec2(8.0, 8.0);
            for wedge in &wedges {
                painter.rect_filled(
                    egui::Rect::from_min_size(cursor, egui::vec2(10.0, 10.0)),
                    2.0,
                    wedge.color,
                );
                painter.text(
                    cursor + egui::vec2(14.0, -1.0),
                    Align2::LEFT_TOP,
                    &wedge.label,
                    FontId::proportional(11.0),
                    ui.visuals().text_color(),
                );
                cursor.y += 14.0;
            }
        }
    }

    fn save_config(&self) -> Value {
        json!({
            "threshold": self.config.threshold,
            "show_legend": self.config.show_legend,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(v) = config.get("threshold").and_then(|v| v.as_u64()) {
            self.config.threshold = v as usize;
        }
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

    fn buckets(pairs: &[(&str, usize)]) -> IndexMap<String, usize> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn wedges_cover_the_full_circle() {
        let wedges = LanguageDonutView::wedges(&buckets(&[("Go", 3), ("Rust", 1)]));
        assert_eq!(wedges.len(), 2);
        let sweep: f32 = wedges.iter().map(|w| w.end_angle - w.start_angle).sum();
        assert!((sweep - TAU).abs() < 1e-4);
        // Proportional to counts.
        assert!((wedges[0].end_angle - wedges[0].start_angle) > (wedges[1].end_angle - wedges[1].start_angle));
    }

    #[test]
    fn hit_test_respects_ring_bounds() {
        let wedges = LanguageDonutView::wedges(&buckets(&[("Go", 1)]));
        let center = Pos2::new(100.0, 100.0);
        // Inside the hole.
        assert!(LanguageDonutView::hit_test(&wedges, Pos2::new(100.0, 105.0), center, 20.0, 50.0).is_none());
        // On the ring.
        let hit = LanguageDonutView::hit_test(&wedges, Pos2::new(100.0, 135.0), center, 20.0, 50.0);
        assert_eq!(hit.map(|w| w.label.as_str()), Some("Go"));
        // Outside.
        assert!(LanguageDonutView::hit_test(&wedges, Pos2::new(100.0, 160.0), center, 20.0, 50.0).is_none());
    }

    #[test]
    fn empty_buckets_produce_no_wedges() {
        assert!(LanguageDonutView::wedges(&IndexMap::new()).is_empty());
    }
}
