//! Rotating topic cloud

use egui::{Align2, Color32, FontId, Pos2, Sense, Ui};
use serde_json::{json, Value};

use gh_core::aggregate::topic_frequency;

use crate::{DashboardView, DataGeneration, ViewId, ViewerContext};

#[derive(Debug, Clone)]
pub struct TopicCloudConfig {
    /// How many topics to place on the sphere.
    pub max_topics: usize,
    /// Revolutions per second.
    pub spin_speed: f32,
}

impl Default for TopicCloudConfig {
    fn default() -> Self {
        Self {
            max_topics: 50,
            spin_speed: 0.05,
        }
    }
}

/// Most frequent topics over the country- and year-filtered rows, placed
/// on a slowly spinning sphere. Display only.
pub struct TopicCloudView {
    id: ViewId,
    title: String,
    pub config: TopicCloudConfig,

    cached: Option<(DataGeneration, Vec<PlacedTopic>)>,
}

/// A topic with its unit-sphere position and display weight in [0,1].
#[derive(Debug, Clone)]
struct PlacedTopic {
    label: String,
    count: usize,
    x: f32,
    y: f32,
    z: f32,
    weight: f32,
}

impl TopicCloudView {
    pub fn new(id: ViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: TopicCloudConfig::default(),
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
        let ranked = topic_frequency(
            rows,
            generation.filters.country.as_deref(),
            generation.filters.year,
            self.config.max_topics,
        );
        self.cached = Some((generation, Self::place(&ranked)));
    }

    /// Evenly distribute topics on the unit sphere with the golden-angle
    /// spiral, heaviest topics first.
    fn place(ranked: &[(String, usize)]) -> Vec<PlacedTopic> {
        let n = ranked.len();
        if n == 0 {
            return Vec::new();
        }
        let max = ranked[0].1.max(1) as f32;
        let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());

        ranked
            .iter()
            .enumerate()
            .map(|(i, (label, count))| {
                let y = if n == 1 {
                    0.0
                } else {
                    1.0 - 2.0 * i as f32 / (n - 1) as f32
                };
                let radius = (1.0 - y * y).max(0.0).sqrt();
                let theta = golden_angle * i as f32;
                PlacedTopic {
                    label: label.clone(),
                    count: *count,
                    x: theta.cos() * radius,
                    y,
                    z: theta.sin() * radius,
                    weight: *count as f32 / max,
                }
            })
            .collect()
    }

    fn weight_color(weight: f32) -> Color32 {
        if weight > 0.8 {
            Color32::from_rgb(0xFF, 0x63, 0x84)
        } else if weight > 0.6 {
            Color32::from_rgb(0xFF, 0x9F, 0x40)
        } else if weight > 0.4 {
            Color32::from_rgb(0xFF, 0xCE, 0x56)
        } else if weight > 0.2 {
            Color32::from_rgb(0x36, 0xA2, 0xEB)
        } else {
            Color32::from_rgb(0x4B, 0xC0, 0xC0)
        }
    }
}

impl DashboardView for TopicCloudView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "TopicCloudView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        self.refresh(ctx);
        let Some((_, placed)) = &self.cached else {
            ui.centered_and_justified(|ui| ui.spinner());
            return;
        };
        if placed.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("No topics for this selection");
            });
            return;
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let scale = rect.width().min(rect.height()) * 0.4;

        let time = ui.input(|i| i.time) as f32;
        let angle = time * self.config.spin_speed * std::f32::consts::TAU;
        let (sin, cos) = angle.sin_cos();

        // Rotate around the vertical axis, draw back-to-front.
        let mut projected: Vec<(Pos2, f32, &PlacedTopic)> = placed
            .iter()
            .map(|topic| {
                let rx = topic.x * cos + topic.z * sin;
                let rz = -topic.x * sin + topic.z * cos;
                let pos = center + egui::vec2(rx * scale, topic.y * scale * 0.85);
                (pos, rz, topic)
            })
            .collect();
        projected.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        for (pos, depth, topic) in &projected {
            // depth in [-1,1]; fade and shrink the far hemisphere.
            let depth_t = (depth + 1.0) / 2.0;
            let font_size = 9.0 + topic.weight * 12.0 * (0.6 + 0.4 * depth_t);
            let alpha = (80.0 + 175.0 * depth_t) as u8;
            let color = Self::weight_color(topic.weight)
                .gamma_multiply(alpha as f32 / 255.0);
            painter.text(
                *pos,
                Align2::CENTER_CENTER,
                &topic.label,
                FontId::proportional(font_size),
                color,
            );
        }

        if let Some(pos) = response.hover_pos() {
            // Nearest front-hemisphere topic within a small radius.
            let hit = projected
                .iter()
                .filter(|(_, depth, _)| *depth >= 0.0)
                .filter(|(p, _, _)| p.distance(pos) < 24.0)
                .min_by(|a, b| {
                    a.0.distance(pos)
                        .partial_cmp(&b.0.distance(pos))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            if let Some((_, _, topic)) = hit {
                egui::show_tooltip_at_pointer(
                    ui.ctx(),
                    egui::Id::new((self.id, "topic_tooltip")),
                    |ui| {
                        ui.label(format!("{}: {} users", topic.label, topic.count));
                    },
                );
            }
        }

        // Keep spinning.
        ui.ctx().request_repaint();
    }

    fn save_config(&self) -> Value {
        json!({
            "max_topics": self.config.max_topics,
            "spin_speed": self.config.spin_speed,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(v) = config.get("max_topics").and_then(|v| v.as_u64()) {
            self.config.max_topics = v as usize;
        }
        if let Some(v) = config.get("spin_speed").and_then(|v| v.as_f64()) {
            self.config.spin_speed = v as f32;
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(n: usize) -> Vec<(String, usize)> {
        (0..n).map(|i| (format!("topic{i}"), n - i)).collect()
    }

    #[test]
    fn placement_stays_on_the_unit_sphere() {
        for topic in TopicCloudView::place(&ranked(50)) {
            let r = (topic.x * topic.x + topic.y * topic.y + topic.z * topic.z).sqrt();
            assert!((r - 1.0).abs() < 1e-4, "off-sphere point for {}", topic.label);
        }
    }

    #[test]
    fn heaviest_topic_has_full_weight() {
        let placed = TopicCloudView::place(&ranked(10));
        assert_eq!(placed[0].weight, 1.0);
        assert!(placed.iter().all(|t| t.weight > 0.0 && t.weight <= 1.0));
    }

    #[test]
    fn empty_ranking_places_nothing() {
        assert!(TopicCloudView::place(&[]).is_empty());
    }

    #[test]
    fn single_topic_sits_on_the_equator() {
        let placed = TopicCloudView::place(&ranked(1));
        assert_eq!(placed.len(), 1);
        assert!(placed[0].y.abs() < 1e-6);
    }
}
