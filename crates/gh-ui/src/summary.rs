//! Summary cards shown above the chart grid

use egui::{Align2, Color32, FontId, Pos2, Sense, Stroke, Ui};

use gh_core::FilterState;

/// Numeric card with the filtered user count and the active country/year.
pub fn user_count_card(ui: &mut Ui, total: usize, filters: &FilterState) {
    egui::Frame::none()
        .fill(ui.visuals().faint_bg_color)
        .rounding(6.0)
        .inner_margin(egui::Margin::same(10.0))
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.weak("Users");
                ui.heading(format!("{total}"));
                let scope = match (&filters.country, filters.year) {
                    (Some(country), Some(year)) => format!("{country}, {year}"),
                    (Some(country), None) => country.clone(),
                    (None, Some(year)) => year.to_string(),
                    (None, None) => "All profiles".to_string(),
                };
                ui.weak(scope);
            });
        });
}

/// Arc gauge showing the filtered share of the whole dataset.
pub fn arc_progress_card(ui: &mut Ui, total: usize, dataset_size: usize) {
    let fraction = if dataset_size == 0 {
        0.0
    } else {
        total as f32 / dataset_size as f32
    };

    egui::Frame::none()
        .fill(ui.visuals().faint_bg_color)
        .rounding(6.0)
        .inner_margin(egui::Margin::same(10.0))
        .show(ui, |ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(72.0, 56.0), Sense::hover());
            let painter = ui.painter_at(rect);
            let center = Pos2::new(rect.center().x, rect.bottom() - 10.0);
            let radius = 26.0;

            draw_arc(
                &painter,
                center,
                radius,
                1.0,
                Stroke::new(5.0, ui.visuals().widgets.inactive.bg_stroke.color),
            );
            draw_arc(
                &painter,
                center,
                radius,
                fraction,
                Stroke::new(5.0, Color32::from_rgb(88, 166, 255)),
            );
            painter.text(
                center - egui::vec2(0.0, 6.0),
                Align2::CENTER_CENTER,
                format!("{:.0}%", fraction * 100.0),
                FontId::proportional(12.0),
                ui.visuals().strong_text_color(),
            );
        });
}

/// Upper half-circle arc from the left, `fraction` of the way around.
fn draw_arc(painter: &egui::Painter, center: Pos2, radius: f32, fraction: f32, stroke: Stroke) {
    let fraction = fraction.clamp(0.0, 1.0);
    if fraction <= 0.0 {
        return;
    }
    let steps = (fraction * 32.0).ceil().max(1.0) as usize;
    let points: Vec<Pos2> = (0..=steps)
        .map(|i| {
            let t = fraction * i as f32 / steps as f32;
            let angle = std::f32::consts::PI * (1.0 + t);
            center + egui::vec2(angle.cos(), angle.sin()) * radius
        })
        .collect();
    painter.add(egui::Shape::line(points, stroke));
}
