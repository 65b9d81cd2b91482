use egui::{Color32, Context, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};
use std::collections::BTreeMap;

/// Theme configuration
pub struct Theme {
    pub name: String,
    pub dark_mode: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "GitHub Dark".to_string(),
            dark_mode: true,
        }
    }
}

/// Apply the application theme (GitHub-dimmed dark theme)
pub fn apply_theme(ctx: &Context, _theme: &Theme) {
    let mut style = Style::default();
    let mut visuals = Visuals::dark();

    let bg_color = Color32::from_rgb(13, 17, 23); // page background
    let panel_bg = Color32::from_rgb(22, 27, 34); // card background
    let widget_bg = Color32::from_rgb(33, 38, 45);
    let hover_color = Color32::from_rgb(48, 54, 61);
    let active_color = Color32::from_rgb(56, 62, 70);
    let accent_color = Color32::from_rgb(88, 166, 255); // link blue
    let text_color = Color32::from_rgb(230, 237, 243);

    visuals.window_fill = panel_bg;
    visuals.panel_fill = panel_bg;
    visuals.extreme_bg_color = bg_color;
    visuals.faint_bg_color = widget_bg;

    visuals.widgets.noninteractive.bg_fill = widget_bg;
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, Color32::from_rgb(48, 54, 61));
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, text_color);
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);

    visuals.widgets.inactive.bg_fill = widget_bg;
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, Color32::from_rgb(55, 62, 70));
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, text_color);
    visuals.widgets.inactive.rounding = Rounding::same(4.0);

    visuals.widgets.hovered.bg_fill = hover_color;
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, Color32::from_rgb(68, 76, 86));
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, text_color);
    visuals.widgets.hovered.rounding = Rounding::same(4.0);

    visuals.widgets.active.bg_fill = active_color;
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, accent_color);
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, text_color);
    visuals.widgets.active.rounding = Rounding::same(4.0);

    visuals.selection.bg_fill = accent_color.linear_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, accent_color);

    visuals.hyperlink_color = accent_color;
    visuals.code_bg_color = Color32::from_rgb(30, 35, 42);

    visuals.window_shadow.extrusion = 8.0;
    visuals.popup_shadow.extrusion = 4.0;

    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    style.spacing.menu_margin = egui::Margin::same(8.0);
    style.spacing.indent = 20.0;

    let mut font_sizes = BTreeMap::new();
    font_sizes.insert(TextStyle::Small, FontId::new(11.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Body, FontId::new(13.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Button, FontId::new(13.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace));
    style.text_styles = font_sizes;

    style.visuals = visuals;
    ctx.set_style(style);
}
