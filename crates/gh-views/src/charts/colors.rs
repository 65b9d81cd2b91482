//! Shared chart palettes.

use egui::Color32;

/// Fixed wedge palette for the language donut. Slices past the palette
/// wrap around.
pub const DONUT_PALETTE: [Color32; 7] = [
    Color32::from_rgb(0xFF, 0x63, 0x84),
    Color32::from_rgb(0x36, 0xA2, 0xEB),
    Color32::from_rgb(0xFF, 0xCE, 0x56),
    Color32::from_rgb(0x4B, 0xC0, 0xC0),
    Color32::from_rgb(0x99, 0x66, 0xFF),
    Color32::from_rgb(0xFF, 0x9F, 0x40),
    Color32::from_rgb(0xE7, 0xE9, 0xED),
];

pub fn donut_color(index: usize) -> Color32 {
    DONUT_PALETTE[index % DONUT_PALETTE.len()]
}

/// Sequential blue ramp for the choropleth, `t` in [0,1].
pub fn blues(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
    // light #deebf7 to dark #08519c
    Color32::from_rgb(lerp(0xde, 0x08), lerp(0xeb, 0x51), lerp(0xf7, 0x9c))
}

/// Fill for countries with no users at all.
pub const MAP_EMPTY: Color32 = Color32::from_rgb(0x2a, 0x2a, 0x2e);

/// Accent used for selected / emphasized marks.
pub const ACCENT: Color32 = Color32::from_rgb(0xFF, 0x9F, 0x40);

/// Primary series color.
pub const SERIES: Color32 = Color32::from_rgb(0x36, 0xA2, 0xEB);

/// Secondary series color.
pub const SERIES_ALT: Color32 = Color32::from_rgb(0x4B, 0xC0, 0xC0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn donut_palette_wraps() {
        assert_eq!(donut_color(0), donut_color(DONUT_PALETTE.len()));
    }

    #[test]
    fn blues_endpoints() {
        assert_eq!(blues(0.0), Color32::from_rgb(0xde, 0xeb, 0xf7));
        assert_eq!(blues(1.0), Color32::from_rgb(0x08, 0x51, 0x9c));
    }
}
