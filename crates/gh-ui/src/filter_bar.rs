//! Active-filter chips

use egui::Ui;

use gh_core::{FilterAction, FilterStore};

/// One removable chip per active filter dimension, plus a clear-all button
/// when more than one is set. Removing a chip dispatches the matching
/// clear action; everything downstream reacts through the store.
pub fn filter_bar(ui: &mut Ui, filters: &FilterStore) {
    let state = filters.snapshot();
    if state.is_empty() {
        ui.weak("Click a chart to filter");
        return;
    }

    ui.horizontal_wrapped(|ui| {
        if let Some(country) = &state.country {
            if chip(ui, "Country", country) {
                filters.dispatch(FilterAction::ClearCountry);
            }
        }
        if let Some(year) = state.year {
            if chip(ui, "Year", &year.to_string()) {
                filters.dispatch(FilterAction::ClearYear);
            }
        }
        if let Some(language) = &state.language {
            if chip(ui, "Language", language) {
                filters.dispatch(FilterAction::ClearLanguage);
            }
        }

        let active = state.country.is_some() as u8
            + state.year.is_some() as u8
            + state.language.is_some() as u8;
        if active > 1 && ui.small_button("Clear all").clicked() {
            filters.dispatch(FilterAction::ClearAll);
        }
    });
}

/// Returns true when the chip's remove button was clicked.
fn chip(ui: &mut Ui, dimension: &str, value: &str) -> bool {
    let mut removed = false;
    egui::Frame::none()
        .fill(ui.visuals().faint_bg_color)
        .rounding(10.0)
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.weak(format!("{dimension}:"));
                ui.strong(value);
                if ui.small_button("x").clicked() {
                    removed = true;
                }
            });
        });
    removed
}
