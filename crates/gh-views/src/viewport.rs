//! Viewport - manages the dockable chart grid

use std::collections::HashMap;

use egui::Ui;
use egui_dock::{DockArea, DockState, NodeIndex, TabViewer};

use crate::{DashboardView, ViewId, ViewerContext};

/// The main viewport holding every chart in a dockable layout.
pub struct Viewport {
    dock_state: DockState<ViewId>,
    views: HashMap<ViewId, Box<dyn DashboardView>>,
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            dock_state: DockState::new(vec![]),
            views: HashMap::new(),
        }
    }

    /// Lay the given views out as a two-column grid, replacing any
    /// existing layout.
    pub fn create_grid_layout(&mut self, views: Vec<Box<dyn DashboardView>>) {
        self.views.clear();
        let ids: Vec<ViewId> = views.iter().map(|v| v.id()).collect();
        for view in views {
            self.views.insert(view.id(), view);
        }
        self.dock_state = grid_dock_state(ids);
    }

    pub fn add_view(&mut self, view: Box<dyn DashboardView>) {
        let id = view.id();
        self.views.insert(id, view);
        if self.dock_state.main_surface().is_empty() {
            self.dock_state = DockState::new(vec![id]);
        } else {
            self.dock_state.push_to_first_leaf(id);
        }
    }

    /// Draw the viewport
    pub fn ui(&mut self, ui: &mut Ui, ctx: &ViewerContext) {
        let available_rect = ui.available_rect_before_wrap();
        ui.allocate_ui(available_rect.size(), |ui| {
            DockArea::new(&mut self.dock_state)
                .show_close_buttons(false)
                .draggable_tabs(true)
                .show_tab_name_on_hover(true)
                .show_inside(
                    ui,
                    &mut ViewportTabViewer {
                        views: &mut self.views,
                        ctx,
                    },
                );
        });
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

struct ViewportTabViewer<'a> {
    views: &'a mut HashMap<ViewId, Box<dyn DashboardView>>,
    ctx: &'a ViewerContext,
}

impl<'a> TabViewer for ViewportTabViewer<'a> {
    type Tab = ViewId;

    fn title(&mut self, tab: &mut Self::Tab) -> egui::WidgetText {
        if let Some(view) = self.views.get(tab) {
            view.display_name().into()
        } else {
            "Unknown".into()
        }
    }

    fn ui(&mut self, ui: &mut Ui, tab: &mut Self::Tab) {
        if let Some(view) = self.views.get_mut(tab) {
            view.ui(self.ctx, ui);
        }
    }

    fn on_close(&mut self, tab: &mut Self::Tab) -> bool {
        self.views.remove(tab);
        true
    }
}

/// Split the surface into two columns, then stack the views down each
/// column so eight charts land as a 2x4 grid.
fn grid_dock_state(ids: Vec<ViewId>) -> DockState<ViewId> {
    let mut iter = ids.into_iter();
    let Some(first) = iter.next() else {
        return DockState::new(vec![]);
    };
    let rest: Vec<ViewId> = iter.collect();
    let mut dock_state = DockState::new(vec![first]);

    if rest.is_empty() {
        return dock_state;
    }

    let (left, right): (Vec<_>, Vec<_>) = rest
        .iter()
        .enumerate()
        .partition(|(i, _)| i % 2 == 1);

    let surface = dock_state.main_surface_mut();
    let mut right_node = NodeIndex::root();
    let mut left_node = NodeIndex::root();

    if !right.is_empty() {
        let first_right = right[0].1;
        let [old, new] = surface.split_right(NodeIndex::root(), 0.5, vec![*first_right]);
        left_node = old;
        right_node = new;
        for (_, id) in right.iter().skip(1) {
            let [_, below] = surface.split_below(right_node, 0.5, vec![**id]);
            right_node = below;
        }
    }

    for (_, id) in left {
        let [_, below] = surface.split_below(left_node, 0.5, vec![*id]);
        left_node = below;
    }

    dock_state
}
