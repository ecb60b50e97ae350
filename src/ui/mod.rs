//! UI modules and layout composition.

mod grid;
pub mod grid_view;
mod transport;

use grid_view::GridView;
use sg_master::{Controller, CpalSink};

pub type AppController = Controller<CpalSink, GridView>;

/// UI-facing state bundle, passed to all panel functions.
/// No GL/imgui/renderer fields.
pub struct GuiState {
    pub controller: AppController,
    pub status: String,
}

impl GuiState {
    pub fn new(controller: AppController) -> Self {
        Self {
            controller,
            status: String::new(),
        }
    }
}

pub fn build_ui(ui: &imgui::Ui, gui: &mut GuiState) {
    let display_size = ui.io().display_size;
    ui.window("stepgrid")
        .position([0.0, 0.0], imgui::Condition::Always)
        .size(display_size, imgui::Condition::Always)
        .flags(
            imgui::WindowFlags::NO_TITLE_BAR
                | imgui::WindowFlags::NO_RESIZE
                | imgui::WindowFlags::NO_MOVE
                | imgui::WindowFlags::NO_COLLAPSE
                | imgui::WindowFlags::NO_BRING_TO_FRONT_ON_FOCUS,
        )
        .build(|| {
            transport::transport_panel(ui, gui);
            ui.separator();

            let avail = ui.content_region_avail();
            ui.child_window("grid")
                .size(avail)
                .build(|| grid::note_grid(ui, gui));
        });

    if ui.is_key_pressed(imgui::Key::Space) && !ui.io().want_text_input {
        transport::toggle_playback(gui);
    }
}
