//! Transport bar: Play/Pause, BPM and volume, pattern files, WAV export.

use std::time::Instant;

use sg_master::PlayState;

use super::GuiState;

const BPM_RANGE: (f64, f64) = (40.0, 240.0);
const EXPORT_SECONDS: f64 = 16.0;

pub fn transport_panel(ui: &imgui::Ui, gui: &mut GuiState) {
    let label = if gui.controller.is_playing() { "Pause" } else { "Play" };
    if ui.button(label) {
        toggle_playback(gui);
    }
    ui.same_line();
    ui.separator();
    ui.same_line();

    let mut bpm = gui.controller.bpm();
    ui.set_next_item_width(200.0);
    if ui.slider("BPM", BPM_RANGE.0, BPM_RANGE.1, &mut bpm) {
        gui.controller.dispatch_named("setBpm", Some(bpm));
    }
    ui.same_line();

    let mut volume = gui.controller.volume();
    ui.set_next_item_width(120.0);
    if ui.slider("Volume", 0.0, 1.0, &mut volume) {
        gui.controller.dispatch_named("setVolume", Some(volume as f64));
    }
    ui.same_line();
    ui.separator();
    ui.same_line();

    if ui.button("Clear") {
        gui.controller.clear_pattern();
        gui.status = "Cleared".to_string();
    }
    ui.same_line();
    if ui.button("Load") {
        load_pattern_dialog(gui);
    }
    ui.same_line();
    if ui.button("Save") {
        save_pattern_dialog(gui);
    }
    ui.same_line();
    if ui.button("Export WAV") {
        export_wav_dialog(gui);
    }

    let total_beats = gui.controller.pattern().total_beats();
    if let Some(beat) = gui.controller.display().highlighted() {
        ui.same_line();
        ui.text(format!("Beat {:02}/{:02}", beat + 1, total_beats));
    }

    if !gui.status.is_empty() {
        ui.same_line();
        ui.text(&gui.status);
    }
}

pub fn toggle_playback(gui: &mut GuiState) {
    gui.status = match gui.controller.play_pause(Instant::now()) {
        PlayState::Playing => "Playing...".to_string(),
        PlayState::Stopped => "Paused".to_string(),
    };
}

fn load_pattern_dialog(gui: &mut GuiState) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("Pattern files", &["toml"])
        .pick_file()
    else {
        return;
    };

    gui.status = match gui.controller.load_pattern_file(&path) {
        Ok(()) => {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            format!("Loaded {}", name)
        }
        Err(e) => format!("Load error: {}", e),
    };
}

fn save_pattern_dialog(gui: &mut GuiState) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("Pattern files", &["toml"])
        .set_file_name("pattern.toml")
        .save_file()
    else {
        return;
    };

    gui.status = match gui.controller.save_pattern_file(&path) {
        Ok(()) => format!("Saved {}", path.display()),
        Err(e) => format!("Save error: {}", e),
    };
}

fn export_wav_dialog(gui: &mut GuiState) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("WAV files", &["wav"])
        .set_file_name("pattern.wav")
        .save_file()
    else {
        return;
    };

    gui.status = match gui.controller.render_to_wav(&path, EXPORT_SECONDS) {
        Ok(()) => format!("Exported {}", path.display()),
        Err(e) => format!("Export error: {}", e),
    };
}
