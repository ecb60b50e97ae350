//! Note grid: one row per pitch, one column per beat.
//!
//! Table API with a frozen note-name column and header, ListClipper for
//! the rows, DrawList rects for cell backgrounds.

use sg_master::NoteId;

use super::grid_view::is_shaded_column;
use super::GuiState;

const ACTIVE_BG: [f32; 4] = [0.39, 0.78, 0.51, 1.0];
const ACTIVE_PLAYING_BG: [f32; 4] = [0.60, 0.95, 0.70, 1.0];
const PLAYING_BG: [f32; 4] = [0.15, 0.30, 0.20, 1.0];
const SHADED_BG: [f32; 4] = [0.18, 0.18, 0.22, 1.0];
const EMPTY_BG: [f32; 4] = [0.12, 0.12, 0.14, 1.0];
const LABEL_COLOR: [f32; 4] = [0.78, 0.78, 0.78, 1.0];
const OCTAVE_LABEL_COLOR: [f32; 4] = [0.55, 0.55, 0.85, 1.0];

pub fn note_grid(ui: &imgui::Ui, gui: &mut GuiState) {
    let total_beats = gui.controller.pattern().total_beats();
    let rows = gui.controller.pitches().len();
    let char_width = ui.calc_text_size("0")[0];
    let label_width = char_width * 8.0;
    let cell_width = char_width * 2.5;

    let table_flags = imgui::TableFlags::SIZING_FIXED_FIT
        | imgui::TableFlags::SCROLL_X
        | imgui::TableFlags::SCROLL_Y
        | imgui::TableFlags::BORDERS_V;

    let mut clicked: Option<(usize, NoteId)> = None;

    if let Some(_table) = ui.begin_table_with_flags("##grid", 1 + total_beats, table_flags) {
        ui.table_setup_scroll_freeze(1, 1);
        ui.table_setup_column_with(imgui::TableColumnSetup {
            name: "##note",
            flags: imgui::TableColumnFlags::WIDTH_FIXED,
            init_width_or_weight: label_width,
            user_id: imgui::Id::default(),
        });
        for beat in 0..total_beats {
            ui.table_setup_column_with(imgui::TableColumnSetup {
                name: format!("{}", beat + 1),
                flags: imgui::TableColumnFlags::WIDTH_FIXED,
                init_width_or_weight: cell_width,
                user_id: imgui::Id::default(),
            });
        }
        ui.table_headers_row();

        let line_height = ui.text_line_height();
        let mouse_clicked = ui.is_mouse_clicked(imgui::MouseButton::Left);
        let view = gui.controller.display();
        let highlighted = view.highlighted();

        let mut clipper = imgui::ListClipper::new(rows as i32)
            .items_height(line_height)
            .begin(ui);
        while clipper.step() {
            for row in clipper.display_start()..clipper.display_end() {
                let note = NoteId(row as u8);
                ui.table_next_row();

                ui.table_next_column();
                let name = gui.controller.pitches().name(note);
                let color = if name.starts_with('C') && !name.contains('#') {
                    OCTAVE_LABEL_COLOR
                } else {
                    LABEL_COLOR
                };
                let _token = ui.push_style_color(imgui::StyleColor::Text, color);
                ui.text(name);
                drop(_token);

                for beat in 0..total_beats {
                    ui.table_next_column();
                    let origin = ui.cursor_screen_pos();
                    let active = view.is_drawn(beat, note);
                    let playing = highlighted == Some(beat);

                    let bg = match (active, playing) {
                        (true, true) => ACTIVE_PLAYING_BG,
                        (true, false) => ACTIVE_BG,
                        (false, true) => PLAYING_BG,
                        (false, false) if is_shaded_column(beat) => SHADED_BG,
                        (false, false) => EMPTY_BG,
                    };
                    draw_rect_bg(ui, cell_width, line_height, bg);
                    ui.dummy([cell_width, line_height]);

                    if mouse_clicked
                        && ui.is_window_hovered()
                        && point_in_rect(ui.io().mouse_pos, origin, cell_width, line_height)
                    {
                        clicked = Some((beat, note));
                    }
                }
            }
        }
    }

    // The grid view is borrowed while drawing; toggling redraws it.
    if let Some((beat, note)) = clicked {
        let on = gui.controller.toggle_note(beat, note);
        let name = gui.controller.pitches().name(note).to_string();
        gui.status = format!("{} {} at beat {}", if on { "Added" } else { "Removed" }, name, beat + 1);
    }
}

/// Draw a filled rect background at the current cursor position.
fn draw_rect_bg(ui: &imgui::Ui, width: f32, height: f32, color: [f32; 4]) {
    let draw_list = ui.get_window_draw_list();
    let min = ui.cursor_screen_pos();
    let max = [min[0] + width - 1.0, min[1] + height - 1.0];
    draw_list.add_rect(min, max, color).filled(true).build();
}

fn point_in_rect(point: [f32; 2], origin: [f32; 2], width: f32, height: f32) -> bool {
    point[0] >= origin[0] && point[0] < origin[0] + width
        && point[1] >= origin[1] && point[1] < origin[1] + height
}
