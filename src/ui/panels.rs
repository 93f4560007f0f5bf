use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::filter::JournalFilter;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Every widget change goes through the
/// `AppState` setters, which rerender only when the filter really changed.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.table.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // ---- Year range ----
    if let Some((min, max)) = state.year_bounds {
        ui.strong("Select Publication Year Range");
        let (mut lo, mut hi) = state.filter.years;
        let lo_changed = ui
            .add(egui::Slider::new(&mut lo, min..=max).text("from"))
            .changed();
        let hi_changed = ui
            .add(egui::Slider::new(&mut hi, min..=max).text("to"))
            .changed();
        if lo_changed || hi_changed {
            // Dragging one handle past the other pushes the other along.
            if lo_changed && lo > hi {
                hi = lo;
            }
            if hi_changed && hi < lo {
                lo = hi;
            }
            state.set_year_range(lo, hi);
        }
        let (lo, hi) = state.filter.years;
        ui.label(format!("Selected year range: {lo} - {hi}"));
        ui.separator();
    }

    // ---- Journal selector ----
    ui.strong("Select Journal");
    let current = state.filter.journal.to_string();
    let mut picked: Option<JournalFilter> = None;
    egui::ComboBox::from_id_salt("journal")
        .selected_text(&current)
        .width(ui.available_width())
        .height(400.0)
        .show_ui(ui, |ui: &mut Ui| {
            for option in &state.journal_options {
                if ui.selectable_label(current == *option, option).clicked() {
                    picked = Some(JournalFilter::from_label(option));
                }
            }
        });
    if let Some(journal) = picked {
        state.set_journal(journal);
    }
    ui.label(format!("Selected journal: {}", state.filter.journal));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(view)) = (&state.table, &state.view) {
            ui.label(format!(
                "{} papers loaded, {} in filter",
                table.n_rows(),
                view.row_count
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open paper metadata")
        .add_filter("Supported files", &["zip", "gz", "csv", "json", "parquet", "pq"])
        .add_filter("Compressed CSV", &["zip", "gz"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}
