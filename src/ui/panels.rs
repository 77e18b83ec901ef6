use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::ColumnFilter;
use crate::data::loader::load_markets;
use crate::state::{AppState, HotelMode};

// ---------------------------------------------------------------------------
// Left side panel – selection and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: hotel selection, colour column and filters.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    // ---- Logo (centered) ----
    if let Some(logo) = &state.config.logo_path {
        let uri = format!("file://{}", logo.display());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                egui::Image::new(uri)
                    .max_width(ui.available_width() * 0.9)
                    .max_height(120.0),
            );
        });
        ui.add_space(4.0);
    }

    ui.label(RichText::new(&state.config.title).strong().size(20.0).color(Color32::WHITE));
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            hotel_selector(ui, state);
            ui.separator();
            color_selector(ui, state);
            ui.separator();
            filter_widgets(ui, state);
        });
}

fn hotel_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Hotel Selection Mode");
    let mut mode = state.hotel_mode;
    ui.horizontal(|ui: &mut Ui| {
        ui.radio_value(&mut mode, HotelMode::All, "Todos");
        ui.radio_value(&mut mode, HotelMode::Single, "Single");
    });
    state.set_hotel_mode(mode);

    if state.hotel_mode != HotelMode::Single {
        return;
    }

    let hotels = state.all_hotels.clone();
    let header = format!("Select Hotel(s)  ({}/{})", state.selected_hotels.len(), hotels.len());
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("hotel_select")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            for hotel in &hotels {
                let mut checked = state.selected_hotels.contains(hotel);
                if ui.checkbox(&mut checked, hotel.as_str()).changed() {
                    state.toggle_hotel(hotel);
                }
            }
        });
}

fn color_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Color by");
    if state.colorable.is_empty() {
        ui.label("No colorable columns for this selection.");
        return;
    }
    let current = state.color_column.clone().unwrap_or_default();
    let choices = state.colorable.clone();
    egui::ComboBox::from_id_salt("color_by")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for col in &choices {
                if ui.selectable_label(current == *col, col.as_str()).clicked() {
                    state.set_color_column(col.clone());
                }
            }
        });
}

fn filter_widgets(ui: &mut Ui, state: &mut AppState) {
    for col in state.active_filter_columns() {
        let Some(filter) = state.filters.get(&col).cloned() else {
            continue;
        };
        match filter {
            ColumnFilter::Range {
                min,
                max,
                mut low,
                mut high,
            } => {
                ui.strong(col.as_str());
                let lo_changed = ui
                    .add(egui::Slider::new(&mut low, min..=max).step_by(1.0).text("from"))
                    .changed();
                let hi_changed = ui
                    .add(egui::Slider::new(&mut high, min..=max).step_by(1.0).text("to"))
                    .changed();
                if lo_changed || hi_changed {
                    state.set_range(&col, low, high);
                }
            }
            ColumnFilter::Values { options, selected } => {
                // Show count of selected / total in the header
                let header_text = format!("{col}  ({}/{})", selected.len(), options.len());
                let mapping = state.color_mappings.get(&col).cloned();

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(&col)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        // Select all / none buttons
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(&col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(&col);
                            }
                        });

                        for val in &options {
                            let mut text = RichText::new(val.to_string());
                            if let Some(cm) = &mapping {
                                text = text.color(cm.color_for(val));
                            }
                            let mut checked = selected.contains(val);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(&col, val);
                            }
                        }
                    });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open market files…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload configured markets").clicked() {
                let paths = state.config.market_paths();
                load_into(state, &paths);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} reservations loaded, {} visible",
            state.table.len(),
            state.visible_indices.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and combine market files into the state. On failure the dashboard
/// is emptied and the error shown in the top bar.
pub fn load_into(state: &mut AppState, paths: &[std::path::PathBuf]) {
    match load_markets(paths) {
        Ok(table) => {
            log::info!(
                "Loaded {} reservations from {} market file(s) with columns {:?}",
                table.len(),
                paths.len(),
                table.column_names()
            );
            state.set_table(table);
        }
        Err(e) => {
            log::error!("Failed to load data: {e:#}");
            state.set_load_error(format!("Failed to load data: {e:#}"));
        }
    }
}

pub fn open_file_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open market reservation files")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_files();

    if let Some(paths) = files {
        load_into(state, &paths);
    }
}
