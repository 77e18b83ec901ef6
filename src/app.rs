use eframe::egui::{self, Color32, ScrollArea, Ui};

use crate::config::DashboardConfig;
use crate::state::{AppState, ChannelSide};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HotelAtlasApp {
    pub state: AppState,
}

impl HotelAtlasApp {
    /// Build the app and load the configured market files.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        let paths = state.config.market_paths();
        panels::load_into(&mut state, &paths);
        Self { state }
    }
}

/// Black background, white text; applied once at startup.
pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = Color32::from_rgb(0x11, 0x11, 0x11);
    visuals.window_fill = Color32::BLACK;
    visuals.extreme_bg_color = Color32::BLACK;
    visuals.override_text_color = Some(Color32::WHITE);
    ctx.set_visuals(visuals);
}

impl eframe::App for HotelAtlasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selection and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: OCEAN maps left, everything else right ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Reservations Map");
            if self.state.table.is_empty() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.label("No reservations loaded  (File → Open market files…)");
                });
                return;
            }
            let map_panels = self.state.map_panels();
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.columns(2, |cols: &mut [Ui]| {
                        for panel in &map_panels {
                            let col = match panel.side {
                                ChannelSide::Direct => &mut cols[0],
                                ChannelSide::Other => &mut cols[1],
                            };
                            plot::reservation_map(col, &self.state, panel);
                            col.add_space(12.0);
                        }
                    });
                });
        });
    }
}
