use std::path::PathBuf;

use eframe::egui;
use hotel_atlas::app::{apply_theme, HotelAtlasApp};
use hotel_atlas::config::DashboardConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let cli_path = std::env::args().nth(1).map(PathBuf::from);
    let (config, config_error) = match DashboardConfig::resolve(cli_path) {
        Ok(config) => (config, None),
        Err(e) => {
            log::error!("{e}; falling back to built-in defaults");
            (DashboardConfig::default(), Some(e.to_string()))
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1600.0, 1000.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render the sidebar logo.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            apply_theme(&cc.egui_ctx);
            let mut app = HotelAtlasApp::new(config);
            if let Some(msg) = config_error {
                app.state.status_message.get_or_insert(msg);
            }
            Ok(Box::new(app))
        }),
    )
}
