// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use tracing::{info, warn};

use tube_fetch::{commands, utils, AppState};

fn main() {
    utils::logging::init_tracing();

    info!("🚀 Starting {} v{}", tube_fetch::NAME, tube_fetch::VERSION);

    let state = AppState::new();
    if !state.extractor.engine_available() {
        warn!(
            "⚠️ {} not found on PATH; fetch and download will fail until it is installed",
            state.settings.engine_bin
        );
    }

    tauri::Builder::default()
        .manage(state)
        .invoke_handler(tauri::generate_handler![
            commands::fetch::fetch_video_info,
            commands::download::start_download,
            commands::system::check_engine,
            commands::system::check_muxer,
            commands::system::get_app_settings,
            commands::system::open_download_folder,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
