//! System integration command handlers
//!
//! Availability probes for the external binaries, the settings handshake for
//! the frontend dropdowns, and opening the destination folder in the OS file
//! manager.

use std::path::Path;

use tauri::State;
use tracing::{error, info, warn};

use crate::core::models::{AppError, AppResult, AppSettings};
use crate::utils::file_utils::ensure_dir_exists;
use crate::AppState;

/// Check if the extraction engine is available
#[tauri::command]
pub async fn check_engine(state: State<'_, AppState>) -> Result<bool, String> {
    let available = state.extractor.engine_available();
    if available {
        info!("✅ Extraction engine is available");
    } else {
        warn!("⚠️ Extraction engine is not available");
    }
    Ok(available)
}

/// Check if the muxing binary is available
#[tauri::command]
pub async fn check_muxer(state: State<'_, AppState>) -> Result<bool, String> {
    let available = state.downloader.muxer_available();
    if available {
        info!("✅ Muxing binary is available");
    } else {
        warn!("⚠️ Muxing binary is not available");
    }
    Ok(available)
}

/// Hand the in-memory defaults to the frontend
#[tauri::command]
pub async fn get_app_settings(state: State<'_, AppState>) -> Result<AppSettings, String> {
    Ok(state.settings.clone())
}

/// Open the destination directory in the platform file manager
#[tauri::command]
pub async fn open_download_folder(dest_dir: String) -> Result<(), String> {
    info!("📁 Opening download folder: {}", dest_dir);

    match open_folder_impl(&dest_dir).await {
        Ok(()) => {
            info!("✅ Successfully opened download folder");
            Ok(())
        }
        Err(e) => {
            error!("❌ Failed to open download folder: {}", e);
            Err(e.to_string())
        }
    }
}

async fn open_folder_impl(folder_path: &str) -> AppResult<()> {
    ensure_dir_exists(Path::new(folder_path))
        .map_err(|e| AppError::Unexpected(e.to_string()))?;

    #[cfg(target_os = "windows")]
    let opener = "explorer";
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(all(unix, not(target_os = "macos")))]
    let opener = "xdg-open";

    let output = tokio::process::Command::new(opener)
        .arg(folder_path)
        .output()
        .await
        .map_err(|e| AppError::Unexpected(format!("Failed to open folder: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Unexpected(format!(
            "{} command failed: {}",
            opener,
            stderr.trim()
        )));
    }

    Ok(())
}
