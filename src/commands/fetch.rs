//! Metadata fetch command handlers

use serde::Serialize;
use tauri::{AppHandle, Manager, State};
use tracing::{error, info};

use crate::core::models::{AppError, AppResult, VideoSnapshot};
use crate::utils::validation::require_non_empty;
use crate::AppState;

/// Snapshot plus the pre-rendered info panel text

#[derive(Debug, Clone, Serialize)]
pub struct FetchResponse {
    pub snapshot: VideoSnapshot,

    pub summary: String,
}

/// Resolve a URL to its metadata snapshot
///
/// The snapshot slot is replaced on success; a failed fetch leaves it empty
/// so the download path stays gated.
#[tauri::command]
pub async fn fetch_video_info(
    app: AppHandle,
    state: State<'_, AppState>,
    url: String,
    dest_dir: String,
) -> Result<FetchResponse, String> {
    info!("📺 Fetching video info for: {}", url);

    match fetch_video_info_impl(&state, &url, &dest_dir).await {
        Ok(response) => {
            info!("✅ Fetched metadata for video: {}", response.snapshot.title);
            let _ = app.emit_all("fetch://done", response.clone());
            Ok(response)
        }
        Err(e) => {
            error!("❌ Failed to fetch video info: {}", e);
            Err(e.to_string())
        }
    }
}

pub(crate) async fn fetch_video_info_impl(
    state: &AppState,
    url: &str,
    dest_dir: &str,
) -> AppResult<FetchResponse> {
    let url = require_non_empty("video URL", url)?;
    require_non_empty("save path", dest_dir)?;

    let _permit = state.task_slot.try_acquire().ok_or(AppError::Busy)?;

    // Stale metadata must not outlive a new fetch attempt.
    *state.snapshot.write().await = None;

    let snapshot = state.extractor.fetch_metadata(&url).await?;
    let summary = snapshot.summary();
    *state.snapshot.write().await = Some(snapshot.clone());

    Ok(FetchResponse { snapshot, summary })
}
