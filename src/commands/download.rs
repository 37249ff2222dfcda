//! Download command handlers

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tauri::{AppHandle, Manager, State};
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

use crate::core::downloader::DownloadRequest;
use crate::core::models::{AppError, AppResult, OutputMode};
use crate::core::progress::{ProgressCallback, ProgressReporter};
use crate::utils::validation::require_non_empty;
use crate::AppState;

/// Result of one completed download

#[derive(Debug, Clone, Serialize)]
pub struct DownloadOutcome {
    pub download_id: Uuid,

    pub display: String,
}

/// Download the current video into the destination directory
///
/// The command resolves when the download completes or fails; progress is
/// streamed to the webview as `download://progress` events while it runs.
#[tauri::command]
pub async fn start_download(
    app: AppHandle,
    state: State<'_, AppState>,
    url: String,
    dest_dir: String,
    mode: OutputMode,
    target_height: u32,
) -> Result<DownloadOutcome, String> {
    info!("⬇️ Starting download: {} -> {}", url, dest_dir);

    let emitter = app.clone();
    let on_progress: ProgressCallback = Arc::new(move |payload| {
        let _ = emitter.emit_all("download://progress", payload.clone());
    });

    match start_download_impl(&state, &url, &dest_dir, mode, target_height, on_progress).await {
        Ok(outcome) => {
            info!("✅ Download {} completed", outcome.download_id);
            Ok(outcome)
        }
        Err(e) => {
            error!("❌ Download failed: {}", e);
            Err(e.to_string())
        }
    }
}

pub(crate) async fn start_download_impl(
    state: &AppState,
    url: &str,
    dest_dir: &str,
    mode: OutputMode,
    target_height: u32,
    on_progress: ProgressCallback,
) -> AppResult<DownloadOutcome> {
    let url = require_non_empty("video URL", url)?;
    let dest_dir = require_non_empty("save path", dest_dir)?;

    // A download needs a snapshot from a prior successful fetch.
    let title = {
        let snapshot = state.snapshot.read().await;
        snapshot
            .as_ref()
            .map(|s| s.title.clone())
            .ok_or_else(|| AppError::Input("No video information available.".to_string()))?
    };

    if mode == OutputMode::MuxedVideo {
        if !state.settings.resolution_choices.contains(&target_height) {
            return Err(AppError::Input(format!(
                "Unsupported resolution: {}p",
                target_height
            )));
        }
        state.downloader.ensure_muxer()?;
    }

    let _permit = state.task_slot.try_acquire().ok_or(AppError::Busy)?;

    let download_id = Uuid::new_v4();
    let request = DownloadRequest {
        url,
        dest_dir: PathBuf::from(dest_dir),
        mode,
        target_height,
        title,
    };

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    // Fresh reporter per download; it folds events into display payloads
    // until the channel closes.
    let forwarder = tokio::spawn(async move {
        let mut reporter = ProgressReporter::new();
        let emit = on_progress.as_ref();
        while let Some(event) = events_rx.recv().await {
            if reporter.apply(&event) {
                emit(&reporter.payload(download_id));
            }
        }
        reporter
    });

    let run_result = state.downloader.run(&request, events_tx).await;

    let reporter = forwarder
        .await
        .map_err(|e| AppError::Unexpected(format!("progress forwarding stopped: {}", e)))?;
    run_result?;

    Ok(DownloadOutcome {
        download_id,
        display: reporter.display(),
    })
}
