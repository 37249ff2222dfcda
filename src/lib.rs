//! Tube Fetch - Core Library
//!
//! Backend for a small desktop front-end around the yt-dlp extraction
//! engine: fetch a video's metadata, then download it as audio-only or as a
//! merged audio/video file, with progress streamed to the webview.

pub mod commands;
pub mod core;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    downloader::{DownloadRequest, Downloader},
    extractor::Extractor,
    models::{AppError, AppResult, AppSettings, OutputMode, ProgressEvent, VideoSnapshot},
    progress::{ProgressPayload, ProgressReporter, ReporterState},
    task_slot::TaskSlot,
};

use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state shared between Tauri commands
pub struct AppState {
    /// In-memory defaults; nothing is persisted
    pub settings: AppSettings,

    pub extractor: Extractor,

    pub downloader: Downloader,

    /// Most recent successful fetch, replaced wholesale on each fetch
    pub snapshot: Arc<RwLock<Option<VideoSnapshot>>>,

    /// One-deep guard serializing fetch and download operations
    pub task_slot: Arc<TaskSlot>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_settings(AppSettings::default())
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        let extractor = Extractor::new(&settings.engine_bin);
        let downloader = Downloader::new(&settings.engine_bin, &settings.muxer_bin);

        Self {
            settings,
            extractor,
            downloader,
            snapshot: Arc::new(RwLock::new(None)),
            task_slot: Arc::new(TaskSlot::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
