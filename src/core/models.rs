//! Core data models for the video download front-end

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vertical resolutions offered by the quality dropdown
pub const RESOLUTION_CHOICES: [u32; 4] = [144, 256, 360, 1080];

/// Output mode selector

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Best audio stream only, kept in its native container
    AudioOnly,

    /// Best video at or below the requested height, merged with best audio
    MuxedVideo,
}

impl Default for OutputMode {
    fn default() -> Self {
        Self::MuxedVideo
    }
}

/// Metadata snapshot produced by one successful fetch
///
/// A single slot holds the most recent snapshot; each new fetch replaces it
/// wholesale. Downloads read the slot and must not start while it is empty.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSnapshot {
    pub id: String,

    pub title: String,

    pub duration_secs: Option<u64>,

    pub view_count: Option<u64>,

    /// Maximum height among formats that carry a video codec; `None` when
    /// every available format is audio-only
    pub best_height: Option<u32>,

    pub uploader: Option<String>,

    pub thumbnail: Option<String>,

    pub webpage_url: String,

    pub fetched_at: DateTime<Utc>,
}

impl VideoSnapshot {
    /// Human-readable summary shown in the info panel
    pub fn summary(&self) -> String {
        let duration = self
            .duration_secs
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let views = self
            .view_count
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let resolution = self
            .best_height
            .map(|h| format!("{}p", h))
            .unwrap_or_else(|| "unknown".to_string());

        format!(
            "Title: {}\nDuration: {} seconds\nView Count: {}\nHighest Available Resolution: {}\n",
            self.title, duration, views, resolution
        )
    }
}

/// Progress event status

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Downloading,

    Finished,

    Error,
}

/// One progress observation pushed from the download task
///
/// Events are consumed immediately by the progress reporter; only the latest
/// one matters for display.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub status: ProgressStatus,

    pub downloaded_bytes: u64,

    pub total_bytes: Option<u64>,
}

impl ProgressEvent {
    pub fn downloading(downloaded_bytes: u64, total_bytes: Option<u64>) -> Self {
        Self {
            status: ProgressStatus::Downloading,
            downloaded_bytes,
            total_bytes,
        }
    }

    pub fn finished() -> Self {
        Self {
            status: ProgressStatus::Finished,
            downloaded_bytes: 0,
            total_bytes: None,
        }
    }

    pub fn errored() -> Self {
        Self {
            status: ProgressStatus::Error,
            downloaded_bytes: 0,
            total_bytes: None,
        }
    }
}

/// In-memory application defaults
///
/// Never written to disk; the app has no persisted configuration.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Executable name of the extraction engine
    pub engine_bin: String,

    /// Executable name of the muxing binary required for merged output
    pub muxer_bin: String,

    pub default_mode: OutputMode,

    pub default_height: u32,

    pub resolution_choices: Vec<u32>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            engine_bin: "yt-dlp".to_string(),

            muxer_bin: "ffmpeg".to_string(),

            default_mode: OutputMode::MuxedVideo,

            default_height: 144,

            resolution_choices: RESOLUTION_CHOICES.to_vec(),
        }
    }
}

/// Application error types

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Input error: {0}")]
    Input(String),

    #[error("Missing prerequisite: {0}")]
    Precondition(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Another operation is still running")]
    Busy,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// Result type alias for application operations

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> VideoSnapshot {
        VideoSnapshot {
            id: "abc123".to_string(),
            title: "A Video".to_string(),
            duration_secs: Some(300),
            view_count: Some(1_000_000),
            best_height: Some(1080),
            uploader: Some("Channel".to_string()),
            thumbnail: None,
            webpage_url: "https://www.youtube.com/watch?v=abc123".to_string(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn summary_lists_all_four_fields() {
        let text = snapshot().summary();
        assert!(text.contains("Title: A Video"));
        assert!(text.contains("Duration: 300 seconds"));
        assert!(text.contains("View Count: 1000000"));
        assert!(text.contains("Highest Available Resolution: 1080p"));
    }

    #[test]
    fn summary_falls_back_to_unknown() {
        let mut snap = snapshot();
        snap.duration_secs = None;
        snap.view_count = None;
        snap.best_height = None;

        let text = snap.summary();
        assert!(text.contains("Duration: unknown seconds"));
        assert!(text.contains("View Count: unknown"));
        assert!(text.contains("Highest Available Resolution: unknown"));
    }

    #[test]
    fn output_mode_uses_kebab_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&OutputMode::AudioOnly).unwrap(),
            "\"audio-only\""
        );
        assert_eq!(
            serde_json::from_str::<OutputMode>("\"muxed-video\"").unwrap(),
            OutputMode::MuxedVideo
        );
    }

    #[test]
    fn error_messages_keep_user_facing_granularity() {
        let extraction = AppError::Extraction("video unavailable".to_string());
        assert_eq!(
            extraction.to_string(),
            "Extraction error: video unavailable"
        );

        let unexpected = AppError::Unexpected("worker vanished".to_string());
        assert!(unexpected
            .to_string()
            .starts_with("An unexpected error occurred"));
    }
}
