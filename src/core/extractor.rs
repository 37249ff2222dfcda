//! Metadata fetch through the external extraction engine
//!
//! The engine owns URL resolution, format negotiation, and the network
//! transfer; this module only shells out to it, parses the JSON info dict it
//! prints, and reduces the format list to the fields the UI shows.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use chrono::Utc;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info};

use crate::core::models::{AppError, AppResult, VideoSnapshot};

/// Metadata side of the extraction engine

pub struct Extractor {
    engine_bin: PathBuf,
}

impl Extractor {
    pub fn new(engine_bin: impl Into<PathBuf>) -> Self {
        Self {
            engine_bin: engine_bin.into(),
        }
    }

    pub fn engine_bin(&self) -> &Path {
        &self.engine_bin
    }

    /// Whether the engine binary is discoverable on the search path
    pub fn engine_available(&self) -> bool {
        which::which(&self.engine_bin).is_ok()
    }

    /// Resolve a URL to a metadata snapshot without downloading anything
    pub async fn fetch_metadata(&self, url: &str) -> AppResult<VideoSnapshot> {
        debug!("Fetching metadata for URL: {}", url);

        let output = Command::new(&self.engine_bin)
            .args(["--dump-json", "--no-warnings", "--no-playlist", "--"])
            .arg(url)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => AppError::Precondition(format!(
                    "{} is not installed or not found in system PATH.",
                    self.engine_bin.display()
                )),
                _ => AppError::Extraction(format!(
                    "Failed to run {}: {}",
                    self.engine_bin.display(),
                    e
                )),
            })?;

        if !output.status.success() {
            return Err(AppError::Extraction(engine_failure_message(
                &output.stderr,
                output.status.code(),
            )));
        }

        let info: Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            AppError::Unexpected(format!("Malformed metadata from the engine: {}", e))
        })?;

        let snapshot = snapshot_from_info(url, &info);
        info!(
            "📋 Fetched metadata: {} ({})",
            snapshot.title,
            snapshot
                .best_height
                .map(|h| format!("{}p", h))
                .unwrap_or_else(|| "unknown".to_string())
        );
        Ok(snapshot)
    }
}

/// Condense engine stderr into one user-facing line
///
/// The engine prefixes its diagnostics with `ERROR:`; the last such line is
/// the most specific one.
pub(crate) fn engine_failure_message(stderr: &[u8], exit_code: Option<i32>) -> String {
    let text = String::from_utf8_lossy(stderr);
    if let Some(line) = text.lines().rev().find(|l| l.starts_with("ERROR:")) {
        return line.trim_start_matches("ERROR:").trim().to_string();
    }
    if let Some(line) = text.lines().rev().find(|l| !l.trim().is_empty()) {
        return line.trim().to_string();
    }
    match exit_code {
        Some(code) => format!("extraction engine exited with status {}", code),
        None => "extraction engine was terminated by a signal".to_string(),
    }
}

/// Build a snapshot from the engine's info dict
///
/// Absent fields degrade to `None`/placeholders rather than failing the
/// fetch; the engine's schema varies across sites and versions.
pub(crate) fn snapshot_from_info(url: &str, info: &Value) -> VideoSnapshot {
    let formats = info["formats"].as_array().map(Vec::as_slice).unwrap_or(&[]);

    VideoSnapshot {
        id: info["id"].as_str().unwrap_or_default().to_string(),
        title: info["title"]
            .as_str()
            .unwrap_or("Unknown Title")
            .to_string(),
        duration_secs: info["duration"]
            .as_f64()
            .filter(|d| *d >= 0.0)
            .map(|d| d as u64),
        view_count: info["view_count"].as_u64(),
        best_height: highest_resolution(formats),
        uploader: info["uploader"].as_str().map(str::to_string),
        thumbnail: info["thumbnail"].as_str().map(str::to_string),
        webpage_url: info["webpage_url"].as_str().unwrap_or(url).to_string(),
        fetched_at: Utc::now(),
    }
}

/// Maximum height among formats that carry a video codec
///
/// A format counts as video unless its `vcodec` is the literal `"none"`.
/// Ties keep the first-seen format; heights are compared strictly. Returns
/// `None` when no video format exists or none of them reports a height.
pub(crate) fn highest_resolution(formats: &[Value]) -> Option<u32> {
    let mut best: Option<u64> = None;

    for format in formats {
        if format["vcodec"].as_str() == Some("none") {
            continue;
        }
        let height = format["height"].as_u64().unwrap_or(0);
        match best {
            Some(current) if height > current => best = Some(height),
            None => best = Some(height),
            _ => {}
        }
    }

    best.filter(|h| *h > 0).map(|h| h as u32)
}
