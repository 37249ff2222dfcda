//! Download operation driving the extraction engine and the muxing binary
//!
//! The engine performs the transfer and (for merged output) invokes the
//! muxing binary itself; this module builds the engine invocation, streams
//! its progress lines into [`ProgressEvent`]s, and classifies failures.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::core::extractor::engine_failure_message;
use crate::core::models::{AppError, AppResult, OutputMode, ProgressEvent};
use crate::core::progress::{parse_progress_line, progress_template};
use crate::utils::file_utils::sanitize_filename;

/// One user-confirmed download

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,

    /// Destination directory; must already exist and be writable, no check
    /// is performed before the engine starts
    pub dest_dir: PathBuf,

    pub mode: OutputMode,

    /// Requested vertical resolution; only meaningful for merged output
    pub target_height: u32,

    /// Title from the current metadata snapshot, used for the output name
    pub title: String,
}

/// Transfer side of the extraction engine

pub struct Downloader {
    engine_bin: PathBuf,
    muxer_bin: String,
}

impl Downloader {
    pub fn new(engine_bin: impl Into<PathBuf>, muxer_bin: impl Into<String>) -> Self {
        Self {
            engine_bin: engine_bin.into(),
            muxer_bin: muxer_bin.into(),
        }
    }

    pub fn muxer_bin(&self) -> &str {
        &self.muxer_bin
    }

    pub fn muxer_available(&self) -> bool {
        which::which(&self.muxer_bin).is_ok()
    }

    /// Locate the muxing binary on the search path
    ///
    /// Merged output is a hard precondition failure without it, reported
    /// before any network activity starts.
    pub fn ensure_muxer(&self) -> AppResult<PathBuf> {
        which::which(&self.muxer_bin).map_err(|_| {
            AppError::Precondition(format!(
                "{} is not installed or not found in system PATH. \
                 Install it to enable merging of video and audio streams.",
                self.muxer_bin
            ))
        })
    }

    /// Run one download to completion, error, or process termination
    ///
    /// Progress events are pushed through `events` as the engine prints
    /// them; the single terminal `finished`/`error` event is sent from here
    /// once the engine exits. No cancellation and no cleanup of partial
    /// files.
    pub async fn run(
        &self,
        request: &DownloadRequest,
        events: UnboundedSender<ProgressEvent>,
    ) -> AppResult<()> {
        if request.mode == OutputMode::MuxedVideo {
            self.ensure_muxer()?;
        }

        let args = build_engine_args(request);
        debug!("Engine invocation: {} {:?}", self.engine_bin.display(), args);

        let mut child = Command::new(&self.engine_bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => AppError::Precondition(format!(
                    "{} is not installed or not found in system PATH.",
                    self.engine_bin.display()
                )),
                _ => AppError::Unexpected(format!(
                    "Failed to start {}: {}",
                    self.engine_bin.display(),
                    e
                )),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::Unexpected("engine stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AppError::Unexpected("engine stderr was not captured".to_string()))?;

        // Drain stderr concurrently so a chatty engine cannot stall on a
        // full pipe while we read stdout.
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let mut reader = BufReader::new(stderr);
            let _ = reader.read_to_end(&mut buf).await;
            buf
        });

        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(event) = parse_progress_line(&line) {
                let _ = events.send(event);
            }
        }

        let status = child.wait().await?;
        let stderr_buf = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let _ = events.send(ProgressEvent::errored());
            let message = engine_failure_message(&stderr_buf, status.code());
            warn!("Engine exited with failure: {}", message);
            return Err(AppError::Extraction(message));
        }

        let _ = events.send(ProgressEvent::finished());
        info!(
            "✅ Download finished into {}",
            request.dest_dir.display()
        );
        Ok(())
    }
}

/// Full engine argument list for one request
pub(crate) fn build_engine_args(request: &DownloadRequest) -> Vec<String> {
    let mut args = vec![
        "--newline".to_string(),
        "--no-warnings".to_string(),
        "--no-playlist".to_string(),
        "--progress-template".to_string(),
        progress_template(),
        "-f".to_string(),
        format_selector(request.mode, request.target_height),
    ];

    if request.mode == OutputMode::MuxedVideo {
        args.push("--merge-output-format".to_string());
        args.push("mp4".to_string());
    }

    args.push("-o".to_string());
    args.push(output_template(&request.dest_dir, &request.title));
    args.push("--".to_string());
    args.push(request.url.clone());
    args
}

/// Engine format selector: best audio alone, or best video at-or-below the
/// requested height paired with best audio
pub(crate) fn format_selector(mode: OutputMode, target_height: u32) -> String {
    match mode {
        OutputMode::AudioOnly => "bestaudio".to_string(),
        OutputMode::MuxedVideo => {
            format!("bestvideo[height<={}]+bestaudio/best", target_height)
        }
    }
}

/// Output template handed to the engine
///
/// The on-disk name always uses the sanitized title; `%` is doubled because
/// the engine treats it as template syntax. The extension stays under the
/// engine's control.
pub(crate) fn output_template(dest_dir: &Path, title: &str) -> String {
    let stem = sanitize_filename(title).replace('%', "%%");
    dest_dir
        .join(format!("{}.%(ext)s", stem))
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: OutputMode) -> DownloadRequest {
        DownloadRequest {
            url: "https://www.youtube.com/watch?v=abc123".to_string(),
            dest_dir: PathBuf::from("/tmp/videos"),
            mode,
            target_height: 360,
            title: "A Video".to_string(),
        }
    }

    #[test]
    fn audio_only_selects_best_audio() {
        assert_eq!(format_selector(OutputMode::AudioOnly, 360), "bestaudio");
    }

    #[test]
    fn muxed_video_caps_height_and_falls_back_to_best() {
        assert_eq!(
            format_selector(OutputMode::MuxedVideo, 1080),
            "bestvideo[height<=1080]+bestaudio/best"
        );
    }

    #[test]
    fn output_template_sanitizes_the_title() {
        let template = output_template(Path::new("/tmp/videos"), "What? A/B \"Test\"");
        assert_eq!(template, "/tmp/videos/What_ A_B _Test_.%(ext)s");
    }

    #[test]
    fn output_template_escapes_engine_syntax() {
        let template = output_template(Path::new("/d"), "100% legit");
        assert_eq!(template, "/d/100%% legit.%(ext)s");
    }

    #[test]
    fn muxed_args_request_an_mp4_merge() {
        let args = build_engine_args(&request(OutputMode::MuxedVideo));

        let merge_at = args
            .iter()
            .position(|a| a == "--merge-output-format")
            .expect("merge flag present");
        assert_eq!(args[merge_at + 1], "mp4");

        let format_at = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[format_at + 1], "bestvideo[height<=360]+bestaudio/best");
    }

    #[test]
    fn audio_args_skip_the_merge_flag() {
        let args = build_engine_args(&request(OutputMode::AudioOnly));
        assert!(!args.iter().any(|a| a == "--merge-output-format"));
    }

    #[test]
    fn url_rides_behind_the_option_terminator() {
        let args = build_engine_args(&request(OutputMode::AudioOnly));
        let terminator = args.iter().position(|a| a == "--").unwrap();
        assert_eq!(args[terminator + 1], request(OutputMode::AudioOnly).url);
        assert_eq!(terminator + 2, args.len());
    }

    #[test]
    fn missing_muxer_is_a_precondition_failure() {
        let downloader = Downloader::new("yt-dlp", "definitely-not-a-real-muxer-bin");
        let err = downloader.ensure_muxer().unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
        assert!(err.to_string().contains("not found in system PATH"));
    }
}
