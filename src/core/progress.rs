//! Progress parsing and the per-download reporter state machine
//!
//! The extraction engine is asked for machine-readable progress lines via
//! `--progress-template`; each line is parsed into a [`ProgressEvent`] and
//! folded through a [`ProgressReporter`]. The engine reports per-file
//! completion while a merged download fetches its video and audio streams;
//! the overall `finished` and `error` events are raised by the downloader
//! itself once the engine process exits.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::core::models::{ProgressEvent, ProgressStatus};

/// Callback invoked with each accepted progress payload
pub type ProgressCallback = Arc<dyn Fn(&ProgressPayload) + Send + Sync>;

/// Marker prefixing every progress line the engine is asked to print
pub const PROGRESS_PREFIX: &str = "TF>";

/// Template handed to the engine's `--progress-template` option
///
/// Fields are pipe-separated: status, downloaded bytes, total bytes, total
/// bytes estimate. Unknown values print as `NA`.
pub fn progress_template() -> String {
    format!(
        "{}|%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s",
        PROGRESS_PREFIX
    )
}

/// Parse one engine stdout line into a progress event
///
/// Lines that do not carry the progress marker (regular engine chatter) are
/// ignored. Per-file `finished` lines map to a `Downloading` event so that a
/// multi-stream download keeps reporting; the terminal events come from the
/// downloader.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let rest = rest.strip_prefix('|')?;

    let mut fields = rest.split('|');
    let status = fields.next()?.trim();
    let downloaded = parse_byte_field(fields.next()?);
    let total = parse_byte_field(fields.next()?);
    let estimate = fields.next().map(parse_byte_field).unwrap_or(None);

    match status {
        "downloading" | "finished" => Some(ProgressEvent::downloading(
            downloaded.unwrap_or(0),
            total.or(estimate),
        )),
        _ => None,
    }
}

/// Byte counters print as integers, floats, or `NA` depending on the engine
/// version
fn parse_byte_field(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "NA" || trimmed == "None" {
        return None;
    }
    trimmed
        .parse::<u64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().map(|v| v.max(0.0) as u64))
}

/// Reporter lifecycle for one download

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReporterState {
    Idle,

    Downloading,

    Finished,

    Error,
}

/// Payload emitted to the display layer on every accepted event
///
/// Display is last-write-wins: the frontend only ever shows the newest
/// payload, so dropping intermediate ones is harmless.

#[derive(Debug, Clone, Serialize)]
pub struct ProgressPayload {
    pub download_id: Uuid,

    pub state: ReporterState,

    pub display: String,

    pub percent: Option<f64>,

    pub downloaded_bytes: u64,

    pub total_bytes: Option<u64>,
}

/// Three-state progress reporter: `idle → downloading → finished | error`
///
/// Terminal states absorb every further event; a new download constructs a
/// fresh reporter.

#[derive(Debug)]
pub struct ProgressReporter {
    state: ReporterState,
    percent: Option<f64>,
    downloaded_bytes: u64,
    total_bytes: Option<u64>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            state: ReporterState::Idle,
            percent: None,
            downloaded_bytes: 0,
            total_bytes: None,
        }
    }

    pub fn state(&self) -> ReporterState {
        self.state
    }

    pub fn percent(&self) -> Option<f64> {
        self.percent
    }

    /// Fold one event into the reporter
    ///
    /// Returns `false` when the reporter is already terminal and the event
    /// was ignored.
    pub fn apply(&mut self, event: &ProgressEvent) -> bool {
        if matches!(self.state, ReporterState::Finished | ReporterState::Error) {
            return false;
        }

        match event.status {
            ProgressStatus::Downloading => {
                self.state = ReporterState::Downloading;
                self.downloaded_bytes = event.downloaded_bytes;
                if let Some(total) = event.total_bytes.filter(|t| *t > 0) {
                    self.total_bytes = Some(total);
                    let percent = event.downloaded_bytes as f64 / total as f64 * 100.0;
                    self.percent = Some(percent.min(100.0));
                }
                // Unknown total: hold the last known percent
            }
            ProgressStatus::Finished => {
                self.state = ReporterState::Finished;
                self.percent = Some(100.0);
            }
            ProgressStatus::Error => {
                self.state = ReporterState::Error;
            }
        }

        true
    }

    /// Display string for the one-field progress readout
    pub fn display(&self) -> String {
        match self.state {
            ReporterState::Idle => "Starting download...".to_string(),
            ReporterState::Downloading => match self.percent {
                Some(percent) => format!("Downloading... {:.2}%", percent),
                None => "Downloading...".to_string(),
            },
            ReporterState::Finished => "Download completed!".to_string(),
            ReporterState::Error => "Download failed.".to_string(),
        }
    }

    pub fn payload(&self, download_id: Uuid) -> ProgressPayload {
        ProgressPayload {
            download_id,
            state: self.state,
            display: self.display(),
            percent: self.percent,
            downloaded_bytes: self.downloaded_bytes,
            total_bytes: self.total_bytes,
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_lines_round_trip_through_the_parser() {
        let line = format!("{}|downloading|1048576|4194304|NA", PROGRESS_PREFIX);
        let event = parse_progress_line(&line).unwrap();

        assert_eq!(event.status, ProgressStatus::Downloading);
        assert_eq!(event.downloaded_bytes, 1_048_576);
        assert_eq!(event.total_bytes, Some(4_194_304));
    }

    #[test]
    fn estimate_backfills_missing_total() {
        let line = format!("{}|downloading|100|NA|400", PROGRESS_PREFIX);
        let event = parse_progress_line(&line).unwrap();
        assert_eq!(event.total_bytes, Some(400));
    }

    #[test]
    fn per_file_finished_lines_stay_non_terminal() {
        let line = format!("{}|finished|4194304|4194304|NA", PROGRESS_PREFIX);
        let event = parse_progress_line(&line).unwrap();
        assert_eq!(event.status, ProgressStatus::Downloading);
    }

    #[test]
    fn chatter_and_malformed_lines_are_ignored() {
        assert!(parse_progress_line("[download] Destination: clip.m4a").is_none());
        assert!(parse_progress_line("").is_none());
        assert!(parse_progress_line("TF>").is_none());
        assert!(parse_progress_line("TF>|postprocessing|1|2|3").is_none());
    }

    #[test]
    fn float_byte_counters_are_accepted() {
        let line = format!("{}|downloading|1024.0|2048.7|NA", PROGRESS_PREFIX);
        let event = parse_progress_line(&line).unwrap();
        assert_eq!(event.downloaded_bytes, 1024);
        assert_eq!(event.total_bytes, Some(2048));
    }

    #[test]
    fn reporter_walks_idle_downloading_finished() {
        let mut reporter = ProgressReporter::new();
        assert_eq!(reporter.state(), ReporterState::Idle);
        assert_eq!(reporter.display(), "Starting download...");

        reporter.apply(&ProgressEvent::downloading(50, Some(200)));
        assert_eq!(reporter.state(), ReporterState::Downloading);
        assert_eq!(reporter.percent(), Some(25.0));
        assert_eq!(reporter.display(), "Downloading... 25.00%");

        reporter.apply(&ProgressEvent::finished());
        assert_eq!(reporter.state(), ReporterState::Finished);
        assert_eq!(reporter.percent(), Some(100.0));
        assert_eq!(reporter.display(), "Download completed!");
    }

    #[test]
    fn unknown_total_holds_last_known_percent() {
        let mut reporter = ProgressReporter::new();

        reporter.apply(&ProgressEvent::downloading(100, Some(400)));
        assert_eq!(reporter.percent(), Some(25.0));

        reporter.apply(&ProgressEvent::downloading(300, None));
        assert_eq!(reporter.percent(), Some(25.0));
        assert_eq!(reporter.display(), "Downloading... 25.00%");
    }

    #[test]
    fn no_total_ever_known_shows_generic_message() {
        let mut reporter = ProgressReporter::new();
        reporter.apply(&ProgressEvent::downloading(100, None));
        assert_eq!(reporter.percent(), None);
        assert_eq!(reporter.display(), "Downloading...");
    }

    #[test]
    fn terminal_states_absorb_further_events() {
        let mut reporter = ProgressReporter::new();
        reporter.apply(&ProgressEvent::downloading(10, Some(100)));
        reporter.apply(&ProgressEvent::finished());

        assert!(!reporter.apply(&ProgressEvent::downloading(90, Some(100))));
        assert_eq!(reporter.state(), ReporterState::Finished);

        let mut failed = ProgressReporter::new();
        failed.apply(&ProgressEvent::errored());
        assert!(!failed.apply(&ProgressEvent::finished()));
        assert_eq!(failed.state(), ReporterState::Error);
    }

    #[test]
    fn percent_is_clamped_to_one_hundred() {
        let mut reporter = ProgressReporter::new();
        reporter.apply(&ProgressEvent::downloading(500, Some(400)));
        assert_eq!(reporter.percent(), Some(100.0));
    }
}
