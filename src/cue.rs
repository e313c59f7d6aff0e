use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Identifies a cue within its track. Cues without an identifier line are
/// numbered by their position, starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum CueId {
    Index(usize),
    Named(String),
}

impl fmt::Display for CueId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CueId::Index(idx) => write!(fmt, "{}", idx),
            CueId::Named(name) => write!(fmt, "{}", name),
        }
    }
}

/// A single timed text cue, as written in the source track.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub(crate) id: CueId,
    pub(crate) start_time: String,
    pub(crate) end_time: String,
    pub(crate) text: String,
    pub(crate) settings: Option<String>,
    pub(crate) show_at: Duration,
    pub(crate) hide_at: Duration,
}

impl Cue {
    pub fn id(&self) -> &CueId {
        &self.id
    }

    /// The start timestamp exactly as it appeared in the track.
    pub fn start_time(&self) -> &str {
        &self.start_time
    }

    pub fn end_time(&self) -> &str {
        &self.end_time
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Raw cue settings following the end timestamp, e.g. `align:start line:0`.
    pub fn settings(&self) -> Option<&str> {
        self.settings.as_deref()
    }

    pub fn start_seconds(&self) -> f64 {
        self.show_at.as_secs_f64()
    }

    pub fn end_seconds(&self) -> f64 {
        self.hide_at.as_secs_f64()
    }

    /// The interval is half-open: a cue ending at 3s is no longer shown at 3s.
    pub fn is_active_at(&self, current_time: f64) -> bool {
        self.start_seconds() <= current_time && current_time < self.end_seconds()
    }
}

/// Formats a duration the way cue timings are written, `HH:MM:SS.mmm`.
/// Hours widen past two digits rather than wrapping.
pub fn format_timestamp(timestamp: Duration) -> String {
    let total_secs = timestamp.as_secs();
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60,
        timestamp.subsec_millis()
    )
}

/// Display projection of a cue for a given playback time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CueItem {
    pub id: CueId,
    pub label: String,
    pub start_time: String,
    pub active: bool,
    pub time: f64,
}

impl CueItem {
    pub fn project(cue: &Cue, current_time: f64) -> Self {
        CueItem {
            id: cue.id.clone(),
            label: cue.text.clone(),
            start_time: cue.start_time.clone(),
            active: cue.is_active_at(current_time),
            time: cue.start_seconds(),
        }
    }
}
