use serde::Serialize;

use crate::cue::CueItem;
use crate::iiif::{get_label, Manifest, Resource, Vault};
use crate::sync::{CueSynchronizer, LoadOutcome, LoadRequest, LoadStatus};

pub const LABEL_LANGUAGE: &str = "en";
pub const TEXT_TRACK_FORMAT: &str = "text/vtt";

/// What the main area shows for the active canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Surface {
    Player {
        painting: Resource,
        tracks: Vec<Resource>,
    },
    Image {
        painting: Resource,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub canvas_id: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigatorView {
    pub active_resource: String,
    pub resources: Vec<Resource>,
    pub cues: Vec<CueItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerView {
    pub header: String,
    pub current_time: f64,
    pub main: Surface,
    pub media: Vec<MediaItem>,
    pub aside: Option<NavigatorView>,
}

/// Viewer state for one manifest. The vault is passed into each call that
/// needs it rather than held.
#[derive(Debug, Default)]
pub struct Viewer {
    active_canvas: Option<String>,
    painting: Option<Resource>,
    tracks: Vec<Resource>,
    current_time: f64,
    navigator: CueSynchronizer,
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_canvas(&self) -> Option<&str> {
        self.active_canvas.as_deref()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_media(&self) -> bool {
        self.painting
            .as_ref()
            .map_or(false, |painting| painting.kind.is_time_based())
    }

    /// The cue navigator, present only for time-based media with a text track.
    pub fn navigator(&self) -> Option<&CueSynchronizer> {
        if self.is_media() && !self.tracks.is_empty() {
            Some(&self.navigator)
        } else {
            None
        }
    }

    /// Makes `canvas_id` the active canvas. Returns the cue fetch to run when
    /// the new canvas mounts the navigator on a different track. Selecting
    /// the canvas that is already active does nothing.
    pub fn select_canvas<V>(&mut self, vault: &V, canvas_id: &str) -> Option<LoadRequest>
    where
        V: Vault + ?Sized,
    {
        if self.active_canvas.as_deref() == Some(canvas_id) {
            return None;
        }

        tracing::debug!("Selecting canvas {}", canvas_id);
        self.active_canvas = Some(canvas_id.to_string());
        self.painting = vault.painting_resource(canvas_id).cloned();
        self.tracks = vault
            .supplementing_resources(canvas_id, TEXT_TRACK_FORMAT)
            .into_iter()
            .cloned()
            .collect();
        self.current_time = 0.0;

        if self.painting.is_none() {
            tracing::warn!("Canvas {} has no painting resource", canvas_id);
        }

        match self.tracks.first() {
            Some(track) if self.is_media() => {
                let track_id = track.id.clone();
                self.navigator.request(&track_id)
            }
            _ => {
                self.navigator.reset();
                None
            }
        }
    }

    /// Switches the navigator to another text track of the active canvas.
    pub fn select_track(&mut self, resource_id: &str) -> Option<LoadRequest> {
        if self.navigator().is_none() {
            tracing::warn!("No cue navigator for the active canvas");
            return None;
        }
        if !self.tracks.iter().any(|track| track.id == resource_id) {
            tracing::warn!("{} is not a text track of the active canvas", resource_id);
            return None;
        }
        self.navigator.request(resource_id)
    }

    pub fn apply_load(&mut self, outcome: LoadOutcome) -> LoadStatus {
        self.navigator.apply(outcome)
    }

    /// Playback time callback from the player. Never triggers a fetch.
    pub fn set_current_time(&mut self, current_time: f64) {
        self.current_time = current_time;
    }

    pub fn view(&self, manifest: &Manifest) -> ViewerView {
        let main = match &self.painting {
            Some(painting) if self.is_media() => Surface::Player {
                painting: painting.clone(),
                tracks: self.tracks.clone(),
            },
            Some(painting) => Surface::Image {
                painting: painting.clone(),
            },
            None => Surface::Empty,
        };

        let media = manifest
            .canvases()
            .iter()
            .map(|canvas| MediaItem {
                canvas_id: canvas.id.clone(),
                label: get_label(&canvas.label, LABEL_LANGUAGE),
                active: self.active_canvas.as_deref() == Some(canvas.id.as_str()),
            })
            .collect();

        let aside = self.navigator().map(|navigator| NavigatorView {
            active_resource: navigator.resource_id().unwrap_or_default().to_string(),
            resources: self.tracks.clone(),
            cues: navigator.render(self.current_time),
        });

        ViewerView {
            header: get_label(&manifest.label, LABEL_LANGUAGE),
            current_time: self.current_time,
            main,
            media,
            aside,
        }
    }
}
