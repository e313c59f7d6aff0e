//! IIIF viewer model with a WebVTT cue navigator.
//!
//! [`viewer::Viewer`] decides what a canvas shows; for audio and video with a
//! `text/vtt` supplementing resource it mounts a [`sync::CueSynchronizer`]
//! that flags the cue under the current playback time.

pub mod cue;
pub mod error;
pub mod fetch;
pub mod iiif;
pub mod parser;
pub mod render;
pub mod sync;
pub mod viewer;

pub use cue::{Cue, CueId, CueItem};
pub use error::CueError;
pub use fetch::{DefaultFetcher, ResourceFetcher};
pub use iiif::{get_label, Manifest, Resource, ResourceKind, Vault};
pub use parser::{convert_time_to_seconds, Parser};
pub use sync::{CueSynchronizer, LoadOutcome, LoadRequest, LoadStatus};
pub use viewer::{Surface, Viewer, ViewerView};
