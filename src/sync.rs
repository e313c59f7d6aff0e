use crate::cue::{Cue, CueItem};
use crate::error::CueError;
use crate::fetch::ResourceFetcher;
use crate::parser::Parser;

/// Keeps the cue list of one text track and projects it against the
/// playback time.
///
/// Loading is split into [`request`](Self::request), [`LoadRequest::fetch`]
/// and [`apply`](Self::apply) so the fetch can run while the caller keeps
/// handling events. Every request bumps a generation counter, and outcomes
/// from older generations are dropped when applied.
#[derive(Debug, Default)]
pub struct CueSynchronizer {
    resource_id: Option<String>,
    generation: u64,
    cues: Vec<Cue>,
}

/// A pending fetch for a text track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    resource_id: String,
    generation: u64,
}

/// A finished fetch, ready to be applied.
#[derive(Debug)]
pub struct LoadOutcome {
    resource_id: String,
    generation: u64,
    result: Result<Vec<Cue>, CueError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The identifier did not change, nothing was fetched.
    Unchanged,
    Loaded(usize),
    Failed,
    /// A newer request was issued while this one was in flight.
    Stale,
}

impl LoadRequest {
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub async fn fetch<F>(self, fetcher: &F) -> LoadOutcome
    where
        F: ResourceFetcher + ?Sized,
    {
        let result = match fetcher.fetch_text(&self.resource_id).await {
            Ok(body) => Parser::new().parse(&body),
            Err(err) => Err(err),
        };
        LoadOutcome {
            resource_id: self.resource_id,
            generation: self.generation,
            result,
        }
    }
}

impl LoadOutcome {
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }
}

impl CueSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Points the synchronizer at a track. Returns `None` when it already
    /// tracks `resource_id`; otherwise drops the current cues and returns
    /// the fetch to perform.
    pub fn request(&mut self, resource_id: &str) -> Option<LoadRequest> {
        if self.resource_id.as_deref() == Some(resource_id) {
            return None;
        }
        self.generation += 1;
        self.resource_id = Some(resource_id.to_string());
        self.cues.clear();
        Some(LoadRequest {
            resource_id: resource_id.to_string(),
            generation: self.generation,
        })
    }

    pub fn apply(&mut self, outcome: LoadOutcome) -> LoadStatus {
        if outcome.generation != self.generation {
            tracing::debug!(
                "Discarding stale cues for {} (generation {}, current {})",
                outcome.resource_id,
                outcome.generation,
                self.generation
            );
            return LoadStatus::Stale;
        }
        match outcome.result {
            Ok(cues) => {
                tracing::debug!("Loaded {} cues from {}", cues.len(), outcome.resource_id);
                let count = cues.len();
                self.cues = cues;
                LoadStatus::Loaded(count)
            }
            Err(err) => {
                tracing::error!(resource = %outcome.resource_id, "{}", err);
                self.cues.clear();
                LoadStatus::Failed
            }
        }
    }

    /// Requests, fetches and applies in one go.
    pub async fn load<F>(&mut self, resource_id: &str, fetcher: &F) -> LoadStatus
    where
        F: ResourceFetcher + ?Sized,
    {
        match self.request(resource_id) {
            Some(request) => {
                let outcome = request.fetch(fetcher).await;
                self.apply(outcome)
            }
            None => LoadStatus::Unchanged,
        }
    }

    /// Forgets the current track. A fetch still in flight will be stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.resource_id = None;
        self.cues.clear();
    }

    pub fn render(&self, current_time: f64) -> Vec<CueItem> {
        self.cues
            .iter()
            .map(|cue| CueItem::project(cue, current_time))
            .collect()
    }
}
