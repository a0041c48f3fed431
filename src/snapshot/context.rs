// Per-view snapshot state
//
// Holds the selected phase and dimension and the snapshot fetched for them.
// Fetches are tickets: every change of phase or dimension, and every explicit
// refresh, issues a new FetchRequest. When a response arrives it is applied
// only if its key is still the selected one and nothing newer for that key
// has been applied. Superseded responses are dropped on completion; nothing
// is aborted in flight.

use crate::snapshot::model::{Experiment, Snapshot, SnapshotAnalysis, SnapshotKey, SnapshotResponse};
use crate::snapshot::source::SnapshotSource;
use crate::snapshot::SnapshotError;
use std::fmt;

/// A fetch the caller should perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub key: SnapshotKey,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Response (or error) became the current state
    Applied,
    /// Response was for a stale key or an older generation and was ignored
    Superseded,
}

/// Picks the analysis to display out of a snapshot's stored analyses
pub trait AnalysisSelector {
    fn select<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a SnapshotAnalysis>;
}

/// Default selection: the snapshot's primary (first) analysis
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimaryAnalysis;

impl AnalysisSelector for PrimaryAnalysis {
    fn select<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a SnapshotAnalysis> {
        snapshot.analyses.first()
    }
}

pub struct SnapshotContext {
    experiment: Experiment,
    phase: usize,
    dimension: String,
    /// Last generation handed out
    issued: u64,
    /// Generation of the state currently held, 0 when nothing applied yet
    applied: u64,
    pending: Option<FetchRequest>,
    response: Option<SnapshotResponse>,
    error: Option<SnapshotError>,
    selector: Box<dyn AnalysisSelector>,
}

impl fmt::Debug for SnapshotContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotContext")
            .field("experiment", &self.experiment.id)
            .field("phase", &self.phase)
            .field("dimension", &self.dimension)
            .field("issued", &self.issued)
            .field("applied", &self.applied)
            .field("pending", &self.pending)
            .field("loaded", &self.response.is_some())
            .field("error", &self.error)
            .finish()
    }
}

impl SnapshotContext {
    /// Create the context for a freshly mounted view
    ///
    /// Selects the most recent phase and issues the initial fetch, available
    /// through [`pending_request`](Self::pending_request).
    pub fn new(experiment: Experiment) -> Self {
        Self::with_initial_request(experiment).0
    }

    fn with_initial_request(experiment: Experiment) -> (Self, FetchRequest) {
        let phase = experiment.initial_phase();
        let mut context = Self {
            experiment,
            phase,
            dimension: String::new(),
            issued: 0,
            applied: 0,
            pending: None,
            response: None,
            error: None,
            selector: Box::new(PrimaryAnalysis),
        };
        let request = context.issue();
        (context, request)
    }

    pub fn with_selector(mut self, selector: impl AnalysisSelector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    pub fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn key(&self) -> SnapshotKey {
        SnapshotKey::new(self.experiment.id.clone(), self.phase, self.dimension.clone())
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.response.as_ref().map(|r| &r.snapshot)
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.response.as_ref().and_then(|r| r.latest.as_ref())
    }

    pub fn analysis(&self) -> Option<&SnapshotAnalysis> {
        self.snapshot().and_then(|s| self.selector.select(s))
    }

    pub fn latest_analysis(&self) -> Option<&SnapshotAnalysis> {
        self.latest().and_then(|s| self.selector.select(s))
    }

    pub fn error(&self) -> Option<&SnapshotError> {
        self.error.as_ref()
    }

    pub fn pending_request(&self) -> Option<&FetchRequest> {
        self.pending.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Select a phase; returns the fetch to run when the selection changed
    pub fn set_phase(&mut self, phase: usize) -> Option<FetchRequest> {
        if phase == self.phase {
            return None;
        }
        self.phase = phase;
        Some(self.reset_for_new_key())
    }

    /// Select a dimension (empty for none); returns the fetch to run when the
    /// selection changed
    pub fn set_dimension(&mut self, dimension: impl Into<String>) -> Option<FetchRequest> {
        let dimension = dimension.into();
        if dimension == self.dimension {
            return None;
        }
        self.dimension = dimension;
        Some(self.reset_for_new_key())
    }

    /// Re-fetch the current key, e.g. after the analysis was re-run.
    /// Loaded data stays visible until the new response lands.
    pub fn mutate_snapshot(&mut self) -> FetchRequest {
        self.issue()
    }

    /// Apply the result of a fetch if it is still wanted
    pub fn complete(
        &mut self,
        request: &FetchRequest,
        result: Result<SnapshotResponse, SnapshotError>,
    ) -> FetchOutcome {
        if request.key != self.key() || request.generation <= self.applied {
            tracing::debug!(
                key = %request.key,
                generation = request.generation,
                current = %self.key(),
                applied = self.applied,
                "ignoring superseded snapshot response"
            );
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                self.response = Some(response);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(key = %request.key, "snapshot fetch failed: {}", e);
                self.error = Some(e);
            }
        }
        self.applied = request.generation;

        if self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation <= request.generation)
        {
            self.pending = None;
        }

        FetchOutcome::Applied
    }

    /// Run the outstanding fetch (or a refresh of the current key) against a source
    pub fn refresh(&mut self, source: &dyn SnapshotSource) -> FetchOutcome {
        let request = match self.pending.clone() {
            Some(request) => request,
            None => self.issue(),
        };
        let result = source.fetch(&request.key);
        self.complete(&request, result)
    }

    fn reset_for_new_key(&mut self) -> FetchRequest {
        self.response = None;
        self.error = None;
        self.issue()
    }

    fn issue(&mut self) -> FetchRequest {
        self.issued += 1;
        let request = FetchRequest {
            key: self.key(),
            generation: self.issued,
        };
        tracing::debug!(key = %request.key, generation = request.generation, "snapshot fetch issued");
        self.pending = Some(request.clone());
        request
    }
}

/// Explicit provider for a [`SnapshotContext`]
///
/// Consumers read the context through the scope. Reading before a view has
/// mounted, or after it unmounted, is a [`SnapshotError::NotMounted`] error.
#[derive(Debug, Default)]
pub struct SnapshotScope {
    context: Option<SnapshotContext>,
}

impl SnapshotScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a view for `experiment`, discarding any previous view's state.
    /// Returns the initial fetch.
    pub fn mount(&mut self, experiment: Experiment) -> FetchRequest {
        let (context, request) = SnapshotContext::with_initial_request(experiment);
        self.context = Some(context);
        request
    }

    /// Tear down the view; returns false when nothing was mounted
    pub fn unmount(&mut self) -> bool {
        self.context.take().is_some()
    }

    pub fn is_mounted(&self) -> bool {
        self.context.is_some()
    }

    pub fn get(&self) -> Result<&SnapshotContext, SnapshotError> {
        self.context.as_ref().ok_or(SnapshotError::NotMounted)
    }

    pub fn get_mut(&mut self) -> Result<&mut SnapshotContext, SnapshotError> {
        self.context.as_mut().ok_or(SnapshotError::NotMounted)
    }
}
