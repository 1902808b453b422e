//! Presentation state machine
//!
//! `Overview` ⇄ `Focused(record, transform)`. Writes are serialized behind a
//! single lock; readers get snapshots from a `watch` channel and never block
//! a writer for longer than a clone.
//!
//! # Overlapping submits
//!
//! Every submit and reset takes the next value of a monotonic generation
//! counter when it starts. What happens when an older submit completes after
//! a newer one was issued depends on [`FencePolicy`]:
//!
//! - `LastWriteWins` (default): whichever submit *completes* last is shown
//! - `DiscardStale`: only the most recently *issued* generation may write;
//!   older completions are dropped, and a reset drops everything in flight
//!
//! In-flight model calls are never cancelled under either policy.

use crate::error::AtlasError;
use hqmap_extract::ExtractionPipeline;
use hqmap_geo::{GeoFocusResolver, ViewportTransform};
use hqmap_record::{EntityRecord, RecordSource};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// What the rendering layer should draw
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PresentationState {
    /// Whole map, no panels
    #[default]
    Overview,
    /// Map focused on a record
    Focused {
        /// Record shown in the side panels
        record: Arc<EntityRecord>,
        /// Camera transform, applied atomically
        transform: ViewportTransform,
    },
}

impl PresentationState {
    /// Whether a record is shown
    #[inline]
    #[must_use]
    pub fn is_focused(&self) -> bool {
        matches!(self, Self::Focused { .. })
    }

    /// The shown record, if any
    #[must_use]
    pub fn record(&self) -> Option<&EntityRecord> {
        match self {
            Self::Focused { record, .. } => Some(record),
            Self::Overview => None,
        }
    }

    /// Transform to apply; identity in overview
    #[must_use]
    pub fn transform(&self) -> ViewportTransform {
        match self {
            Self::Focused { transform, .. } => *transform,
            Self::Overview => ViewportTransform::IDENTITY,
        }
    }
}

/// How completions of superseded submits are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FencePolicy {
    /// The last submit to complete is shown
    #[default]
    LastWriteWins,
    /// Completions older than the newest issued generation are dropped
    DiscardStale,
}

impl fmt::Display for FencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LastWriteWins => "last_write_wins",
            Self::DiscardStale => "discard_stale",
        })
    }
}

impl FromStr for FencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_write_wins" => Ok(Self::LastWriteWins),
            "discard_stale" => Ok(Self::DiscardStale),
            other => Err(format!("unknown fence policy: {other}")),
        }
    }
}

/// Outcome of one submit
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Generation issued to this submit
    pub generation: u64,
    /// Resolved record
    pub record: Arc<EntityRecord>,
    /// How the record was produced
    pub source: RecordSource,
    /// Transform computed for the record
    pub transform: ViewportTransform,
    /// Whether the result became the presentation state
    pub applied: bool,
}

/// Drives the presentation state from queries
pub struct ViewStateController {
    pipeline: Arc<ExtractionPipeline>,
    resolver: GeoFocusResolver,
    fence: FencePolicy,
    issued: AtomicU64,
    applied: Mutex<u64>,
    state: watch::Sender<PresentationState>,
}

impl fmt::Debug for ViewStateController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewStateController")
            .field("fence", &self.fence)
            .field("issued", &self.issued.load(Ordering::SeqCst))
            .field("applied", &*self.applied.lock())
            .finish_non_exhaustive()
    }
}

impl ViewStateController {
    /// Create controller in `Overview`
    #[must_use]
    pub fn new(pipeline: Arc<ExtractionPipeline>, resolver: GeoFocusResolver) -> Self {
        Self {
            pipeline,
            resolver,
            fence: FencePolicy::default(),
            issued: AtomicU64::new(0),
            applied: Mutex::new(0),
            state: watch::Sender::new(PresentationState::Overview),
        }
    }

    /// With fence policy
    #[inline]
    #[must_use]
    pub fn with_fence(mut self, fence: FencePolicy) -> Self {
        self.fence = fence;
        self
    }

    /// Active fence policy
    #[inline]
    #[must_use]
    pub fn fence(&self) -> FencePolicy {
        self.fence
    }

    /// Resolve a query and focus on the result
    ///
    /// Blank or otherwise invalid queries are rejected before a generation
    /// is issued and leave the state untouched.
    ///
    /// # Errors
    /// `AtlasError::Extract` with `InvalidQuery`
    #[tracing::instrument(name = "controller.submit", skip(self), fields(fence = %self.fence))]
    pub async fn submit(&self, entity_name: &str) -> Result<Submission, AtlasError> {
        self.pipeline.validate(entity_name)?;
        let generation = self.issue();

        let resolution = self.pipeline.resolve_detailed(entity_name).await?;
        let transform = self.resolver.resolve(&resolution.record.location);
        let record = Arc::new(resolution.record);

        let applied = self.apply(
            generation,
            PresentationState::Focused {
                record: Arc::clone(&record),
                transform,
            },
        );

        Ok(Submission {
            generation,
            record,
            source: resolution.source,
            transform,
            applied,
        })
    }

    /// Return to `Overview`; returns whether a record was being shown
    ///
    /// Under `DiscardStale` this also fences off every submit in flight.
    pub fn reset(&self) -> bool {
        let generation = self.issue();
        let mut applied = self.applied.lock();
        *applied = generation;
        let was_focused = self.state.send_replace(PresentationState::Overview).is_focused();
        if was_focused {
            tracing::info!(generation, "reset to overview");
        }
        was_focused
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> PresentationState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PresentationState> {
        self.state.subscribe()
    }

    /// Newest generation issued
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Generation of the state currently shown
    #[must_use]
    pub fn applied_generation(&self) -> u64 {
        *self.applied.lock()
    }

    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply(&self, generation: u64, next: PresentationState) -> bool {
        let mut applied = self.applied.lock();
        if self.fence == FencePolicy::DiscardStale && generation != self.generation() {
            tracing::debug!(
                generation,
                newest = self.generation(),
                "discarding stale result"
            );
            return false;
        }
        *applied = generation;
        let code = next.record().map(|r| r.location.region_code.clone());
        self.state.send_replace(next);
        tracing::info!(generation, region = ?code, "focused");
        true
    }
}
