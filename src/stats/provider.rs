use async_trait::async_trait;
use thiserror::Error;

use super::types::StatsSummary;
use crate::teams::TeamIdentity;

/// Why a single source attempt failed. All variants are non-fatal: the
/// acquisition chain reacts by retrying, relaxing the query window, or
/// advancing to the next source.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("upstream returned HTTP {0}")]
    Http(u16),

    #[error("request failed: {0}")]
    Network(String),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("team not known to this source")]
    TeamNotFound,

    #[error("no usable rows in response")]
    Empty,
}

impl FetchFailure {
    /// Failures that may clear up on an immediate bounded retry. Access
    /// restrictions usually present as HTTP errors and won't, but one cheap
    /// retry is within the latency budget.
    pub fn transient(&self) -> bool {
        matches!(
            self,
            FetchFailure::Timeout | FetchFailure::Http(_) | FetchFailure::Network(_)
        )
    }

    /// Failures worth one relaxed-window requery against the same source
    /// (an earlier reporting period) before moving down the chain.
    pub fn worth_relaxed_window(&self) -> bool {
        matches!(self, FetchFailure::Empty | FetchFailure::Malformed(_))
    }
}

/// Reporting window for a stats query. `Current` is the default; `Relaxed`
/// widens to the previous season when the current one has no usable rows
/// yet (season start, provider lag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsWindow {
    Current,
    Relaxed,
}

/// A single upstream source of team performance statistics.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Fetch a stats record for the given resolved team. Implementations
    /// return `TeamNotFound` when the identity lacks the key they need,
    /// which makes the chain skip them without burning the retry budget.
    async fn fetch_stats(
        &self,
        team: &TeamIdentity,
        window: StatsWindow,
    ) -> Result<StatsSummary, FetchFailure>;

    /// Human-readable name for logging and the report's source list.
    fn name(&self) -> &str;
}
