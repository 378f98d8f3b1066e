use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::provider::{FetchFailure, StatsProvider, StatsWindow};
use super::retry::RetryPolicy;
use super::types::{StatsSummary, StatsTier};
use crate::teams::TeamIdentity;

/// Ordered fallback chain over stats sources.
///
/// The chain walks its sources in order and folds to the first success. Per
/// source: one time-bounded call, at most one retry (transient failures
/// only), and one relaxed-window requery when the source answered but had
/// nothing usable. A fully exhausted chain returns the canonical placeholder
/// record — the chain itself never errors.
///
/// Stateless per call: callers that want to avoid repeated lookups cache the
/// returned summaries with their own TTL.
pub struct StatsAcquisitionChain {
    sources: Vec<Arc<dyn StatsProvider>>,
    call_timeout: Duration,
    retry: RetryPolicy,
}

impl StatsAcquisitionChain {
    pub fn new(
        sources: Vec<Arc<dyn StatsProvider>>,
        call_timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        StatsAcquisitionChain {
            sources,
            call_timeout,
            retry,
        }
    }

    /// Names of the configured sources, in chain order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Produce a stats record for the team. Infallible: timeouts, malformed
    /// payloads, and unknown teams all degrade to the next tier, and an
    /// exhausted chain degrades to the placeholder.
    pub async fn fetch(&self, team: &TeamIdentity) -> StatsSummary {
        for (idx, source) in self.sources.iter().enumerate() {
            match self.try_source(source.as_ref(), team).await {
                Ok(mut summary) => {
                    // The tier reflects the position in the chain, not the
                    // provider's own idea of itself.
                    summary.source = if idx == 0 {
                        StatsTier::Primary
                    } else {
                        StatsTier::Secondary
                    };
                    debug!(
                        team = %team.canonical,
                        source = source.name(),
                        "stats acquired"
                    );
                    return summary;
                }
                Err(failure) => {
                    warn!(
                        team = %team.canonical,
                        source = source.name(),
                        %failure,
                        "stats source failed, advancing"
                    );
                }
            }
        }

        warn!(team = %team.canonical, "all stats sources exhausted, using placeholder");
        StatsSummary::placeholder(&team.canonical)
    }

    /// One source: current window first, then a single relaxed-window
    /// requery when the response was empty or unparseable.
    async fn try_source(
        &self,
        source: &dyn StatsProvider,
        team: &TeamIdentity,
    ) -> Result<StatsSummary, FetchFailure> {
        match self.call_with_retry(source, team, StatsWindow::Current).await {
            Ok(summary) => Ok(summary),
            Err(failure) if failure.worth_relaxed_window() => {
                debug!(
                    source = source.name(),
                    team = %team.canonical,
                    "no usable current-window data, relaxing to previous period"
                );
                self.call_with_retry(source, team, StatsWindow::Relaxed).await
            }
            Err(failure) => Err(failure),
        }
    }

    async fn call_with_retry(
        &self,
        source: &dyn StatsProvider,
        team: &TeamIdentity,
        window: StatsWindow,
    ) -> Result<StatsSummary, FetchFailure> {
        let mut last_failure = FetchFailure::Timeout;
        for attempt in 0..self.retry.attempts() {
            if attempt > 0 {
                tokio::time::sleep(self.retry.delay_before(attempt)).await;
            }
            let outcome =
                tokio::time::timeout(self.call_timeout, source.fetch_stats(team, window)).await;
            match outcome {
                Ok(Ok(summary)) => return Ok(summary),
                Ok(Err(failure)) => {
                    if !failure.transient() {
                        return Err(failure);
                    }
                    last_failure = failure;
                }
                Err(_) => last_failure = FetchFailure::Timeout,
            }
        }
        Err(last_failure)
    }
}
