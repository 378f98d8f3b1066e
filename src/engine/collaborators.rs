//! Injected collaborator seams.
//!
//! The engine only sees these traits; production wiring lives in `main`. The
//! sentiment analyzer in particular is an external system consumed as an
//! opaque descriptor string, so the default implementation simply reports
//! nothing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::scoring::MarketLine;
use crate::stats::{EspnStats, FormSummary, H2hRecord};
use crate::teams::TeamIdentity;

/// Opaque community-sentiment descriptor for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSentiment {
    /// Natural-language summary produced by the external analyzer.
    pub summary: String,
    /// Discussion threads the summary was distilled from.
    pub thread_urls: Vec<String>,
}

#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    /// `None` when no sentiment is available; the engine scores a zero tilt.
    async fn team_sentiment(&self, team: &str) -> Option<TeamSentiment>;
}

/// Default analyzer: sentiment is disabled.
pub struct NoSentiment;

#[async_trait]
impl SentimentAnalyzer for NoSentiment {
    async fn team_sentiment(&self, _team: &str) -> Option<TeamSentiment> {
        None
    }
}

/// Matchup-level context beyond raw stats: recent form, head-to-head, and
/// the market's betting line. Everything is best-effort; `None` disables the
/// corresponding adjustment or report section.
#[async_trait]
pub trait GameContextProvider: Send + Sync {
    async fn form(&self, team: &TeamIdentity) -> Option<FormSummary>;
    async fn head_to_head(
        &self,
        team: &TeamIdentity,
        opponent: &TeamIdentity,
    ) -> Option<H2hRecord>;
    async fn market_line(
        &self,
        home: &TeamIdentity,
        away: &TeamIdentity,
        date: Option<&str>,
    ) -> Option<MarketLine>;
}

#[async_trait]
impl GameContextProvider for EspnStats {
    async fn form(&self, team: &TeamIdentity) -> Option<FormSummary> {
        self.fetch_form(team).await.ok()
    }

    async fn head_to_head(
        &self,
        team: &TeamIdentity,
        opponent: &TeamIdentity,
    ) -> Option<H2hRecord> {
        self.fetch_head_to_head(team, opponent).await.ok()
    }

    async fn market_line(
        &self,
        home: &TeamIdentity,
        away: &TeamIdentity,
        date: Option<&str>,
    ) -> Option<MarketLine> {
        self.fetch_matchup_odds(home, away, date)
            .await
            .ok()
            .flatten()
    }
}

/// A roster absence parsed out of a collaborator-supplied
/// `"Player - Status (Reason)"` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryNote {
    pub player: String,
    pub status: String,
    pub reason: String,
}

pub fn parse_injury_note(raw: &str) -> InjuryNote {
    let Some((player, status_part)) = raw.split_once(" - ") else {
        return InjuryNote {
            player: raw.trim().to_string(),
            status: "Unknown".to_string(),
            reason: String::new(),
        };
    };

    let status_part = status_part.trim();
    let (status, reason) = match (status_part.find('('), status_part.rfind(')')) {
        (Some(open), Some(close)) if close > open => (
            status_part[..open].trim().to_string(),
            status_part[open + 1..close].trim().to_string(),
        ),
        _ => (status_part.to_string(), String::new()),
    };

    InjuryNote {
        player: player.trim().to_string(),
        status,
        reason,
    }
}
