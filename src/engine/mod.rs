//! Matchup orchestration.
//!
//! One comparison runs two independent per-team pipelines (identity
//! resolution → stats acquisition → sentiment → normalization) concurrently
//! and joins them only for the probability, odds, and reasoning steps. Every
//! stage yields a fully-formed value even on total upstream failure; the
//! only caller-visible rejection is an unsupported sport.
//!
//! If the caller drops the overall future (request timeout), the in-flight
//! source calls are abandoned with it — per-team pipelines share no mutable
//! state, so a cancelled run cannot corrupt later placeholder results.

pub mod collaborators;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{comparison_key, MatchupCache};
use crate::error::EngineError;
use crate::history::{HistoryStore, NewComparison};
use crate::scoring::{
    self, compare_with_market, proscons, reasoning, score_team, MatchupPrediction, ModelParams,
    OddsComparison, TeamScore,
};
use crate::stats::{FormSummary, H2hRecord, StatsAcquisitionChain, StatsSummary, StatsTier};
use crate::teams::{TeamIdentity, TeamIdentityResolver};

use collaborators::{
    parse_injury_note, GameContextProvider, InjuryNote, SentimentAnalyzer, TeamSentiment,
};

const SUPPORTED_SPORTS: &[&str] = &["basketball", "nba"];

const NO_SENTIMENT_SUMMARY: &str = "No community sentiment available.";

/// Tunables wired from the configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub model: ModelParams,
    /// TTL for the per-team stats cache.
    pub team_score_ttl: Duration,
    /// TTL for full comparison results in the injected cache.
    pub result_ttl: Duration,
    pub use_form_adjustment: bool,
    pub use_h2h_adjustment: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            model: ModelParams::default(),
            team_score_ttl: Duration::from_secs(30 * 60),
            result_ttl: Duration::from_secs(60 * 60),
            use_form_adjustment: true,
            use_h2h_adjustment: true,
        }
    }
}

/// A comparison request as received from the routing layer.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchupRequest {
    /// The home/reference side.
    pub team1: String,
    pub team2: String,
    /// Defaults to basketball; any other sport is rejected.
    pub sport: Option<String>,
    #[serde(default)]
    pub team1_injuries: Vec<String>,
    #[serde(default)]
    pub team2_injuries: Vec<String>,
    /// Event date in YYYYMMDD form; scopes the cache key and the odds lookup.
    pub date: Option<String>,
}

/// Per-team section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamReport {
    pub name: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub stats_summary: String,
    pub sentiment_summary: String,
    pub injuries: Vec<InjuryNote>,
    pub score: TeamScore,
}

/// Matchup-level verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupVerdict {
    pub predicted_winner: String,
    /// Probability of the favored side, in [0.5, 1].
    pub win_probability: f64,
    pub score_breakdown: String,
    pub confidence_label: String,
    pub reasoning: Vec<String>,
    pub odds: Option<OddsComparison>,
}

/// Where the report's inputs came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Sources {
    pub reddit: Vec<String>,
    pub stats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupReport {
    pub team1: TeamReport,
    pub team2: TeamReport,
    pub matchup: MatchupVerdict,
    pub sources: Sources,
}

struct CachedStats {
    stats: StatsSummary,
    fetched_at: Instant,
}

/// Output of one per-team pipeline.
struct TeamSide {
    stats: StatsSummary,
    sentiment: Option<TeamSentiment>,
    form: Option<FormSummary>,
}

pub struct MatchupEngine {
    resolver: TeamIdentityResolver,
    chain: StatsAcquisitionChain,
    context: Arc<dyn GameContextProvider>,
    sentiment: Arc<dyn SentimentAnalyzer>,
    cache: Arc<dyn MatchupCache>,
    history: Arc<dyn HistoryStore>,
    score_cache: RwLock<HashMap<String, CachedStats>>,
    settings: EngineSettings,
}

impl MatchupEngine {
    pub fn new(
        resolver: TeamIdentityResolver,
        chain: StatsAcquisitionChain,
        context: Arc<dyn GameContextProvider>,
        sentiment: Arc<dyn SentimentAnalyzer>,
        cache: Arc<dyn MatchupCache>,
        history: Arc<dyn HistoryStore>,
        settings: EngineSettings,
    ) -> Self {
        MatchupEngine {
            resolver,
            chain,
            context,
            sentiment,
            cache,
            history,
            score_cache: RwLock::new(HashMap::new()),
            settings,
        }
    }

    /// Run a full comparison. The only error is an unsupported sport; every
    /// upstream failure degrades into the report instead.
    pub async fn analyze(&self, request: &MatchupRequest) -> Result<MatchupReport, EngineError> {
        let sport = request
            .sport
            .as_deref()
            .unwrap_or("basketball")
            .trim()
            .to_lowercase();
        if !SUPPORTED_SPORTS.contains(&sport.as_str()) {
            return Err(EngineError::UnsupportedSport(sport));
        }

        let cache_key = comparison_key(
            &sport,
            &request.team1,
            &request.team2,
            request.date.as_deref(),
        );
        if let Some(cached) = self.cache.get(&cache_key).await {
            match serde_json::from_str::<MatchupReport>(&cached) {
                Ok(report) => {
                    debug!(key = %cache_key, "serving cached comparison");
                    return Ok(report);
                }
                Err(e) => warn!(key = %cache_key, "discarding undecodable cache entry: {e}"),
            }
        }

        let home = self.resolver.resolve(&request.team1);
        let away = self.resolver.resolve(&request.team2);
        if !home.resolved {
            debug!(team = %request.team1, "identity unresolved, pipeline will degrade");
        }
        if !away.resolved {
            debug!(team = %request.team2, "identity unresolved, pipeline will degrade");
        }

        // The two per-team pipelines are independent; run them concurrently
        // and join before the probability step.
        let (home_side, away_side) = tokio::join!(
            self.team_pipeline(&home),
            self.team_pipeline(&away),
        );

        let h2h = if self.settings.use_h2h_adjustment {
            self.context.head_to_head(&home, &away).await
        } else {
            None
        };
        let market = self
            .context
            .market_line(&home, &away, request.date.as_deref())
            .await;

        let home_score = score_team(
            &home_side.stats,
            sentiment_text(&home_side.sentiment),
            &request.team1_injuries,
            home_side.form.as_ref(),
            h2h.as_ref(),
        );
        let away_h2h = h2h.map(|h| h.inverted());
        let away_score = score_team(
            &away_side.stats,
            sentiment_text(&away_side.sentiment),
            &request.team2_injuries,
            away_side.form.as_ref(),
            away_h2h.as_ref(),
        );

        let prediction = scoring::predict(
            &home.canonical,
            &away.canonical,
            &home_score,
            &away_score,
            self.settings.model,
        );

        let odds = market.map(|line| {
            compare_with_market(
                &line,
                &home.canonical,
                &away.canonical,
                &prediction.favored_team,
                prediction.win_probability,
            )
        });

        let reasoning = self.render_reasoning(
            &prediction,
            &home,
            &home_score,
            &home_side,
            &away,
            &away_score,
            &away_side,
            h2h.as_ref(),
            odds.as_ref(),
        );

        let report = MatchupReport {
            team1: team_report(&home, &home_side, &home_score, &request.team1_injuries),
            team2: team_report(&away, &away_side, &away_score, &request.team2_injuries),
            matchup: MatchupVerdict {
                predicted_winner: prediction.favored_team.clone(),
                win_probability: prediction.win_probability,
                score_breakdown: scoring::score_breakdown(
                    &home.canonical,
                    &away.canonical,
                    home_score.final_score,
                    away_score.final_score,
                ),
                confidence_label: prediction.confidence_label.clone(),
                reasoning,
                odds,
            },
            sources: self.collect_sources(&home_side, &away_side),
        };

        self.record_history(&sport, &report);
        match serde_json::to_string(&report) {
            Ok(json) => self.cache.set(&cache_key, json, self.settings.result_ttl).await,
            Err(e) => warn!("failed to serialize report for caching: {e}"),
        }

        info!(
            home = %home.canonical,
            away = %away.canonical,
            winner = %report.matchup.predicted_winner,
            probability = report.matchup.win_probability,
            "comparison complete"
        );
        Ok(report)
    }

    /// Resolve-acquire-analyze for one team. The three lookups are
    /// independent and run concurrently.
    async fn team_pipeline(&self, identity: &TeamIdentity) -> TeamSide {
        let (stats, sentiment, form) = tokio::join!(
            self.cached_stats(identity),
            self.sentiment.team_sentiment(&identity.canonical),
            async {
                if self.settings.use_form_adjustment {
                    self.context.form(identity).await
                } else {
                    None
                }
            },
        );
        TeamSide {
            stats,
            sentiment,
            form,
        }
    }

    /// Read-through per-team stats cache. Two concurrent misses for the same
    /// team may both fetch; the race is idempotent and the last writer
    /// overwrites the entry with an equivalent record.
    async fn cached_stats(&self, identity: &TeamIdentity) -> StatsSummary {
        let key = identity.canonical.to_lowercase();
        {
            let cache = self.score_cache.read().await;
            if let Some(entry) = cache.get(&key) {
                if entry.fetched_at.elapsed() < self.settings.team_score_ttl {
                    return entry.stats.clone();
                }
            }
        }

        let stats = self.chain.fetch(identity).await;
        self.score_cache.write().await.insert(
            key,
            CachedStats {
                stats: stats.clone(),
                fetched_at: Instant::now(),
            },
        );
        stats
    }

    #[allow(clippy::too_many_arguments)]
    fn render_reasoning(
        &self,
        prediction: &MatchupPrediction,
        home: &TeamIdentity,
        home_score: &TeamScore,
        home_side: &TeamSide,
        away: &TeamIdentity,
        away_score: &TeamScore,
        away_side: &TeamSide,
        h2h: Option<&H2hRecord>,
        odds: Option<&OddsComparison>,
    ) -> Vec<String> {
        let (favored_score, underdog_score, favored_form, underdog_form) =
            if prediction.home_favored {
                (home_score, away_score, &home_side.form, &away_side.form)
            } else {
                (away_score, home_score, &away_side.form, &home_side.form)
            };

        let h2h_summary = h2h.map(|h| h2h_line(h, &home.canonical, &away.canonical));

        reasoning::generate(&reasoning::ReasoningInputs {
            favored_team: &prediction.favored_team,
            underdog_team: &prediction.underdog_team,
            favored_score: favored_score.final_score,
            underdog_score: underdog_score.final_score,
            win_probability: prediction.win_probability,
            favored_is_home: prediction.home_favored,
            odds,
            favored_form: favored_form.as_ref(),
            underdog_form: underdog_form.as_ref(),
            h2h_summary: h2h_summary.as_deref(),
        })
    }

    fn collect_sources(&self, home: &TeamSide, away: &TeamSide) -> Sources {
        let mut reddit = Vec::new();
        for side in [home, away] {
            if let Some(sentiment) = &side.sentiment {
                reddit.extend(sentiment.thread_urls.iter().cloned());
            }
        }

        let names = self.chain.source_names();
        let mut stats = Vec::new();
        for side in [home, away] {
            let label = match side.stats.source {
                StatsTier::Primary => names.first().cloned(),
                StatsTier::Secondary => names.get(1).cloned(),
                StatsTier::Placeholder => Some("placeholder".to_string()),
            };
            if let Some(label) = label {
                if !stats.contains(&label) {
                    stats.push(label);
                }
            }
        }

        Sources { reddit, stats }
    }

    /// Append to the history store; failures are logged and dropped.
    fn record_history(&self, sport: &str, report: &MatchupReport) {
        let record = NewComparison {
            team1: report.team1.name.clone(),
            team2: report.team2.name.clone(),
            sport: sport.to_string(),
            predicted_winner: report.matchup.predicted_winner.clone(),
            win_probability: report.matchup.win_probability,
            confidence_label: report.matchup.confidence_label.clone(),
            result_json: serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string()),
        };
        if let Err(e) = self.history.add(&record) {
            warn!("failed to record comparison history: {e}");
        }
    }
}

fn sentiment_text(sentiment: &Option<TeamSentiment>) -> &str {
    sentiment.as_ref().map(|s| s.summary.as_str()).unwrap_or("")
}

fn team_report(
    identity: &TeamIdentity,
    side: &TeamSide,
    score: &TeamScore,
    injuries: &[String],
) -> TeamReport {
    let sentiment_summary = side
        .sentiment
        .as_ref()
        .map(|s| s.summary.clone())
        .unwrap_or_else(|| NO_SENTIMENT_SUMMARY.to_string());
    let pc = proscons::generate(&side.stats, sentiment_text(&side.sentiment), injuries);

    TeamReport {
        name: identity.canonical.clone(),
        pros: pc.pros,
        cons: pc.cons,
        stats_summary: side.stats.describe(),
        sentiment_summary,
        injuries: injuries.iter().map(|raw| parse_injury_note(raw)).collect(),
        score: *score,
    }
}

/// Head-to-head line rendered from whichever side leads the series.
fn h2h_line(h2h: &H2hRecord, home_team: &str, away_team: &str) -> String {
    use std::cmp::Ordering;
    match h2h.team_wins.cmp(&h2h.opponent_wins) {
        Ordering::Greater => h2h.describe(home_team, away_team),
        Ordering::Less => h2h.inverted().describe(away_team, home_team),
        Ordering::Equal => format!(
            "{} and {} have split their recent meetings {}-{}",
            home_team, away_team, h2h.team_wins, h2h.opponent_wins
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::cache::MemoryCache;
    use crate::history::SqliteHistory;
    use crate::scoring::MarketLine;
    use crate::stats::provider::{FetchFailure, StatsProvider, StatsWindow};
    use crate::stats::RetryPolicy;

    /// Stats provider that always succeeds with fixed numbers and counts its
    /// calls.
    struct FixedStats {
        shooting: f64,
        calls: AtomicUsize,
    }

    impl FixedStats {
        fn new(shooting: f64) -> Arc<Self> {
            Arc::new(FixedStats {
                shooting,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl StatsProvider for FixedStats {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch_stats(
            &self,
            team: &TeamIdentity,
            _window: StatsWindow,
        ) -> Result<StatsSummary, FetchFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !team.resolved {
                return Err(FetchFailure::TeamNotFound);
            }
            Ok(StatsSummary {
                team_name: team.canonical.clone(),
                shooting_pct: self.shooting,
                rebounding_avg: 43.0,
                turnovers_avg: 13.5,
                net_rating_proxy: 2.0,
                games_sampled: 10,
                source: StatsTier::Primary,
            })
        }
    }

    struct FailingStats;

    #[async_trait]
    impl StatsProvider for FailingStats {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch_stats(
            &self,
            _team: &TeamIdentity,
            _window: StatsWindow,
        ) -> Result<StatsSummary, FetchFailure> {
            Err(FetchFailure::Http(403))
        }
    }

    /// Context stub with no form, no h2h, and an optional market line.
    struct StubContext {
        line: Option<MarketLine>,
    }

    #[async_trait]
    impl GameContextProvider for StubContext {
        async fn form(&self, _team: &TeamIdentity) -> Option<FormSummary> {
            None
        }

        async fn head_to_head(
            &self,
            _team: &TeamIdentity,
            _opponent: &TeamIdentity,
        ) -> Option<H2hRecord> {
            None
        }

        async fn market_line(
            &self,
            _home: &TeamIdentity,
            _away: &TeamIdentity,
            _date: Option<&str>,
        ) -> Option<MarketLine> {
            self.line
        }
    }

    fn engine_with(
        provider: Arc<dyn StatsProvider>,
        line: Option<MarketLine>,
    ) -> MatchupEngine {
        let chain = StatsAcquisitionChain::new(
            vec![provider],
            Duration::from_millis(100),
            RetryPolicy::new(0, Duration::ZERO),
        );
        MatchupEngine::new(
            TeamIdentityResolver::new(),
            chain,
            Arc::new(StubContext { line }),
            Arc::new(collaborators::NoSentiment),
            Arc::new(MemoryCache::new()),
            Arc::new(SqliteHistory::in_memory().unwrap()),
            EngineSettings::default(),
        )
    }

    fn request(team1: &str, team2: &str) -> MatchupRequest {
        MatchupRequest {
            team1: team1.to_string(),
            team2: team2.to_string(),
            sport: None,
            team1_injuries: vec![],
            team2_injuries: vec![],
            date: None,
        }
    }

    #[tokio::test]
    async fn unsupported_sport_is_rejected() {
        let engine = engine_with(FixedStats::new(0.46), None);
        let mut req = request("Celtics", "Lakers");
        req.sport = Some("curling".to_string());
        let err = engine.analyze(&req).await.unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedSport(s) if s == "curling"));
    }

    #[tokio::test]
    async fn nba_is_accepted_as_sport_alias() {
        let engine = engine_with(FixedStats::new(0.46), None);
        let mut req = request("Celtics", "Lakers");
        req.sport = Some("NBA".to_string());
        assert!(engine.analyze(&req).await.is_ok());
    }

    #[tokio::test]
    async fn report_is_fully_formed_on_total_stats_failure() {
        let engine = engine_with(Arc::new(FailingStats), None);
        let report = engine.analyze(&request("Celtics", "Lakers")).await.unwrap();

        assert!(report.team1.stats_summary.contains("No recent statistics"));
        assert_eq!(report.team1.score.base_score, 0.5);
        assert_eq!(report.team2.score.base_score, 0.5);
        assert!(report.matchup.win_probability >= 0.5);
        assert!(report.matchup.win_probability <= 1.0);
        // With equal neutral scores, the home side is favored by the offset.
        assert_eq!(report.matchup.predicted_winner, "Boston Celtics");
        assert_eq!(report.sources.stats, vec!["placeholder".to_string()]);
        assert!(!report.matchup.reasoning.is_empty());
    }

    #[tokio::test]
    async fn per_team_stats_are_cached_within_ttl() {
        let provider = FixedStats::new(0.46);
        let engine = engine_with(provider.clone(), None);

        engine.analyze(&request("Celtics", "Lakers")).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

        // Different matchup, same teams already cached.
        engine.analyze(&request("Celtics", "Heat")).await.unwrap();
        assert_eq!(
            provider.calls.load(Ordering::SeqCst),
            3,
            "only the Heat should trigger a new fetch"
        );
    }

    #[tokio::test]
    async fn reversed_team_order_hits_the_result_cache() {
        let provider = FixedStats::new(0.46);
        let engine = engine_with(provider.clone(), None);

        let first = engine.analyze(&request("Celtics", "Lakers")).await.unwrap();
        let second = engine.analyze(&request("Lakers", "Celtics")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn comparison_is_recorded_in_history() {
        let history = Arc::new(SqliteHistory::in_memory().unwrap());
        let chain = StatsAcquisitionChain::new(
            vec![FixedStats::new(0.46) as Arc<dyn StatsProvider>],
            Duration::from_millis(100),
            RetryPolicy::new(0, Duration::ZERO),
        );
        let engine = MatchupEngine::new(
            TeamIdentityResolver::new(),
            chain,
            Arc::new(StubContext { line: None }),
            Arc::new(collaborators::NoSentiment),
            Arc::new(MemoryCache::new()),
            history.clone(),
            EngineSettings::default(),
        );

        engine.analyze(&request("Celtics", "Lakers")).await.unwrap();
        let entries = history.recent(10, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].team1, "Boston Celtics");
        assert_eq!(entries[0].sport, "basketball");
    }

    #[tokio::test]
    async fn market_line_produces_an_odds_comparison() {
        let line = MarketLine {
            spread: Some(-3.5),
            home_moneyline: Some(-160),
            away_moneyline: Some(140),
            over_under: Some(221.0),
        };
        let engine = engine_with(FixedStats::new(0.46), Some(line));
        let report = engine.analyze(&request("Celtics", "Lakers")).await.unwrap();

        let odds = report.matchup.odds.expect("odds comparison expected");
        assert_eq!(odds.market_favorite.as_deref(), Some("Boston Celtics"));
        assert!(odds.agreement);
        assert!(odds.edge_score.is_some());
        assert!(report
            .matchup
            .reasoning
            .iter()
            .any(|l| l.contains("betting market")));
    }

    #[tokio::test]
    async fn unresolved_teams_still_produce_a_report() {
        let engine = engine_with(FixedStats::new(0.46), None);
        let report = engine
            .analyze(&request("Springfield Isotopes", "Shelbyville Sharks"))
            .await
            .unwrap();
        // Unknown identities make every provider bail, so both sides run on
        // placeholder data.
        assert_eq!(report.team1.score.base_score, 0.5);
        assert_eq!(report.team1.name, "Springfield Isotopes");
    }

    #[tokio::test]
    async fn breakdown_and_labels_are_present() {
        let engine = engine_with(FixedStats::new(0.46), None);
        let report = engine.analyze(&request("Celtics", "Lakers")).await.unwrap();
        assert!(report
            .matchup
            .score_breakdown
            .starts_with("Predicted final score:"));
        assert!(["Toss-up", "Low", "Medium", "High"]
            .contains(&report.matchup.confidence_label.as_str()));
    }
}
