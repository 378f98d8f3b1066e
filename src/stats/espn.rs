use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::provider::{FetchFailure, StatsProvider, StatsWindow};
use super::types::{FormSummary, H2hRecord, StatsSummary, StatsTier};
use crate::scoring::odds::MarketLine;
use crate::teams::TeamIdentity;

/// Primary stats source: the ESPN site API, a fast aggregator that is not
/// IP-restricted. Besides per-team statistics it also surfaces last-10 form
/// records, schedules (for head-to-head), and scoreboard betting odds.
///
/// This is an unofficial API discovered from the site's network requests;
/// endpoints: <https://site.api.espn.com/apis/site/v2/sports/basketball/nba>.
pub struct EspnStats {
    http: Client,
    /// Base URL, overridable in tests.
    base_url: String,
}

const DEFAULT_BASE_URL: &str = "https://site.api.espn.com/apis/site/v2/sports/basketball/nba";

impl EspnStats {
    pub fn new(base_url: Option<&str>, timeout: std::time::Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
        Ok(EspnStats {
            http,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchFailure> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchFailure::Timeout
            } else {
                FetchFailure::Network(e.to_string())
            }
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchFailure::Http(status.as_u16()));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| FetchFailure::Malformed(e.to_string()))
    }

    /// Best-effort last-10 form record for a team. Prefers an explicit
    /// last-ten split when the payload carries one, otherwise scales the
    /// overall record onto a 10-game window.
    pub async fn fetch_form(&self, team: &TeamIdentity) -> Result<FormSummary, FetchFailure> {
        let abbr = team_abbr(team)?;
        let url = format!("{}/teams/{}", self.base_url, abbr);
        let raw = self.get_json(&url).await?;
        parse_form(&raw).ok_or(FetchFailure::Empty)
    }

    /// Completed meetings against `opponent` in the team's current schedule.
    /// A bounded, best-effort lookup, not a historical ledger.
    pub async fn fetch_head_to_head(
        &self,
        team: &TeamIdentity,
        opponent: &TeamIdentity,
    ) -> Result<H2hRecord, FetchFailure> {
        let abbr = team_abbr(team)?;
        let opp_abbr = team_abbr(opponent)?;
        let url = format!("{}/teams/{}/schedule", self.base_url, abbr);
        let raw = self.get_json(&url).await?;
        let record = parse_head_to_head(&raw, abbr, opp_abbr);
        if record.games() == 0 {
            return Err(FetchFailure::Empty);
        }
        Ok(record)
    }

    /// Scoreboard betting line for the given matchup, if one is posted.
    /// `Ok(None)` means the game or its odds are simply not listed.
    pub async fn fetch_matchup_odds(
        &self,
        home: &TeamIdentity,
        away: &TeamIdentity,
        date: Option<&str>,
    ) -> Result<Option<MarketLine>, FetchFailure> {
        let home_abbr = team_abbr(home)?;
        let away_abbr = team_abbr(away)?;
        let url = match date {
            Some(d) => format!("{}/scoreboard?dates={}", self.base_url, d),
            None => format!("{}/scoreboard", self.base_url),
        };
        let raw = self.get_json(&url).await?;
        Ok(parse_matchup_odds(&raw, home_abbr, away_abbr))
    }
}

#[async_trait]
impl StatsProvider for EspnStats {
    fn name(&self) -> &str {
        "espn"
    }

    async fn fetch_stats(
        &self,
        team: &TeamIdentity,
        window: StatsWindow,
    ) -> Result<StatsSummary, FetchFailure> {
        let abbr = team_abbr(team)?;
        let url = match window {
            StatsWindow::Current => format!("{}/teams/{}/statistics", self.base_url, abbr),
            StatsWindow::Relaxed => format!(
                "{}/teams/{}/statistics?season={}",
                self.base_url,
                abbr,
                previous_season_start_year()
            ),
        };
        let raw = self.get_json(&url).await?;
        parse_team_statistics(&raw, &team.canonical)
    }
}

fn team_abbr(team: &TeamIdentity) -> Result<&str, FetchFailure> {
    team.abbreviation.as_deref().ok_or(FetchFailure::TeamNotFound)
}

fn previous_season_start_year() -> i32 {
    use chrono::Datelike;
    let now = chrono::Utc::now();
    let current_start = if now.month() >= 10 { now.year() } else { now.year() - 1 };
    current_start - 1
}

// ── Parsing helpers ───────────────────────────────────────────────────────────

/// Recursively find the first `{ "name": <name>, ... }` object and return its
/// numeric value. ESPN nests stat entries a few levels deep and the exact
/// shape varies between season phases, so we search instead of path-walking.
fn find_stat(raw: &Value, name: &str) -> Option<f64> {
    match raw {
        Value::Object(map) => {
            if map.get("name").and_then(Value::as_str) == Some(name) {
                if let Some(v) = numeric_field(map.get("value")) {
                    return Some(v);
                }
                if let Some(v) = numeric_field(map.get("displayValue")) {
                    return Some(v);
                }
            }
            map.values().find_map(|v| find_stat(v, name))
        }
        Value::Array(items) => items.iter().find_map(|v| find_stat(v, name)),
        _ => None,
    }
}

fn numeric_field(v: Option<&Value>) -> Option<f64> {
    let v = v?;
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
}

fn parse_team_statistics(raw: &Value, team_name: &str) -> Result<StatsSummary, FetchFailure> {
    let shooting = find_stat(raw, "fieldGoalPct");
    let rebounds = find_stat(raw, "avgRebounds").or_else(|| find_stat(raw, "rebounds"));
    let turnovers = find_stat(raw, "avgTurnovers").or_else(|| find_stat(raw, "turnovers"));

    // A payload with none of the core metrics is indistinguishable from an
    // empty season; let the chain relax the window.
    let (Some(shooting), Some(rebounds), Some(turnovers)) = (shooting, rebounds, turnovers)
    else {
        return Err(FetchFailure::Empty);
    };

    // ESPN reports percentages on a 0–100 scale.
    let shooting_pct = if shooting > 1.0 { shooting / 100.0 } else { shooting };

    let net_rating = find_stat(raw, "avgPointDifferential")
        .or_else(|| find_stat(raw, "pointDifferential"))
        .or_else(|| {
            // Derive from scoring averages when the differential is absent.
            let scored = find_stat(raw, "avgPoints")?;
            let allowed = find_stat(raw, "avgPointsAgainst")?;
            Some(scored - allowed)
        })
        .unwrap_or(0.0);

    let games = find_stat(raw, "gamesPlayed")
        .map(|g| g as u32)
        .unwrap_or(10)
        .min(10);

    Ok(StatsSummary {
        team_name: team_name.to_string(),
        shooting_pct,
        rebounding_avg: rebounds,
        turnovers_avg: turnovers,
        net_rating_proxy: net_rating,
        games_sampled: games,
        source: StatsTier::Primary,
    })
}

/// Parse a "W-L" summary string, e.g. "7-3".
fn parse_record_summary(summary: &str) -> Option<(u32, u32)> {
    let (w, l) = summary.trim().split_once('-')?;
    Some((w.trim().parse().ok()?, l.trim().parse().ok()?))
}

fn parse_form(raw: &Value) -> Option<FormSummary> {
    let items = raw["team"]["record"]["items"]
        .as_array()
        .or_else(|| raw["record"]["items"].as_array())?;

    // Prefer an explicit last-ten split.
    for item in items {
        let ty = item["type"].as_str().unwrap_or("");
        let name = item["name"].as_str().unwrap_or("");
        if ty.eq_ignore_ascii_case("lastten") || name.to_lowercase().contains("last ten") {
            let (wins, losses) = parse_record_summary(item["summary"].as_str()?)?;
            return Some(FormSummary { wins, losses });
        }
    }

    // Fall back to the overall record scaled onto a 10-game window.
    let total = items
        .iter()
        .find(|i| i["type"].as_str() == Some("total"))
        .or_else(|| items.first())?;
    let (wins, losses) = parse_record_summary(total["summary"].as_str()?)?;
    let games = wins + losses;
    if games == 0 {
        return None;
    }
    let scaled_wins = ((f64::from(wins) / f64::from(games)) * 10.0).round() as u32;
    Some(FormSummary {
        wins: scaled_wins.min(10),
        losses: 10 - scaled_wins.min(10),
    })
}

fn parse_head_to_head(raw: &Value, team_abbr: &str, opponent_abbr: &str) -> H2hRecord {
    let mut record = H2hRecord { team_wins: 0, opponent_wins: 0 };
    let Some(events) = raw["events"].as_array() else {
        return record;
    };

    for event in events {
        let Some(competition) = event["competitions"].as_array().and_then(|c| c.first()) else {
            continue;
        };
        let completed = competition["status"]["type"]["completed"]
            .as_bool()
            .unwrap_or(false);
        if !completed {
            continue;
        }
        let Some(competitors) = competition["competitors"].as_array() else {
            continue;
        };

        let abbr_of = |c: &Value| {
            c["team"]["abbreviation"]
                .as_str()
                .unwrap_or("")
                .to_uppercase()
        };
        let ours = competitors
            .iter()
            .find(|c| abbr_of(c) == team_abbr.to_uppercase());
        let theirs = competitors
            .iter()
            .find(|c| abbr_of(c) == opponent_abbr.to_uppercase());

        if let (Some(ours), Some(_)) = (ours, theirs) {
            if ours["winner"].as_bool().unwrap_or(false) {
                record.team_wins += 1;
            } else {
                record.opponent_wins += 1;
            }
        }
    }
    record
}

fn parse_matchup_odds(raw: &Value, home_abbr: &str, away_abbr: &str) -> Option<MarketLine> {
    let events = raw["events"].as_array()?;
    for event in events {
        let competition = event["competitions"].as_array()?.first()?;
        let competitors = competition["competitors"].as_array()?;

        let has = |abbr: &str| {
            competitors.iter().any(|c| {
                c["team"]["abbreviation"]
                    .as_str()
                    .map(|a| a.eq_ignore_ascii_case(abbr))
                    .unwrap_or(false)
            })
        };
        if !has(home_abbr) || !has(away_abbr) {
            continue;
        }

        let odds = competition["odds"].as_array().and_then(|o| o.first())?;
        return Some(MarketLine {
            spread: numeric_field(odds.get("spread")),
            home_moneyline: odds["homeTeamOdds"]["moneyLine"]
                .as_i64()
                .map(|m| m as i32),
            away_moneyline: odds["awayTeamOdds"]["moneyLine"]
                .as_i64()
                .map(|m| m as i32),
            over_under: numeric_field(odds.get("overUnder")),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn statistics_payload_parses_core_metrics() {
        let raw = json!({
            "results": { "stats": { "categories": [
                { "name": "general", "stats": [
                    { "name": "fieldGoalPct", "value": 47.2 },
                    { "name": "avgRebounds", "value": 44.1 },
                    { "name": "avgTurnovers", "value": 13.2 },
                    { "name": "avgPointDifferential", "value": 4.5 },
                    { "name": "gamesPlayed", "value": 58.0 }
                ]}
            ]}}
        });
        let s = parse_team_statistics(&raw, "Boston Celtics").unwrap();
        assert!((s.shooting_pct - 0.472).abs() < 1e-9);
        assert_eq!(s.rebounding_avg, 44.1);
        assert_eq!(s.turnovers_avg, 13.2);
        assert_eq!(s.net_rating_proxy, 4.5);
        assert_eq!(s.games_sampled, 10, "sample is capped at 10");
        assert_eq!(s.source, StatsTier::Primary);
    }

    #[test]
    fn missing_core_metrics_is_empty_not_malformed() {
        let raw = json!({ "results": {} });
        match parse_team_statistics(&raw, "X") {
            Err(FetchFailure::Empty) => {}
            other => panic!("expected Empty, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn net_rating_derived_from_scoring_averages() {
        let raw = json!({ "stats": [
            { "name": "fieldGoalPct", "value": 0.45 },
            { "name": "avgRebounds", "value": 42.0 },
            { "name": "avgTurnovers", "value": 14.0 },
            { "name": "avgPoints", "value": 112.0 },
            { "name": "avgPointsAgainst", "value": 108.5 }
        ]});
        let s = parse_team_statistics(&raw, "X").unwrap();
        assert!((s.net_rating_proxy - 3.5).abs() < 1e-9);
    }

    #[test]
    fn form_prefers_last_ten_split() {
        let raw = json!({ "team": { "record": { "items": [
            { "type": "total", "summary": "50-32" },
            { "type": "lastTen", "summary": "7-3" }
        ]}}});
        assert_eq!(parse_form(&raw), Some(FormSummary { wins: 7, losses: 3 }));
    }

    #[test]
    fn form_scales_total_record_to_ten_games() {
        let raw = json!({ "team": { "record": { "items": [
            { "type": "total", "summary": "60-20" }
        ]}}});
        // 75% of 10 games, rounded.
        assert_eq!(parse_form(&raw), Some(FormSummary { wins: 8, losses: 2 }));
    }

    #[test]
    fn head_to_head_counts_completed_meetings_only() {
        let game = |opp: &str, we_won: bool, completed: bool| {
            json!({ "competitions": [{
                "status": { "type": { "completed": completed } },
                "competitors": [
                    { "team": { "abbreviation": "BOS" }, "winner": we_won },
                    { "team": { "abbreviation": opp }, "winner": !we_won }
                ]
            }]})
        };
        let raw = json!({ "events": [
            game("LAL", true, true),
            game("LAL", false, true),
            game("LAL", true, false),  // scheduled, not counted
            game("MIA", true, true)    // different opponent, not counted
        ]});
        let h = parse_head_to_head(&raw, "BOS", "LAL");
        assert_eq!(h, H2hRecord { team_wins: 1, opponent_wins: 1 });
    }

    #[test]
    fn scoreboard_odds_found_for_matching_event() {
        let raw = json!({ "events": [{
            "competitions": [{
                "competitors": [
                    { "team": { "abbreviation": "BOS" } },
                    { "team": { "abbreviation": "LAL" } }
                ],
                "odds": [{
                    "spread": -6.5,
                    "overUnder": 224.5,
                    "homeTeamOdds": { "moneyLine": -240 },
                    "awayTeamOdds": { "moneyLine": 195 }
                }]
            }]
        }]});
        let line = parse_matchup_odds(&raw, "BOS", "LAL").unwrap();
        assert_eq!(line.spread, Some(-6.5));
        assert_eq!(line.home_moneyline, Some(-240));
        assert_eq!(line.away_moneyline, Some(195));
    }

    #[test]
    fn scoreboard_without_the_game_yields_none() {
        let raw = json!({ "events": [] });
        assert!(parse_matchup_odds(&raw, "BOS", "LAL").is_none());
    }

    #[test]
    fn record_summary_parsing() {
        assert_eq!(parse_record_summary("7-3"), Some((7, 3)));
        assert_eq!(parse_record_summary(" 50 - 32 "), Some((50, 32)));
        assert_eq!(parse_record_summary("n/a"), None);
    }
}
