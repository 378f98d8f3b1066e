use anyhow::Result;
use async_trait::async_trait;
use chrono::Datelike;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::provider::{FetchFailure, StatsProvider, StatsWindow};
use super::types::{StatsSummary, StatsTier};
use crate::teams::TeamIdentity;

/// Secondary stats source: the league's own stats API. Authoritative but
/// slower and known to refuse requests from data-center IP ranges, which is
/// why it sits behind the aggregator in the chain.
pub struct NbaStats {
    http: Client,
    base_url: String,
}

const DEFAULT_BASE_URL: &str = "https://stats.nba.com/stats";

/// League-average points, used as a differential proxy when the game log
/// carries no plus/minus column.
const LEAGUE_AVG_POINTS: f64 = 108.0;

impl NbaStats {
    pub fn new(base_url: Option<&str>, timeout: std::time::Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
        Ok(NbaStats {
            http,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        })
    }
}

#[async_trait]
impl StatsProvider for NbaStats {
    fn name(&self) -> &str {
        "nba-stats"
    }

    async fn fetch_stats(
        &self,
        team: &TeamIdentity,
        window: StatsWindow,
    ) -> Result<StatsSummary, FetchFailure> {
        let team_id = team.provider_id.ok_or(FetchFailure::TeamNotFound)?;
        let season = season_label(window);
        let url = format!(
            "{}/teamgamelog?TeamID={}&Season={}&SeasonType=Regular+Season",
            self.base_url, team_id, season
        );
        debug!("GET {} (season {})", url, season);

        let resp = self
            .http
            .get(&url)
            // The stats API rejects requests without browser-like headers.
            .header("User-Agent", "Mozilla/5.0")
            .header("Referer", "https://www.nba.com/")
            .send()
            .await
            .map_err(|e| {
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

        let raw: Value = resp
            .json()
            .await
            .map_err(|e| FetchFailure::Malformed(e.to_string()))?;
        parse_game_log(&raw, &team.canonical)
    }
}

/// Season label in the API's "2024-25" format. October starts a new season.
fn season_label(window: StatsWindow) -> String {
    let now = chrono::Utc::now();
    let mut start_year = if now.month() >= 10 { now.year() } else { now.year() - 1 };
    if window == StatsWindow::Relaxed {
        start_year -= 1;
    }
    format!("{}-{:02}", start_year, (start_year + 1) % 100)
}

/// Average the last 10 rows of a `teamgamelog` result set.
///
/// The payload is column-oriented: a `headers` array naming the columns and a
/// `rowSet` of value arrays, newest game first.
fn parse_game_log(raw: &Value, team_name: &str) -> Result<StatsSummary, FetchFailure> {
    let result_set = raw["resultSets"]
        .as_array()
        .and_then(|sets| sets.first())
        .ok_or_else(|| FetchFailure::Malformed("missing resultSets".into()))?;

    let headers: Vec<String> = result_set["headers"]
        .as_array()
        .ok_or_else(|| FetchFailure::Malformed("missing headers".into()))?
        .iter()
        .filter_map(|h| h.as_str().map(str::to_string))
        .collect();

    let rows = result_set["rowSet"]
        .as_array()
        .ok_or_else(|| FetchFailure::Malformed("missing rowSet".into()))?;
    if rows.is_empty() {
        return Err(FetchFailure::Empty);
    }

    let col = |name: &str| headers.iter().position(|h| h == name);
    let fg_pct_idx = col("FG_PCT");
    let reb_idx = col("REB");
    let tov_idx = col("TOV");
    let plus_minus_idx = col("PLUS_MINUS");
    let pts_idx = col("PTS");

    let recent: Vec<&Value> = rows.iter().take(10).collect();
    let games = recent.len() as u32;

    let mean_of = |idx: Option<usize>| -> Option<f64> {
        let idx = idx?;
        let values: Vec<f64> = recent
            .iter()
            .filter_map(|row| row.as_array()?.get(idx)?.as_f64())
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    };

    let shooting_pct = mean_of(fg_pct_idx).unwrap_or(0.450);
    let rebounding_avg = mean_of(reb_idx).unwrap_or(42.0);
    let turnovers_avg = mean_of(tov_idx).unwrap_or(14.0);
    let net_rating_proxy = mean_of(plus_minus_idx)
        .or_else(|| mean_of(pts_idx).map(|pts| pts - LEAGUE_AVG_POINTS))
        .unwrap_or(0.0);

    Ok(StatsSummary {
        team_name: team_name.to_string(),
        shooting_pct,
        rebounding_avg,
        turnovers_avg,
        net_rating_proxy,
        games_sampled: games,
        source: StatsTier::Secondary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn game_log(rows: Vec<Value>) -> Value {
        json!({ "resultSets": [{
            "headers": ["GAME_DATE", "FG_PCT", "REB", "TOV", "PLUS_MINUS", "PTS"],
            "rowSet": rows
        }]})
    }

    #[test]
    fn averages_over_rows() {
        let raw = game_log(vec![
            json!(["2026-01-02", 0.50, 44.0, 12.0, 6.0, 118.0]),
            json!(["2026-01-01", 0.40, 40.0, 16.0, -2.0, 102.0]),
        ]);
        let s = parse_game_log(&raw, "Denver Nuggets").unwrap();
        assert!((s.shooting_pct - 0.45).abs() < 1e-9);
        assert!((s.rebounding_avg - 42.0).abs() < 1e-9);
        assert!((s.turnovers_avg - 14.0).abs() < 1e-9);
        assert!((s.net_rating_proxy - 2.0).abs() < 1e-9);
        assert_eq!(s.games_sampled, 2);
        assert_eq!(s.source, StatsTier::Secondary);
    }

    #[test]
    fn only_last_ten_rows_are_sampled() {
        let rows: Vec<Value> = (0..15)
            .map(|i| json!([format!("2026-01-{:02}", i + 1), 0.45, 42.0, 14.0, 1.0, 110.0]))
            .collect();
        let s = parse_game_log(&game_log(rows), "X").unwrap();
        assert_eq!(s.games_sampled, 10);
    }

    #[test]
    fn empty_row_set_is_empty_failure() {
        let raw = game_log(vec![]);
        assert!(matches!(
            parse_game_log(&raw, "X"),
            Err(FetchFailure::Empty)
        ));
    }

    #[test]
    fn missing_result_sets_is_malformed() {
        let raw = json!({ "unexpected": true });
        assert!(matches!(
            parse_game_log(&raw, "X"),
            Err(FetchFailure::Malformed(_))
        ));
    }

    #[test]
    fn falls_back_to_points_proxy_without_plus_minus() {
        let raw = json!({ "resultSets": [{
            "headers": ["GAME_DATE", "FG_PCT", "REB", "TOV", "PTS"],
            "rowSet": [["2026-01-01", 0.47, 43.0, 13.0, 114.0]]
        }]});
        let s = parse_game_log(&raw, "X").unwrap();
        assert!((s.net_rating_proxy - 6.0).abs() < 1e-9);
    }

    #[test]
    fn season_label_shapes() {
        let current = season_label(StatsWindow::Current);
        let relaxed = season_label(StatsWindow::Relaxed);
        assert_eq!(current.len(), 7);
        assert!(current.contains('-'));
        assert_ne!(current, relaxed);
    }
}
