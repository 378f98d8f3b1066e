use serde::{Deserialize, Serialize};

/// Which tier of the acquisition chain produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsTier {
    Primary,
    Secondary,
    Placeholder,
}

/// Normalized record of a team's recent per-game performance.
///
/// Every field always holds a defined numeric value. When no upstream source
/// produces usable data, the record is fully populated with the documented
/// defaults below and `source == Placeholder`, so downstream scoring stays
/// deterministic and reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub team_name: String,
    /// Field-goal percentage over the sampled games, in [0, 1].
    pub shooting_pct: f64,
    /// Rebounds per game.
    pub rebounding_avg: f64,
    /// Turnovers per game.
    pub turnovers_avg: f64,
    /// Point differential per game, used as a net-rating proxy.
    pub net_rating_proxy: f64,
    /// How many games backed the averages, at most 10.
    pub games_sampled: u32,
    pub source: StatsTier,
}

/// Placeholder defaults: league-typical neutral values.
pub const PLACEHOLDER_SHOOTING_PCT: f64 = 0.450;
pub const PLACEHOLDER_REBOUNDING_AVG: f64 = 42.0;
pub const PLACEHOLDER_TURNOVERS_AVG: f64 = 14.0;
pub const PLACEHOLDER_NET_RATING: f64 = 0.0;
pub const PLACEHOLDER_GAMES_SAMPLED: u32 = 10;

impl StatsSummary {
    /// The canonical fallback record. Stable across calls by construction.
    pub fn placeholder(team_name: &str) -> Self {
        StatsSummary {
            team_name: team_name.to_string(),
            shooting_pct: PLACEHOLDER_SHOOTING_PCT,
            rebounding_avg: PLACEHOLDER_REBOUNDING_AVG,
            turnovers_avg: PLACEHOLDER_TURNOVERS_AVG,
            net_rating_proxy: PLACEHOLDER_NET_RATING,
            games_sampled: PLACEHOLDER_GAMES_SAMPLED,
            source: StatsTier::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.source == StatsTier::Placeholder
    }

    /// Human-readable one-liner for the per-team report.
    pub fn describe(&self) -> String {
        if self.is_placeholder() {
            return format!(
                "No recent statistics available for {}; using a neutral league-average baseline.",
                self.team_name
            );
        }
        format!(
            "Last {} games: {:.1}% FG, {:.1} REB, {:.1} TOV, {:+.1} point differential",
            self.games_sampled,
            self.shooting_pct * 100.0,
            self.rebounding_avg,
            self.turnovers_avg,
            self.net_rating_proxy
        )
    }
}

/// Recent-form record (last-10 style), an optional scoring input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSummary {
    pub wins: u32,
    pub losses: u32,
}

impl FormSummary {
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_pct(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            return 0.5;
        }
        f64::from(self.wins) / f64::from(games)
    }

    pub fn describe(&self, team: &str) -> String {
        format!("{} has won {} of its last {} games", team, self.wins, self.games())
    }
}

/// Head-to-head record from recent meetings, seen from one team's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct H2hRecord {
    pub team_wins: u32,
    pub opponent_wins: u32,
}

impl H2hRecord {
    pub fn games(&self) -> u32 {
        self.team_wins + self.opponent_wins
    }

    /// The same record seen from the opponent's side.
    pub fn inverted(&self) -> H2hRecord {
        H2hRecord {
            team_wins: self.opponent_wins,
            opponent_wins: self.team_wins,
        }
    }

    pub fn describe(&self, team: &str, opponent: &str) -> String {
        format!(
            "{} leads the recent head-to-head series {}-{} against {}",
            team, self.team_wins, self.opponent_wins, opponent
        )
    }
}
