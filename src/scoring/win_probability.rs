//! Pre-game win probability from two team-strength scores.
//!
//! The score differential (plus a fixed home-advantage offset) is pushed
//! through a logistic sigmoid. The reported probability always refers to the
//! favored side, so it is never below 0.5.

use serde::{Deserialize, Serialize};

use super::normalizer::TeamScore;

/// Model parameters, surfaced in the configuration.
#[derive(Debug, Clone, Copy)]
pub struct ModelParams {
    /// Sigmoid steepness: how sharply a score gap converts to probability.
    pub steepness: f64,
    /// Flat score offset credited to the home side.
    pub home_advantage: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            steepness: 4.0,
            home_advantage: 0.03,
        }
    }
}

/// Confidence-label thresholds on `|p - 0.5|`. One internally consistent set
/// is used everywhere: <0.05 Toss-up, <0.12 Low, <0.20 Medium, else High.
const TOSS_UP_BAND: f64 = 0.05;
const LOW_BAND: f64 = 0.12;
const MEDIUM_BAND: f64 = 0.20;

/// Typical final score a league-average team posts; the breakdown string is
/// rendered around this baseline.
const BASELINE_POINTS: f64 = 110.0;
const MARGIN_SCALE: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupPrediction {
    pub favored_team: String,
    pub underdog_team: String,
    /// Probability for the favored side; always `>= 0.5`.
    pub win_probability: f64,
    pub confidence_label: String,
    /// Whether the favored side is the home team.
    pub home_favored: bool,
}

/// Standard logistic sigmoid.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Win probability for the home side given both final scores.
pub fn home_win_probability(home_score: f64, away_score: f64, params: ModelParams) -> f64 {
    sigmoid(params.steepness * ((home_score + params.home_advantage) - away_score))
}

/// Label the distance from a coin flip.
pub fn confidence_label(probability: f64) -> &'static str {
    let distance = (probability - 0.5).abs();
    if distance < TOSS_UP_BAND {
        "Toss-up"
    } else if distance < LOW_BAND {
        "Low"
    } else if distance < MEDIUM_BAND {
        "Medium"
    } else {
        "High"
    }
}

/// Full prediction for a matchup; `home` is the reference side the
/// home-advantage offset applies to.
pub fn predict(
    home_team: &str,
    away_team: &str,
    home: &TeamScore,
    away: &TeamScore,
    params: ModelParams,
) -> MatchupPrediction {
    let p_home = home_win_probability(home.final_score, away.final_score, params);
    let home_favored = p_home >= 0.5;
    let win_probability = p_home.max(1.0 - p_home);
    let (favored_team, underdog_team) = if home_favored {
        (home_team.to_string(), away_team.to_string())
    } else {
        (away_team.to_string(), home_team.to_string())
    };

    MatchupPrediction {
        favored_team,
        underdog_team,
        win_probability,
        confidence_label: confidence_label(win_probability).to_string(),
        home_favored,
    }
}

/// Human-readable projected final score, winner listed first.
///
/// The score gap is mapped onto a realistic NBA margin around a 110-point
/// baseline; exact ties get nudged by a point so the line always names a
/// winner.
pub fn score_breakdown(
    team1_name: &str,
    team2_name: &str,
    team1_score: f64,
    team2_score: f64,
) -> String {
    let margin = (team1_score - team2_score) * MARGIN_SCALE;
    let mut first = (team1_name, BASELINE_POINTS + margin);
    let mut second = (team2_name, BASELINE_POINTS - margin);

    if first.1 < second.1 {
        std::mem::swap(&mut first, &mut second);
    } else if (first.1 - second.1).abs() < f64::EPSILON {
        first.1 += 1.0;
    }

    format!(
        "Predicted final score: {} {}-{} {}",
        first.0, first.1 as i64, second.1 as i64, second.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn score(final_score: f64) -> TeamScore {
        TeamScore {
            base_score: final_score,
            sentiment_tilt: 0.0,
            injury_penalty: 0.0,
            form_adjustment: 0.0,
            h2h_adjustment: 0.0,
            final_score,
        }
    }

    #[test]
    fn sigmoid_midpoint_and_tails() {
        assert_relative_eq!(sigmoid(0.0), 0.5, epsilon = 1e-12);
        assert!(sigmoid(6.0) > 0.99);
        assert!(sigmoid(-6.0) < 0.01);
    }

    #[test]
    fn probability_is_monotone_in_score_gap() {
        let params = ModelParams::default();
        let mut last = 0.0;
        for i in 0..=20 {
            let home = i as f64 / 20.0;
            let p = home_win_probability(home, 0.5, params);
            assert!(p > last, "p must increase with the home score");
            last = p;
        }
    }

    #[test]
    fn reported_probability_is_for_the_favored_side() {
        let params = ModelParams::default();
        let p = predict("Home", "Away", &score(0.3), &score(0.7), params);
        assert_eq!(p.favored_team, "Away");
        assert_eq!(p.underdog_team, "Home");
        assert!(p.win_probability >= 0.5);
        assert!(!p.home_favored);
    }

    #[test]
    fn clear_home_edge_scenario() {
        // home 0.6 vs away 0.4: sigmoid(4 × (0.63 − 0.40)) = sigmoid(0.92)
        let params = ModelParams::default();
        let p = predict("Home", "Away", &score(0.6), &score(0.4), params);
        assert_eq!(p.favored_team, "Home");
        assert_relative_eq!(p.win_probability, sigmoid(0.92), epsilon = 1e-12);
        assert_relative_eq!(p.win_probability, 0.71504, epsilon = 1e-4);
        assert_eq!(p.confidence_label, "High");
    }

    #[test]
    fn even_matchup_is_a_toss_up_with_slight_home_lean() {
        // Both 0.5: only the home offset separates them.
        let params = ModelParams::default();
        let p = predict("Home", "Away", &score(0.5), &score(0.5), params);
        assert_eq!(p.favored_team, "Home");
        assert_relative_eq!(p.win_probability, sigmoid(0.12), epsilon = 1e-12);
        assert_relative_eq!(p.win_probability, 0.52996, epsilon = 1e-4);
        assert_eq!(p.confidence_label, "Toss-up");
    }

    #[test]
    fn confidence_bands() {
        assert_eq!(confidence_label(0.50), "Toss-up");
        assert_eq!(confidence_label(0.549), "Toss-up");
        assert_eq!(confidence_label(0.55), "Low");
        assert_eq!(confidence_label(0.619), "Low");
        assert_eq!(confidence_label(0.62), "Medium");
        assert_eq!(confidence_label(0.699), "Medium");
        assert_eq!(confidence_label(0.70), "High");
        assert_eq!(confidence_label(0.95), "High");
    }

    #[test]
    fn home_advantage_shifts_the_needle() {
        let with = ModelParams { steepness: 4.0, home_advantage: 0.03 };
        let without = ModelParams { steepness: 4.0, home_advantage: 0.0 };
        let p_with = home_win_probability(0.5, 0.5, with);
        let p_without = home_win_probability(0.5, 0.5, without);
        assert!(p_with > p_without);
        assert_relative_eq!(p_without, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn breakdown_lists_winner_first() {
        let line = score_breakdown("Celtics", "Lakers", 0.65, 0.45);
        assert_eq!(line, "Predicted final score: Celtics 114-106 Lakers");

        let reversed = score_breakdown("Celtics", "Lakers", 0.45, 0.65);
        assert_eq!(reversed, "Predicted final score: Lakers 114-106 Celtics");
    }

    #[test]
    fn breakdown_never_renders_a_tie() {
        let line = score_breakdown("A", "B", 0.5, 0.5);
        assert_eq!(line, "Predicted final score: A 111-110 B");
    }
}
