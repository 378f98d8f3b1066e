//! Stats-to-score normalization.
//!
//! A raw [`StatsSummary`] is mapped onto a single bounded team-strength score
//! in `[0, 1]`: each metric is linearly normalized against a fixed league
//! range, combined with fixed weights, then nudged by additive adjustments
//! (community sentiment, roster absences, recent form, head-to-head) and
//! clamped. All arithmetic is deterministic and hand-tuned; there is no
//! fitting step.

use serde::{Deserialize, Serialize};

use crate::stats::{FormSummary, H2hRecord, StatsSummary};

// League ranges the raw metrics are normalized against.
const SHOOTING_RANGE: (f64, f64) = (0.35, 0.55);
const REBOUNDING_RANGE: (f64, f64) = (35.0, 50.0);
const TURNOVER_RANGE: (f64, f64) = (12.0, 18.0);
const NET_RATING_RANGE: (f64, f64) = (-10.0, 10.0);

// Fixed metric weights; they sum to 1.0 and are not configurable per call.
const W_SHOOTING: f64 = 0.30;
const W_REBOUNDING: f64 = 0.20;
const W_TURNOVERS: f64 = 0.20;
const W_NET_RATING: f64 = 0.30;

/// Caps for the additive adjustments.
pub const SENTIMENT_CAP: f64 = 0.2;
pub const INJURY_PENALTY_FLOOR: f64 = -0.15;
pub const FORM_CAP: f64 = 0.08;
pub const H2H_CAP: f64 = 0.05;

const SENTIMENT_STEP: f64 = 0.05;
const INJURY_STEP: f64 = -0.05;

const POSITIVE_MARKERS: &[&str] = &[
    "positive", "great", "excellent", "amazing", "fantastic", "strong", "good",
];
const NEGATIVE_MARKERS: &[&str] = &[
    "negative", "poor", "bad", "terrible", "weak", "concerns", "worries",
];

const INJURY_KEYWORDS: &[&str] = &["out", "injured", "surgery", "fracture"];

/// A team's bounded strength score with its adjustment components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamScore {
    pub base_score: f64,
    pub sentiment_tilt: f64,
    pub injury_penalty: f64,
    pub form_adjustment: f64,
    pub h2h_adjustment: f64,
    /// Always clamped into `[0, 1]` regardless of the adjustment sum.
    pub final_score: f64,
}

/// Linear normalization of `value` against `[min, max]`. A degenerate range
/// maps to the neutral midpoint.
fn normalize_metric(value: f64, min: f64, max: f64) -> f64 {
    if (max - min).abs() < f64::EPSILON {
        return 0.5;
    }
    (value - min) / (max - min)
}

/// Weighted stats score in `[0, 1]`. Placeholder records bypass the formula
/// entirely and score a neutral 0.5, keeping degraded lookups deterministic.
pub fn base_score(stats: &StatsSummary) -> f64 {
    if stats.is_placeholder() {
        return 0.5;
    }

    let shooting = normalize_metric(stats.shooting_pct, SHOOTING_RANGE.0, SHOOTING_RANGE.1);
    let rebounding = normalize_metric(
        stats.rebounding_avg,
        REBOUNDING_RANGE.0,
        REBOUNDING_RANGE.1,
    );
    // Lower turnovers are better, so the sub-score is inverted.
    let turnovers =
        1.0 - normalize_metric(stats.turnovers_avg, TURNOVER_RANGE.0, TURNOVER_RANGE.1);
    let net_rating = normalize_metric(
        stats.net_rating_proxy,
        NET_RATING_RANGE.0,
        NET_RATING_RANGE.1,
    );

    let weighted = shooting * W_SHOOTING
        + rebounding * W_REBOUNDING
        + turnovers * W_TURNOVERS
        + net_rating * W_NET_RATING;
    weighted.clamp(0.0, 1.0)
}

/// Tilt in `[-0.2, 0.2]` from an opaque sentiment descriptor: 0.05 per net
/// positive-minus-negative lexical marker, capped.
pub fn sentiment_tilt(summary: &str) -> f64 {
    if summary.is_empty() {
        return 0.0;
    }
    let lower = summary.to_lowercase();
    let positives = POSITIVE_MARKERS.iter().filter(|w| lower.contains(**w)).count() as i32;
    let negatives = NEGATIVE_MARKERS.iter().filter(|w| lower.contains(**w)).count() as i32;
    (f64::from(positives - negatives) * SENTIMENT_STEP).clamp(-SENTIMENT_CAP, SENTIMENT_CAP)
}

/// Penalty in `[-0.15, 0]`: -0.05 per roster absence whose description reads
/// as significant (out / injured / surgery / fracture), capped.
pub fn injury_penalty(injuries: &[String]) -> f64 {
    let significant = injuries
        .iter()
        .filter(|entry| {
            let lower = entry.to_lowercase();
            INJURY_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .count();
    (significant as f64 * INJURY_STEP).clamp(INJURY_PENALTY_FLOOR, 0.0)
}

/// Recent-form adjustment in `[-0.08, 0.08]`; exactly 0 when disabled or the
/// record is unavailable. A 10-0 run maps to the full +0.08.
pub fn form_adjustment(form: Option<&FormSummary>) -> f64 {
    match form {
        Some(f) if f.games() > 0 => {
            ((f.win_pct() - 0.5) * 2.0 * FORM_CAP).clamp(-FORM_CAP, FORM_CAP)
        }
        _ => 0.0,
    }
}

/// Head-to-head adjustment in `[-0.05, 0.05]`; exactly 0 when disabled or no
/// recent meetings are known.
pub fn h2h_adjustment(h2h: Option<&H2hRecord>) -> f64 {
    match h2h {
        Some(h) if h.games() > 0 => {
            let net = f64::from(h.team_wins) - f64::from(h.opponent_wins);
            ((net / f64::from(h.games())) * H2H_CAP).clamp(-H2H_CAP, H2H_CAP)
        }
        _ => 0.0,
    }
}

/// Full per-team scoring: weighted base plus all adjustments, final clamp.
pub fn score_team(
    stats: &StatsSummary,
    sentiment_summary: &str,
    injuries: &[String],
    form: Option<&FormSummary>,
    h2h: Option<&H2hRecord>,
) -> TeamScore {
    let base = base_score(stats);
    let tilt = sentiment_tilt(sentiment_summary);
    let penalty = injury_penalty(injuries);
    let form_adj = form_adjustment(form);
    let h2h_adj = h2h_adjustment(h2h);

    TeamScore {
        base_score: base,
        sentiment_tilt: tilt,
        injury_penalty: penalty,
        form_adjustment: form_adj,
        h2h_adjustment: h2h_adj,
        final_score: (base + tilt + penalty + form_adj + h2h_adj).clamp(0.0, 1.0),
    }
}
