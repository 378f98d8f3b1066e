//! Market odds reconciliation.
//!
//! The model's probability is compared against an externally observed betting
//! line: American moneylines convert to implied probabilities, the point
//! spread names the market favorite, and the gap between model and market
//! becomes an "edge" signal in percentage points.

use serde::{Deserialize, Serialize};

/// A betting line as observed from the market, all fields best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketLine {
    /// Point spread from the home side's perspective; negative means the
    /// home team is favored.
    pub spread: Option<f64>,
    pub home_moneyline: Option<i32>,
    pub away_moneyline: Option<i32>,
    pub over_under: Option<f64>,
}

/// Model-vs-market comparison attached to a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsComparison {
    /// `None` when the line is a pick'em or carries no spread.
    pub market_favorite: Option<String>,
    /// Implied probability of the market favorite's moneyline.
    pub market_implied_probability: Option<f64>,
    pub model_favorite: String,
    /// False only when the market names a different favorite than the model.
    pub agreement: bool,
    /// Percentage points. When model and market agree this is how much MORE
    /// confident the model is; on disagreement it is the model's confidence
    /// in the contrarian pick. `None` without a usable moneyline.
    pub edge_score: Option<f64>,
}

/// Convert an American moneyline to an implied win probability.
///
/// `-150` → 150/250 = 0.60; `+150` → 100/250 = 0.40.
pub fn implied_probability(moneyline: i32) -> f64 {
    let m = f64::from(moneyline);
    if moneyline < 0 {
        m.abs() / (m.abs() + 100.0)
    } else {
        100.0 / (m + 100.0)
    }
}

/// Compare the model's favorite and probability against the market line.
pub fn compare_with_market(
    line: &MarketLine,
    home_team: &str,
    away_team: &str,
    model_favorite: &str,
    model_probability: f64,
) -> OddsComparison {
    // The spread sign names the market favorite; a zero spread is a pick'em.
    let market_favorite = match line.spread {
        Some(s) if s < 0.0 => Some(home_team.to_string()),
        Some(s) if s > 0.0 => Some(away_team.to_string()),
        _ => None,
    };

    let market_implied_probability = market_favorite.as_deref().and_then(|fav| {
        let ml = if fav == home_team {
            line.home_moneyline
        } else {
            line.away_moneyline
        };
        ml.map(implied_probability)
    });

    let agreement = market_favorite
        .as_deref()
        .map(|fav| fav == model_favorite)
        .unwrap_or(true);

    let edge_score = market_implied_probability.map(|market| {
        if agreement {
            (model_probability - market) * 100.0
        } else {
            (model_probability - (1.0 - market)) * 100.0
        }
    });

    OddsComparison {
        market_favorite,
        market_implied_probability,
        model_favorite: model_favorite.to_string(),
        agreement,
        edge_score,
    }
}
