pub mod normalizer;
pub mod odds;
pub mod proscons;
pub mod reasoning;
pub mod win_probability;

pub use normalizer::{score_team, TeamScore};
pub use odds::{compare_with_market, implied_probability, MarketLine, OddsComparison};
pub use proscons::ProsCons;
pub use win_probability::{
    confidence_label, predict, score_breakdown, sigmoid, MatchupPrediction, ModelParams,
};
