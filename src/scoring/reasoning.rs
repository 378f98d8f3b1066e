//! Deterministic natural-language rationale for a prediction.
//!
//! Rendering is threshold-driven with no randomness: identical inputs always
//! produce identical lines, in a fixed category order — relative strength,
//! momentum, head-to-head, home advantage, probability band, market
//! comparison. A category contributes at most two lines and is omitted
//! entirely when its optional input is absent.

use super::odds::OddsComparison;
use crate::stats::FormSummary;

/// Everything the generator may draw on. Optional fields gate their
/// categories.
pub struct ReasoningInputs<'a> {
    pub favored_team: &'a str,
    pub underdog_team: &'a str,
    /// Final strength scores, both in [0, 1].
    pub favored_score: f64,
    pub underdog_score: f64,
    /// Probability for the favored side, >= 0.5.
    pub win_probability: f64,
    pub favored_is_home: bool,
    pub odds: Option<&'a OddsComparison>,
    pub favored_form: Option<&'a FormSummary>,
    pub underdog_form: Option<&'a FormSummary>,
    /// Pre-rendered head-to-head summary line, e.g. from
    /// [`crate::stats::H2hRecord::describe`].
    pub h2h_summary: Option<&'a str>,
}

/// Score gap expressed in "points" (score delta × 100) and its thresholds.
const GAP_DOMINANT: f64 = 15.0;
const GAP_CLEAR: f64 = 8.0;
const GAP_SLIGHT: f64 = 3.0;

pub fn generate(inputs: &ReasoningInputs<'_>) -> Vec<String> {
    let mut lines = Vec::new();

    strength_lines(inputs, &mut lines);
    momentum_lines(inputs, &mut lines);
    if let Some(h2h) = inputs.h2h_summary {
        lines.push(format!("{}.", h2h.trim_end_matches('.')));
    }
    home_lines(inputs, &mut lines);
    probability_lines(inputs, &mut lines);
    market_lines(inputs, &mut lines);

    lines
}

fn strength_lines(inputs: &ReasoningInputs<'_>, lines: &mut Vec<String>) {
    let gap = (inputs.favored_score - inputs.underdog_score) * 100.0;
    let line = if gap > GAP_DOMINANT {
        format!(
            "{} has been significantly stronger than {} across recent performance metrics.",
            inputs.favored_team, inputs.underdog_team
        )
    } else if gap > GAP_CLEAR {
        format!(
            "{} has been the better team recently, outpacing {} on the key metrics.",
            inputs.favored_team, inputs.underdog_team
        )
    } else if gap > GAP_SLIGHT {
        format!(
            "{} holds a slight statistical edge over {}.",
            inputs.favored_team, inputs.underdog_team
        )
    } else {
        format!(
            "{} and {} are closely matched on recent performance.",
            inputs.favored_team, inputs.underdog_team
        )
    };
    lines.push(line);
}

fn momentum_lines(inputs: &ReasoningInputs<'_>, lines: &mut Vec<String>) {
    if let Some(form) = inputs.favored_form {
        lines.push(format!("{}.", form.describe(inputs.favored_team)));
    }
    if let Some(form) = inputs.underdog_form {
        // Only worth a line when the underdog's run cuts against the pick.
        if form.win_pct() > 0.6 {
            lines.push(format!(
                "{}, so the underdog arrives with momentum.",
                form.describe(inputs.underdog_team)
            ));
        }
    }
}

fn home_lines(inputs: &ReasoningInputs<'_>, lines: &mut Vec<String>) {
    if inputs.favored_is_home {
        lines.push(format!(
            "Home court adds a small but real edge for {}.",
            inputs.favored_team
        ));
    } else {
        lines.push(format!(
            "{} is favored despite playing on the road.",
            inputs.favored_team
        ));
    }
}

fn probability_lines(inputs: &ReasoningInputs<'_>, lines: &mut Vec<String>) {
    let pct = inputs.win_probability * 100.0;
    let line = if inputs.win_probability >= 0.70 {
        format!(
            "The model makes {} a clear favorite at {:.0}%.",
            inputs.favored_team, pct
        )
    } else if inputs.win_probability >= 0.58 {
        format!(
            "The model gives {} a solid {:.0}% chance to win.",
            inputs.favored_team, pct
        )
    } else {
        format!(
            "The model narrowly favors {} at {:.0}%; this one could go either way.",
            inputs.favored_team, pct
        )
    };
    lines.push(line);
}

fn market_lines(inputs: &ReasoningInputs<'_>, lines: &mut Vec<String>) {
    let Some(odds) = inputs.odds else {
        return;
    };

    match (&odds.market_favorite, odds.agreement) {
        (Some(_), true) => {
            lines.push(format!(
                "The betting market also favors {}.",
                inputs.favored_team
            ));
            if let Some(edge) = odds.edge_score {
                if edge.abs() >= 5.0 {
                    lines.push(format!(
                        "The model is {:.0} percentage points {} confident than the market's implied line.",
                        edge.abs(),
                        if edge >= 0.0 { "more" } else { "less" }
                    ));
                }
            }
        }
        (Some(market_fav), false) => {
            lines.push(format!(
                "The betting market disagrees and favors {}.",
                market_fav
            ));
            if let Some(edge) = odds.edge_score {
                lines.push(format!(
                    "The model's contrarian confidence in {} runs {:.0} percentage points against the market.",
                    inputs.favored_team,
                    edge.abs()
                ));
            }
        }
        (None, _) => {
            lines.push("The market lists this game as a pick'em.".to_string());
        }
    }
}
