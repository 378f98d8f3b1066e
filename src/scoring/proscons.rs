//! Per-team pros/cons bullet points.
//!
//! Threshold rules over stats, sentiment markers, and the injury list feed a
//! deduplicated, order-preserving selection. When real data is thin the list
//! is padded with generic entries so the report always shows 3–5 of each.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::stats::StatsSummary;

const MIN_ITEMS: usize = 3;
const MAX_ITEMS: usize = 5;

const SIGNIFICANT_INJURY_KEYWORDS: &[&str] = &["out", "injured", "surgery", "fracture", "torn"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProsCons {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

pub fn generate(stats: &StatsSummary, sentiment_summary: &str, injuries: &[String]) -> ProsCons {
    let mut pros = Vec::new();
    pros.extend(pros_from_stats(stats));
    pros.extend(pros_from_sentiment(sentiment_summary));
    pros.extend(pros_from_injuries(injuries));

    let mut cons = Vec::new();
    cons.extend(cons_from_stats(stats));
    cons.extend(cons_from_sentiment(sentiment_summary));
    cons.extend(cons_from_injuries(injuries));

    ProsCons {
        pros: finalize(pros, GENERIC_PROS),
        cons: finalize(cons, GENERIC_CONS),
    }
}

/// Placeholder stats contribute no stat-derived lines; neutral defaults would
/// read as real observations.
fn pros_from_stats(stats: &StatsSummary) -> Vec<String> {
    let mut pros = Vec::new();
    if stats.is_placeholder() {
        return pros;
    }

    if stats.shooting_pct >= 0.47 {
        pros.push("Excellent shooting efficiency".to_string());
    } else if stats.shooting_pct >= 0.45 {
        pros.push("Strong field goal percentage".to_string());
    }

    if stats.rebounding_avg >= 45.0 {
        pros.push("Dominant rebounding presence".to_string());
    } else if stats.rebounding_avg >= 43.0 {
        pros.push("Strong rebounding performance".to_string());
    }

    if stats.turnovers_avg <= 12.0 {
        pros.push("Excellent ball control and low turnover rate".to_string());
    } else if stats.turnovers_avg <= 13.5 {
        pros.push("Good ball security".to_string());
    }

    if stats.net_rating_proxy >= 5.0 {
        pros.push("Strong positive point differential".to_string());
    } else if stats.net_rating_proxy >= 2.0 {
        pros.push("Consistent scoring advantage".to_string());
    }

    pros
}

fn cons_from_stats(stats: &StatsSummary) -> Vec<String> {
    let mut cons = Vec::new();
    if stats.is_placeholder() {
        return cons;
    }

    if stats.shooting_pct < 0.43 {
        cons.push("Below-average shooting efficiency".to_string());
    } else if stats.shooting_pct < 0.45 {
        cons.push("Inconsistent shooting performance".to_string());
    }

    if stats.rebounding_avg < 40.0 {
        cons.push("Rebounding struggles".to_string());
    } else if stats.rebounding_avg < 42.0 {
        cons.push("Average rebounding numbers".to_string());
    }

    if stats.turnovers_avg >= 16.0 {
        cons.push("High turnover rate and ball security concerns".to_string());
    } else if stats.turnovers_avg >= 15.0 {
        cons.push("Turnover-prone in key situations".to_string());
    }

    if stats.net_rating_proxy <= -3.0 {
        cons.push("Negative point differential indicates defensive issues".to_string());
    } else if stats.net_rating_proxy <= 0.0 {
        cons.push("Marginal scoring differential".to_string());
    }

    cons
}

fn pros_from_sentiment(summary: &str) -> Vec<String> {
    let mut pros = Vec::new();
    if summary.is_empty() {
        return pros;
    }
    let lower = summary.to_lowercase();

    if ["positive", "optimistic", "confident"].iter().any(|w| lower.contains(w)) {
        pros.push("Positive fan and community sentiment".to_string());
    }
    if ["strong", "excellent", "great"].iter().any(|w| lower.contains(w)) {
        pros.push("Strong community support and enthusiasm".to_string());
    }

    pros
}

fn cons_from_sentiment(summary: &str) -> Vec<String> {
    let mut cons = Vec::new();
    if summary.is_empty() {
        return cons;
    }
    let lower = summary.to_lowercase();

    if ["negative", "concerns", "worries", "uncertainty"].iter().any(|w| lower.contains(w)) {
        cons.push("Community sentiment shows concerns".to_string());
    }
    if ["poor", "disappointing", "struggling"].iter().any(|w| lower.contains(w)) {
        cons.push("Disappointing performance from fan perspective".to_string());
    }
    if lower.contains("mixed") || lower.contains("uncertain") {
        cons.push("Uncertainty in team outlook".to_string());
    }

    cons
}

fn pros_from_injuries(injuries: &[String]) -> Vec<String> {
    if injuries.is_empty() {
        vec![
            "Full roster availability".to_string(),
            "No significant injury concerns".to_string(),
        ]
    } else {
        Vec::new()
    }
}

fn cons_from_injuries(injuries: &[String]) -> Vec<String> {
    if injuries.is_empty() {
        return Vec::new();
    }

    let significant: Vec<&String> = injuries
        .iter()
        .filter(|entry| {
            let lower = entry.to_lowercase();
            SIGNIFICANT_INJURY_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .collect();

    if significant.len() >= 2 {
        vec![format!(
            "Multiple key players injured: {}, {}",
            significant[0], significant[1]
        )]
    } else if significant.len() == 1 {
        vec![format!("Key player injury concern: {}", significant[0])]
    } else {
        vec![format!(
            "Injury concerns: {}",
            injuries
                .iter()
                .take(2)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        )]
    }
}

const GENERIC_PROS: &[&str] = &[
    "Experienced roster with playoff potential",
    "Strong team chemistry and coaching",
    "Competitive in key matchups",
];

const GENERIC_CONS: &[&str] = &[
    "Consistency issues in recent performances",
    "Room for improvement in key areas",
    "Challenges in closing out games",
];

/// Dedup preserving order, cap at 5, pad with generics up to 3.
fn finalize(items: Vec<String>, generics: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result: Vec<String> = items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .take(MAX_ITEMS)
        .collect();

    for generic in generics {
        if result.len() >= MIN_ITEMS {
            break;
        }
        if !result.iter().any(|r| r == generic) {
            result.push((*generic).to_string());
        }
    }

    result
}
