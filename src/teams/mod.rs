//! Team identity resolution.
//!
//! Free-form team strings ("Lakers", "la lakers", "LAL") are mapped onto a
//! canonical league table before any upstream lookup. Matching is layered,
//! first hit wins:
//!
//! 1. exact case-insensitive match against the canonical name
//! 2. known alias/nickname table
//! 3. substring match in either direction against canonical full names
//! 4. abbreviation equality
//!
//! A miss is NOT an error: the input is echoed back with `resolved = false`
//! and callers proceed with placeholder data downstream.

use std::collections::HashMap;
use std::sync::RwLock;

/// One row of the canonical league table.
pub struct TeamRecord {
    pub canonical: &'static str,
    pub abbreviation: &'static str,
    /// Numeric id used by the direct stats provider.
    pub provider_id: u32,
    pub aliases: &'static [&'static str],
}

/// Result of resolving a free-form team string.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamIdentity {
    /// The caller's original (trimmed) input.
    pub input: String,
    /// Canonical full name, or the input unchanged when unresolved.
    pub canonical: String,
    pub abbreviation: Option<String>,
    pub provider_id: Option<u32>,
    pub resolved: bool,
}

impl TeamIdentity {
    fn unresolved(input: &str) -> Self {
        let trimmed = input.trim().to_string();
        TeamIdentity {
            input: trimmed.clone(),
            canonical: trimmed,
            abbreviation: None,
            provider_id: None,
            resolved: false,
        }
    }

    fn from_record(input: &str, record: &TeamRecord) -> Self {
        TeamIdentity {
            input: input.trim().to_string(),
            canonical: record.canonical.to_string(),
            abbreviation: Some(record.abbreviation.to_string()),
            provider_id: Some(record.provider_id),
            resolved: true,
        }
    }
}

/// Resolver with a process-lifetime memo cache.
///
/// The league is small and fixed, so the cache is a plain map with no
/// eviction. Lookups are read-mostly; the lock is never held across awaits.
pub struct TeamIdentityResolver {
    cache: RwLock<HashMap<String, TeamIdentity>>,
}

impl TeamIdentityResolver {
    pub fn new() -> Self {
        TeamIdentityResolver {
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, name: &str) -> TeamIdentity {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return TeamIdentity::unresolved(name);
        }
        if let Some(hit) = self.cache.read().unwrap().get(&key) {
            return hit.clone();
        }

        let identity = match lookup(&key) {
            Some(record) => TeamIdentity::from_record(name, record),
            None => TeamIdentity::unresolved(name),
        };
        self.cache
            .write()
            .unwrap()
            .insert(key, identity.clone());
        identity
    }
}

impl Default for TeamIdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Layered lookup against the static league table. `key` must already be
/// trimmed and lowercased.
fn lookup(key: &str) -> Option<&'static TeamRecord> {
    // 1. exact canonical match
    if let Some(r) = LEAGUE.iter().find(|r| r.canonical.to_lowercase() == key) {
        return Some(r);
    }
    // 2. alias table
    if let Some(r) = LEAGUE.iter().find(|r| r.aliases.iter().any(|a| *a == key)) {
        return Some(r);
    }
    // 3. substring either direction against canonical full names
    if let Some(r) = LEAGUE.iter().find(|r| {
        let canonical = r.canonical.to_lowercase();
        canonical.contains(key) || key.contains(&canonical)
    }) {
        return Some(r);
    }
    // 4. abbreviation equality
    LEAGUE.iter().find(|r| r.abbreviation.to_lowercase() == key)
}

/// All canonical teams, for the `/api/teams` listing.
pub fn all_teams() -> impl Iterator<Item = &'static TeamRecord> {
    LEAGUE.iter()
}

/// Canonical NBA league table. Provider ids are the numeric team ids used by
/// the direct stats API; aliases cover city-only names, nicknames, and common
/// short forms.
static LEAGUE: &[TeamRecord] = &[
    TeamRecord {
        canonical: "Atlanta Hawks",
        abbreviation: "ATL",
        provider_id: 1610612737,
        aliases: &["hawks", "atlanta"],
    },
    TeamRecord {
        canonical: "Boston Celtics",
        abbreviation: "BOS",
        provider_id: 1610612738,
        aliases: &["celtics", "boston"],
    },
    TeamRecord {
        canonical: "Brooklyn Nets",
        abbreviation: "BKN",
        provider_id: 1610612751,
        aliases: &["nets", "brooklyn", "bkn nets"],
    },
    TeamRecord {
        canonical: "Charlotte Hornets",
        abbreviation: "CHA",
        provider_id: 1610612766,
        aliases: &["hornets", "charlotte"],
    },
    TeamRecord {
        canonical: "Chicago Bulls",
        abbreviation: "CHI",
        provider_id: 1610612741,
        aliases: &["bulls", "chicago"],
    },
    TeamRecord {
        canonical: "Cleveland Cavaliers",
        abbreviation: "CLE",
        provider_id: 1610612739,
        aliases: &["cavaliers", "cavs", "cleveland", "cleveland cavs"],
    },
    TeamRecord {
        canonical: "Dallas Mavericks",
        abbreviation: "DAL",
        provider_id: 1610612742,
        aliases: &["mavericks", "mavs", "dallas"],
    },
    TeamRecord {
        canonical: "Denver Nuggets",
        abbreviation: "DEN",
        provider_id: 1610612743,
        aliases: &["nuggets", "denver"],
    },
    TeamRecord {
        canonical: "Detroit Pistons",
        abbreviation: "DET",
        provider_id: 1610612765,
        aliases: &["pistons", "detroit"],
    },
    TeamRecord {
        canonical: "Golden State Warriors",
        abbreviation: "GSW",
        provider_id: 1610612744,
        aliases: &["warriors", "golden state", "dubs", "gs"],
    },
    TeamRecord {
        canonical: "Houston Rockets",
        abbreviation: "HOU",
        provider_id: 1610612745,
        aliases: &["rockets", "houston"],
    },
    TeamRecord {
        canonical: "Indiana Pacers",
        abbreviation: "IND",
        provider_id: 1610612754,
        aliases: &["pacers", "indiana"],
    },
    TeamRecord {
        canonical: "Los Angeles Clippers",
        abbreviation: "LAC",
        provider_id: 1610612746,
        aliases: &["clippers", "la clippers", "la clips"],
    },
    TeamRecord {
        canonical: "Los Angeles Lakers",
        abbreviation: "LAL",
        provider_id: 1610612747,
        aliases: &["lakers", "la lakers"],
    },
    TeamRecord {
        canonical: "Memphis Grizzlies",
        abbreviation: "MEM",
        provider_id: 1610612763,
        aliases: &["grizzlies", "memphis"],
    },
    TeamRecord {
        canonical: "Miami Heat",
        abbreviation: "MIA",
        provider_id: 1610612748,
        aliases: &["heat", "miami"],
    },
    TeamRecord {
        canonical: "Milwaukee Bucks",
        abbreviation: "MIL",
        provider_id: 1610612749,
        aliases: &["bucks", "milwaukee"],
    },
    TeamRecord {
        canonical: "Minnesota Timberwolves",
        abbreviation: "MIN",
        provider_id: 1610612750,
        aliases: &["timberwolves", "wolves", "minnesota", "minnesota wolves"],
    },
    TeamRecord {
        canonical: "New Orleans Pelicans",
        abbreviation: "NOP",
        provider_id: 1610612740,
        aliases: &["pelicans", "new orleans", "nola", "no"],
    },
    TeamRecord {
        canonical: "New York Knicks",
        abbreviation: "NYK",
        provider_id: 1610612752,
        aliases: &["knicks", "ny knicks", "ny"],
    },
    TeamRecord {
        canonical: "Oklahoma City Thunder",
        abbreviation: "OKC",
        provider_id: 1610612760,
        aliases: &["thunder", "oklahoma city", "okc thunder"],
    },
    TeamRecord {
        canonical: "Orlando Magic",
        abbreviation: "ORL",
        provider_id: 1610612753,
        aliases: &["magic", "orlando"],
    },
    TeamRecord {
        canonical: "Philadelphia 76ers",
        abbreviation: "PHI",
        provider_id: 1610612755,
        aliases: &["76ers", "sixers", "philadelphia", "philadelphia sixers", "philly"],
    },
    TeamRecord {
        canonical: "Phoenix Suns",
        abbreviation: "PHX",
        provider_id: 1610612756,
        aliases: &["suns", "phoenix"],
    },
    TeamRecord {
        canonical: "Portland Trail Blazers",
        abbreviation: "POR",
        provider_id: 1610612757,
        aliases: &["trail blazers", "blazers", "portland", "portland blazers"],
    },
    TeamRecord {
        canonical: "Sacramento Kings",
        abbreviation: "SAC",
        provider_id: 1610612758,
        aliases: &["kings", "sacramento"],
    },
    TeamRecord {
        canonical: "San Antonio Spurs",
        abbreviation: "SAS",
        provider_id: 1610612759,
        aliases: &["spurs", "san antonio"],
    },
    TeamRecord {
        canonical: "Toronto Raptors",
        abbreviation: "TOR",
        provider_id: 1610612761,
        aliases: &["raptors", "toronto"],
    },
    TeamRecord {
        canonical: "Utah Jazz",
        abbreviation: "UTA",
        provider_id: 1610612762,
        aliases: &["jazz", "utah"],
    },
    TeamRecord {
        canonical: "Washington Wizards",
        abbreviation: "WAS",
        provider_id: 1610612764,
        aliases: &["wizards", "washington"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_name_resolves() {
        let r = TeamIdentityResolver::new();
        let id = r.resolve("Los Angeles Lakers");
        assert!(id.resolved);
        assert_eq!(id.canonical, "Los Angeles Lakers");
        assert_eq!(id.abbreviation.as_deref(), Some("LAL"));
    }

    #[test]
    fn nickname_matches_full_name() {
        let r = TeamIdentityResolver::new();
        let short = r.resolve("Lakers");
        let full = r.resolve("Los Angeles Lakers");
        assert_eq!(short.canonical, full.canonical);
        assert_eq!(short.provider_id, full.provider_id);
    }

    #[test]
    fn abbreviation_resolves() {
        let r = TeamIdentityResolver::new();
        let id = r.resolve("GSW");
        assert!(id.resolved);
        assert_eq!(id.canonical, "Golden State Warriors");
    }

    #[test]
    fn substring_both_directions() {
        let r = TeamIdentityResolver::new();
        // Input shorter than canonical
        assert_eq!(r.resolve("Trail Blazers").canonical, "Portland Trail Blazers");
        // Input longer than canonical
        assert_eq!(
            r.resolve("the Boston Celtics basketball team")
                .canonical
                .as_str(),
            "Boston Celtics"
        );
    }

    #[test]
    fn unknown_team_is_echoed_with_flag() {
        let r = TeamIdentityResolver::new();
        let id = r.resolve("Springfield Isotopes");
        assert!(!id.resolved);
        assert_eq!(id.canonical, "Springfield Isotopes");
        assert!(id.provider_id.is_none());
    }

    #[test]
    fn whitespace_and_case_are_ignored() {
        let r = TeamIdentityResolver::new();
        let id = r.resolve("  miami HEAT ");
        assert!(id.resolved);
        assert_eq!(id.canonical, "Miami Heat");
    }

    #[test]
    fn resolution_is_memoized() {
        let r = TeamIdentityResolver::new();
        r.resolve("celtics");
        assert!(r.cache.read().unwrap().contains_key("celtics"));
        // Second call must serve the cached identity.
        let again = r.resolve("celtics");
        assert!(again.resolved);
    }

    #[test]
    fn league_table_is_complete() {
        assert_eq!(LEAGUE.len(), 30);
        let mut abbrs: Vec<&str> = LEAGUE.iter().map(|r| r.abbreviation).collect();
        abbrs.sort_unstable();
        abbrs.dedup();
        assert_eq!(abbrs.len(), 30, "abbreviations must be unique");
    }
}
