use clap::Parser;

/// NBA matchup prediction service
#[derive(Parser, Debug, Clone)]
#[command(name = "courtcast", version, about)]
pub struct Config {
    /// API listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// SQLite database path for comparison history
    #[arg(long, env = "DATABASE_PATH", default_value = "courtcast.db")]
    pub database_path: String,

    /// Base URL of the primary (aggregator) stats API
    #[arg(
        long,
        env = "ESPN_BASE_URL",
        default_value = "https://site.api.espn.com/apis/site/v2/sports/basketball/nba"
    )]
    pub espn_base_url: String,

    /// Base URL of the secondary (direct) stats API
    #[arg(long, env = "NBA_BASE_URL", default_value = "https://stats.nba.com/stats")]
    pub nba_base_url: String,

    /// Per-source fetch timeout in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value = "4")]
    pub fetch_timeout_secs: u64,

    /// Maximum retries per source call (transient failures only)
    #[arg(long, env = "MAX_RETRIES", default_value = "1")]
    pub max_retries: u32,

    /// Fixed backoff before a retry, in milliseconds
    #[arg(long, env = "RETRY_BACKOFF_MS", default_value = "400")]
    pub retry_backoff_ms: u64,

    /// TTL for full comparison results, in seconds
    #[arg(long, env = "RESULT_CACHE_TTL_SECS", default_value = "3600")]
    pub result_cache_ttl_secs: u64,

    /// TTL for per-team stats, in seconds
    #[arg(long, env = "TEAM_SCORE_TTL_SECS", default_value = "1800")]
    pub team_score_ttl_secs: u64,

    /// Flat score offset credited to the home side
    #[arg(long, env = "HOME_ADVANTAGE", default_value = "0.03")]
    pub home_advantage: f64,

    /// Sigmoid steepness for the win-probability transform
    #[arg(long, env = "SIGMOID_STEEPNESS", default_value = "4.0")]
    pub sigmoid_steepness: f64,

    /// Disable the recent-form score adjustment
    #[arg(long, env = "DISABLE_FORM_ADJUSTMENT", default_value = "false")]
    pub disable_form_adjustment: bool,

    /// Disable the head-to-head score adjustment
    #[arg(long, env = "DISABLE_H2H_ADJUSTMENT", default_value = "false")]
    pub disable_h2h_adjustment: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fetch_timeout_secs == 0 {
            anyhow::bail!("fetch_timeout_secs must be at least 1");
        }
        if self.max_retries > 3 {
            anyhow::bail!("max_retries above 3 defeats the fail-fast latency budget");
        }
        if !(0.0..=0.2).contains(&self.home_advantage) {
            anyhow::bail!("home_advantage must be between 0.0 and 0.2");
        }
        if !(0.0..=20.0).contains(&self.sigmoid_steepness) || self.sigmoid_steepness == 0.0 {
            anyhow::bail!("sigmoid_steepness must be in (0, 20]");
        }
        if self.result_cache_ttl_secs == 0 || self.team_score_ttl_secs == 0 {
            anyhow::bail!("cache TTLs must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> Config {
        Config::parse_from(["courtcast"])
    }

    #[test]
    fn defaults_are_valid() {
        assert!(default_config().validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut cfg = default_config();
        cfg.fetch_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn excessive_home_advantage_is_rejected() {
        let mut cfg = default_config();
        cfg.home_advantage = 0.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn retry_budget_is_bounded() {
        let mut cfg = default_config();
        cfg.max_retries = 10;
        assert!(cfg.validate().is_err());
    }
}
