use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod cache;
mod config;
mod engine;
mod error;
mod history;
mod scoring;
mod server;
mod stats;
mod teams;

use cache::MemoryCache;
use config::Config;
use engine::collaborators::NoSentiment;
use engine::{EngineSettings, MatchupEngine};
use history::SqliteHistory;
use scoring::ModelParams;
use server::AppState;
use stats::{EspnStats, NbaStats, RetryPolicy, StatsAcquisitionChain, StatsProvider};
use teams::TeamIdentityResolver;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Comparison history store
    let history = Arc::new(SqliteHistory::open(&config.database_path)?);
    info!("History database opened: {}", config.database_path);

    // Stats sources, ordered: fast aggregator first, restricted direct
    // provider second.
    let fetch_timeout = Duration::from_secs(config.fetch_timeout_secs);
    let espn = Arc::new(EspnStats::new(Some(&config.espn_base_url), fetch_timeout)?);
    let nba = Arc::new(NbaStats::new(Some(&config.nba_base_url), fetch_timeout)?);

    let sources: Vec<Arc<dyn StatsProvider>> = vec![espn.clone(), nba];
    let chain = StatsAcquisitionChain::new(
        sources,
        fetch_timeout,
        RetryPolicy::new(
            config.max_retries,
            Duration::from_millis(config.retry_backoff_ms),
        ),
    );
    info!("Stats acquisition chain configured: {:?}", chain.source_names());

    let settings = EngineSettings {
        model: ModelParams {
            steepness: config.sigmoid_steepness,
            home_advantage: config.home_advantage,
        },
        team_score_ttl: Duration::from_secs(config.team_score_ttl_secs),
        result_ttl: Duration::from_secs(config.result_cache_ttl_secs),
        use_form_adjustment: !config.disable_form_adjustment,
        use_h2h_adjustment: !config.disable_h2h_adjustment,
    };

    let engine = Arc::new(MatchupEngine::new(
        TeamIdentityResolver::new(),
        chain,
        espn,
        // The real sentiment analyzer runs out of process; the engine only
        // needs the collaborator seam.
        Arc::new(NoSentiment),
        Arc::new(MemoryCache::new()),
        history.clone(),
        settings,
    ));

    let state = AppState {
        engine,
        history,
    };
    let app = server::router(state);
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
