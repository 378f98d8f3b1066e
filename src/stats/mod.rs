pub mod chain;
pub mod espn;
pub mod nba;
pub mod provider;
pub mod retry;
pub mod types;

pub use chain::StatsAcquisitionChain;
pub use espn::EspnStats;
pub use nba::NbaStats;
pub use provider::{FetchFailure, StatsProvider, StatsWindow};
pub use retry::RetryPolicy;
pub use types::{FormSummary, H2hRecord, StatsSummary, StatsTier};
