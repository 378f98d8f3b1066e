use thiserror::Error;

/// Errors that are allowed to reach a caller of the matchup engine.
///
/// Everything else degrades internally: a failed stats fetch falls back to
/// placeholder data, a broken cache is skipped and the result computed fresh,
/// a history write failure is logged and dropped. Rejecting an unsupported
/// sport is the single fail-fast path.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unsupported sport '{0}' (only basketball is available)")]
    UnsupportedSport(String),
}
