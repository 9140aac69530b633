//! Error handling for the application

use thiserror::Error;

/// Quote/upstream market data errors
///
/// There is no safe default price, so these propagate to the monitor's
/// caller. Callers must treat them as "conditions unknown".
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("quote API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("quote API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed quote response: {0}")]
    Malformed(String),
}

/// Strategy-related errors
#[derive(Error, Debug, Clone)]
pub enum StrategyError {
    #[error("unknown strategy kind: {0}")]
    UnknownKind(String),

    #[error("invalid strategy parameters: {0}")]
    InvalidParameters(String),
}

/// Execution-related errors
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    #[error("signal rejected: {0}")]
    SignalRejected(String),

    #[error("transaction submission failed: {0}")]
    SubmissionFailed(String),

    #[error("network error: {0}")]
    NetworkError(String),
}

/// Agent-related errors
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("strategy not found: {0}")]
    StrategyNotFound(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("quote error: {0}")]
    QuoteError(String),

    #[error("strategy error: {0}")]
    StrategyError(String),

    #[error("execution error: {0}")]
    ExecutionError(String),

    #[error("agent error: {0}")]
    AgentError(String),
}

impl From<QuoteError> for AppError {
    fn from(err: QuoteError) -> Self {
        AppError::QuoteError(err.to_string())
    }
}

impl From<StrategyError> for AppError {
    fn from(err: StrategyError) -> Self {
        AppError::StrategyError(err.to_string())
    }
}

impl From<ExecutionError> for AppError {
    fn from(err: ExecutionError) -> Self {
        AppError::ExecutionError(err.to_string())
    }
}

impl From<AgentError> for AppError {
    fn from(err: AgentError) -> Self {
        AppError::AgentError(err.to_string())
    }
}
