// src/error.rs
use std::fmt;
use thiserror::Error;
use warp::reject::Reject;

/// Outcome of a market data request that did not produce data.
///
/// Providers report `NotFound` and `RateLimited` themselves; everything else
/// (network errors, bad status codes, malformed or incomplete JSON) is
/// `Transport`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

/// Bad user input, rejected before any network or storage call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("please enter a symbol")]
    EmptySymbol,
    #[error("price must be a positive number, got {0:?}")]
    InvalidPrice(String),
    #[error("condition must be `above` or `below`, got {0:?}")]
    InvalidCondition(String),
    #[error("amount must be a number, got {0:?}")]
    InvalidAmount(String),
    #[error("unsupported interval {0:?}")]
    UnknownInterval(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a user-triggered mutation. Nothing was changed when this is
/// returned.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Raised by the proxy route when the upstream quote could not be served.
#[derive(Debug)]
pub struct ProxyError {
    pub message: String,
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProxyError {}

impl Reject for ProxyError {}
