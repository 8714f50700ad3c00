//! Stateless clients for the production REST services
//!
//! Each client translates typed arguments into one HTTP request and renders
//! the JSON response. There is no retry, backoff, or connection reuse across
//! invocations; failures surface immediately to the command layer.

pub mod client;
pub mod copydb;
pub mod datacheck;
pub mod dbcopy;
pub mod event;
pub mod genome_metadata;
pub mod gifts;
pub mod handover;
pub mod metadata;

use std::fmt;

/// Client-side failure taxonomy. Transport problems ("service unreachable")
/// are kept apart from response-shape problems ("service returned something
/// unexpected") so operators can tell the two situations apart in the logs.
#[derive(Debug)]
pub enum RestError {
    /// The HTTP exchange itself failed (connection, timeout, TLS).
    Transport(reqwest::Error),
    /// The service answered with a non-2xx status.
    Status { status: reqwest::StatusCode, body: String },
    /// The response body was not the JSON we asked for.
    Decode(String),
    /// The response decoded but an expected field was absent.
    MissingField { field: &'static str, response: String },
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RestError::Transport(err) => write!(f, "Transport error: {err}"),
            RestError::Status { status, body } => {
                write!(f, "Service responded with {status}: {body}")
            }
            RestError::Decode(msg) => write!(f, "Invalid response body: {msg}"),
            RestError::MissingField { field, response } => {
                write!(f, "Invalid response. Missing field '{field}'. Response: {response}")
            }
        }
    }
}

impl std::error::Error for RestError {}

impl From<reqwest::Error> for RestError {
    fn from(err: reqwest::Error) -> RestError {
        if err.is_decode() {
            RestError::Decode(err.to_string())
        } else {
            RestError::Transport(err)
        }
    }
}
