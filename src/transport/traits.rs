use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::fcm::FirebaseError;

/// One HTTP POST, as handed to a transport
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Status and body of a completed POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Performs exactly one POST per call
///
/// Implementations resolve once: with the status and body when the server
/// answered (whatever the status), or with an error when no HTTP response
/// was obtained.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, FirebaseError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Settings shared by both transport implementations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportSettings {
    /// Whole-request timeout, `None` leaves the transport's own default
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

/// Which transport a client is built with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Async client on the tokio runtime (reqwest)
    #[default]
    Http,
    /// Fresh libcurl easy handle per request, run on the blocking pool
    Curl,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "curl" => Ok(Self::Curl),
            other => Err(format!("unknown transport '{}', expected http or curl", other)),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Curl => f.write_str("curl"),
        }
    }
}
