//! Error taxonomy for gateway sends
//!
//! Every way a single send can fail maps to one `FirebaseError` variant.
//! Status-code classification takes priority over the message strings the
//! gateway embeds in its JSON body.

use std::path::PathBuf;
use thiserror::Error;

/// Classified failure of one send attempt
#[derive(Error, Debug)]
pub enum FirebaseError {
    /// The gateway rejected the request body as malformed JSON (HTTP 400)
    #[error("Gateway reported an invalid JSON payload")]
    InvalidJson,

    /// The server key was rejected (HTTP 401)
    #[error("Gateway rejected the server key")]
    InvalidServerKey,

    /// Internal gateway failure (HTTP 5xx)
    #[error("Gateway internal error")]
    ServerError,

    #[error("Invalid device token")]
    InvalidRegistration,

    #[error("Missing device token")]
    MissingRegistration,

    /// The device token is no longer registered with the gateway
    #[error("Device token is not registered")]
    NotRegistered,

    /// The transport completed without any response bytes
    #[error("No response data received")]
    NoData,

    #[error("Unknown gateway error")]
    Unknown,

    /// Failure below HTTP: connectivity, DNS, TLS, unparsable response
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The message could not be encoded in the gateway's wire format
    #[error("Failed to serialize message: {reason}")]
    Serialization {
        reason: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Failed to read server key from '{path}'")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Several errors reported for one send
    #[error("Multiple gateway errors: {0:?}")]
    Multiple(Vec<FirebaseError>),
}

impl FirebaseError {
    /// Classify a gateway-reported message string
    pub fn from_message(message: &str) -> Self {
        match message {
            "InvalidRegistration" => Self::InvalidRegistration,
            "MissingRegistration" => Self::MissingRegistration,
            "NotRegistered" => Self::NotRegistered,
            _ => Self::Unknown,
        }
    }

    /// Classify an HTTP status code, `None` when the status carries no error class
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(Self::InvalidJson),
            401 => Some(Self::InvalidServerKey),
            500..=599 => Some(Self::ServerError),
            _ => None,
        }
    }

    /// Collapse a list of errors: none yields `None`, one is returned as-is
    pub fn from_multiple(mut errors: Vec<FirebaseError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization {
            reason: reason.into(),
            source: None,
        }
    }

    /// Short machine-friendly name used in logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid_json",
            Self::InvalidServerKey => "invalid_server_key",
            Self::ServerError => "server_error",
            Self::InvalidRegistration => "invalid_registration",
            Self::MissingRegistration => "missing_registration",
            Self::NotRegistered => "not_registered",
            Self::NoData => "no_data",
            Self::Unknown => "unknown",
            Self::Transport { .. } => "transport",
            Self::Serialization { .. } => "serialization",
            Self::KeyFile { .. } => "key_file",
            Self::Multiple(_) => "multiple",
        }
    }
}

impl From<reqwest::Error> for FirebaseError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else {
            err.to_string()
        };
        Self::transport_with_source(message, err)
    }
}

impl From<curl::Error> for FirebaseError {
    fn from(err: curl::Error) -> Self {
        Self::transport_with_source(err.description().to_string(), err)
    }
}
