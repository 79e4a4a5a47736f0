//! Typed outcome of a single send

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::error::FirebaseError;
use crate::transport::TransportResponse;

/// Per-destination entry of the gateway's JSON reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayResult {
    pub message_id: Option<String>,
    /// Canonical token the gateway wants the caller to use from now on
    pub registration_id: Option<String>,
    pub error: Option<String>,
}

/// JSON body returned by the legacy send endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayReply {
    pub multicast_id: Option<u64>,
    pub success: Option<u32>,
    pub failure: Option<u32>,
    pub canonical_ids: Option<u32>,
    #[serde(default)]
    pub results: Vec<GatewayResult>,
    /// Some failure modes report a single top-level error string instead of results
    pub error: Option<String>,
}

impl GatewayReply {
    fn reported_error(&self) -> Option<FirebaseError> {
        let errors = self
            .error
            .iter()
            .chain(self.results.iter().filter_map(|r| r.error.as_ref()))
            .map(|message| FirebaseError::from_message(message))
            .collect();
        FirebaseError::from_multiple(errors)
    }
}

/// Result of one send, produced exactly once per call
#[derive(Debug)]
pub struct FirebaseResponse {
    /// True for a 2xx status with no transport or gateway-reported error
    pub success: bool,
    pub error: Option<FirebaseError>,
    /// Absent when the request never produced an HTTP response
    pub status_code: Option<u16>,
    pub body: Option<Vec<u8>>,
    /// Decoded body, when it was valid gateway JSON
    pub reply: Option<GatewayReply>,
}

impl FirebaseResponse {
    /// Build the response for a completed transport call
    pub fn from_transport(result: Result<TransportResponse, FirebaseError>) -> Self {
        match result {
            Ok(response) => Self::from_http(response.status, response.body),
            Err(error) => Self::failed(error),
        }
    }

    /// Response for a send that never got an HTTP status back
    pub fn failed(error: FirebaseError) -> Self {
        Self {
            success: false,
            error: Some(error),
            status_code: None,
            body: None,
            reply: None,
        }
    }

    /// Classify an HTTP status and body
    ///
    /// The status code wins: 400, 401 and 5xx are classified without looking
    /// at the body. Otherwise error strings reported in the body are mapped,
    /// and a non-2xx status nothing else explains becomes `Unknown`.
    pub fn from_http(status: u16, body: Vec<u8>) -> Self {
        let reply = if body.is_empty() {
            None
        } else {
            serde_json::from_slice::<GatewayReply>(&body).ok()
        };

        let error = FirebaseError::from_status(status)
            .or_else(|| match &reply {
                Some(reply) => reply.reported_error(),
                None => plain_text_error(&body),
            })
            .or_else(|| {
                if (200..300).contains(&status) {
                    None
                } else {
                    Some(FirebaseError::Unknown)
                }
            });

        Self {
            success: error.is_none(),
            error,
            status_code: Some(status),
            body: Some(body),
            reply,
        }
    }

    /// Id the gateway assigned to the delivered message, if any
    pub fn message_id(&self) -> Option<&str> {
        self.reply
            .as_ref()?
            .results
            .iter()
            .find_map(|r| r.message_id.as_deref())
    }

    /// Canonical token the gateway asked the caller to switch to, if any
    pub fn canonical_token(&self) -> Option<&str> {
        self.reply
            .as_ref()?
            .results
            .iter()
            .find_map(|r| r.registration_id.as_deref())
    }

    pub fn body_text(&self) -> Option<Cow<'_, str>> {
        self.body.as_deref().map(String::from_utf8_lossy)
    }
}

/// The gateway answers `Error=<Message>` when it could not produce JSON
fn plain_text_error(body: &[u8]) -> Option<FirebaseError> {
    let text = std::str::from_utf8(body).ok()?.trim();
    text.strip_prefix("Error=").map(FirebaseError::from_message)
}
