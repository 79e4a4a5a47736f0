//! Wire format encoding for the legacy gateway endpoint
//!
//! A message is sent as one flat JSON object:
//!
//! ```text
//! {"to": "<device token>", <payload fields...>, <delivery options...>}
//! ```
//!
//! `to` always comes first, payload fields follow, and only the delivery
//! options that are set are written. A payload of `{"message":"hi"}` sent to
//! token `T` therefore encodes to exactly `{"to":"T","message":"hi"}`.

use serde::Serialize;

use super::error::FirebaseError;
use super::types::{DeliveryOptions, DeviceToken, Message, Payload};

const DESTINATION_KEY: &str = "to";

#[derive(Serialize)]
struct WireMessage<'a> {
    to: &'a str,
    #[serde(flatten)]
    payload: &'a Payload,
    #[serde(flatten)]
    options: &'a DeliveryOptions,
}

/// Encodes (message, device token) pairs into request bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageSerializer;

impl MessageSerializer {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(&self, message: &Message, device: &DeviceToken) -> Result<Vec<u8>, FirebaseError> {
        self.check_reserved_keys(message)?;

        let wire = WireMessage {
            to: device.as_str(),
            payload: &message.payload,
            options: &message.options,
        };

        serde_json::to_vec(&wire).map_err(|e| FirebaseError::Serialization {
            reason: "message could not be encoded as JSON".to_string(),
            source: Some(e),
        })
    }

    /// Payload keys must not shadow the destination or a set delivery option
    fn check_reserved_keys(&self, message: &Message) -> Result<(), FirebaseError> {
        let fields = message.payload.fields();

        if fields.contains_key(DESTINATION_KEY) {
            return Err(FirebaseError::serialization(format!(
                "payload field '{}' is reserved for the device token",
                DESTINATION_KEY
            )));
        }

        let options = serde_json::to_value(&message.options).map_err(|e| FirebaseError::Serialization {
            reason: "delivery options could not be encoded as JSON".to_string(),
            source: Some(e),
        })?;
        if let Some(options) = options.as_object() {
            if let Some(key) = options.keys().find(|key| fields.contains_key(key.as_str())) {
                return Err(FirebaseError::serialization(format!(
                    "payload field '{}' collides with a delivery option",
                    key
                )));
            }
        }

        Ok(())
    }
}
