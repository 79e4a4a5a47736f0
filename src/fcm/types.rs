//! Message model for the gateway: credentials, destinations and content

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::error::FirebaseError;

/// Server key issued by the gateway operator
///
/// The raw value is only exposed through [`ServerKey::as_str`]; `Debug`
/// output is redacted so the key never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerKey(String);

impl ServerKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header for this key
    pub fn authorization(&self) -> String {
        format!("key={}", self.0)
    }
}

impl fmt::Debug for ServerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServerKey(<redacted>)")
    }
}

impl From<&str> for ServerKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ServerKey {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Destination identifier of a single device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceToken(String);

impl DeviceToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceToken {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for DeviceToken {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Free-form notification content, always a JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Payload carrying a single text body under the `message` key
    pub fn new(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("message".to_string(), Value::String(message.into()));
        Self(fields)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a payload from any serializable value
    ///
    /// Fails with a serialization error unless the value encodes to a JSON
    /// object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, FirebaseError> {
        let encoded = serde_json::to_value(value).map_err(|e| FirebaseError::Serialization {
            reason: "payload could not be encoded as JSON".to_string(),
            source: Some(e),
        })?;
        match encoded {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(FirebaseError::serialization(format!(
                "payload must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Delivery priority understood by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            other => Err(format!("unknown priority '{}', expected normal or high", other)),
        }
    }
}

/// Optional delivery settings, merged next to the payload on the wire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_key: Option<String>,
    /// Seconds the gateway keeps the message while the device is offline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_live: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_available: Option<bool>,
    /// Validate the request on the gateway without delivering it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted_package_name: Option<String>,
}

/// A notification ready to be sent to one device
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub payload: Payload,
    pub options: DeliveryOptions,
}

impl Message {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            options: DeliveryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DeliveryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.options.priority = Some(priority);
        self
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
