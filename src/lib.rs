//! FCM Push Library
//!
//! Client for the Firebase Cloud Messaging legacy HTTP gateway: serializes a
//! message for one device, sends it over a pluggable transport and classifies
//! the gateway's answer.

pub mod cli;
pub mod config;
pub mod errors;
pub mod fcm;
pub mod transport;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigManager, GatewayConfig};
pub use errors::{AppError, AppResult};
pub use fcm::{
    DeliveryOptions, DeviceToken, Firebase, FirebaseBuilder, FirebaseError, FirebaseResponse, Message, Payload,
    Priority, ServerKey,
};
pub use transport::{Transport, TransportKind};
