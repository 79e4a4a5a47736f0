//! Gateway client: message model, wire encoding and response typing
//!
//! ## Flow
//!
//! `Firebase::send` serializes the message with [`MessageSerializer`], builds
//! the POST (endpoint, `Content-Type: application/json`,
//! `Authorization: key=<server key>`), hands it to the configured transport,
//! and turns the outcome into a [`FirebaseResponse`].

pub mod client;
pub mod error;
pub mod response;
pub mod serializer;
pub mod types;

pub use client::{read_server_key, Firebase, FirebaseBuilder, SendFuture, DEFAULT_ENDPOINT};
pub use error::FirebaseError;
pub use response::{FirebaseResponse, GatewayReply, GatewayResult};
pub use serializer::MessageSerializer;
pub use types::{DeliveryOptions, DeviceToken, Message, Payload, Priority, ServerKey};
