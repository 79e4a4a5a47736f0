//! HTTP transports for the gateway client
//!
//! Two interchangeable implementations of [`Transport`] are provided:
//!
//! - **HttpTransport**: async reqwest client, non-blocking for the caller
//! - **CurlTransport**: libcurl easy handle per request; the transfer itself
//!   blocks, so it runs on tokio's blocking pool
//!
//! A client picks one at construction time through [`TransportKind`].

pub mod curl;
pub mod http;
pub mod parser;
pub mod traits;

use std::sync::Arc;

pub use self::curl::CurlTransport;
pub use self::http::HttpTransport;
pub use parser::{ParsedResponse, ResponseParser};
pub use traits::{Transport, TransportKind, TransportRequest, TransportResponse, TransportSettings};

use crate::fcm::FirebaseError;

/// Build the transport selected by `kind`
pub fn create_transport(
    kind: TransportKind,
    settings: &TransportSettings,
) -> Result<Arc<dyn Transport>, FirebaseError> {
    match kind {
        TransportKind::Http => Ok(Arc::new(HttpTransport::new(settings)?)),
        TransportKind::Curl => Ok(Arc::new(CurlTransport::new(settings))),
    }
}
