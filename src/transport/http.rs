use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use tracing::debug;

use super::traits::{Transport, TransportRequest, TransportResponse, TransportSettings};
use crate::fcm::FirebaseError;

/// Transport backed by one long-lived reqwest client
///
/// The client is owned by a single facade and built without a cookie store
/// or any default credentials: the only secret it ever sends is the
/// `Authorization` header passed in with each request.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(settings: &TransportSettings) -> Result<Self, FirebaseError> {
        let mut builder = Client::builder();

        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &settings.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|e| FirebaseError::transport_with_source("Failed to create HTTP client", e))?;

        Ok(Self { client })
    }

    fn build_headers(&self, headers: &[(String, String)]) -> Result<HeaderMap, FirebaseError> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                FirebaseError::transport_with_source(format!("Invalid header name '{}'", name), e)
            })?;
            // Value kept out of the message: it may carry the server key
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                FirebaseError::transport_with_source(format!("Invalid value for header '{}'", name), e)
            })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, FirebaseError> {
        let headers = self.build_headers(&request.headers)?;

        let response = self
            .client
            .post(&request.url)
            .headers(headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!("HTTP transport received status {} with {} body bytes", status, body.len());

        Ok(TransportResponse { status, body })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_transport_creation() {
        let settings = TransportSettings {
            timeout: Some(Duration::from_secs(5)),
            user_agent: Some("fcm-push-test".to_string()),
        };
        assert!(HttpTransport::new(&settings).is_ok());
    }

    #[test]
    fn test_invalid_header_value_rejected() {
        let transport = HttpTransport::new(&TransportSettings::default()).unwrap();
        let err = transport
            .build_headers(&[("Authorization".to_string(), "key=bad\nvalue".to_string())])
            .unwrap_err();
        assert!(matches!(err, FirebaseError::Transport { .. }));
        assert!(!err.to_string().contains("bad"));
    }
}
