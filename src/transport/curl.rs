use async_trait::async_trait;
use curl::easy::{Easy, List};
use tracing::debug;

use super::parser::ResponseParser;
use super::traits::{Transport, TransportRequest, TransportResponse, TransportSettings};
use crate::fcm::FirebaseError;

/// Transport driving a libcurl easy handle directly
///
/// Every request gets its own handle, dropped when the request ends on any
/// path. Header output is switched on and the raw stream is split by
/// [`ResponseParser`]. A failed transfer is reported as
/// [`FirebaseError::Transport`] with libcurl's description of the failure.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    settings: TransportSettings,
    parser: ResponseParser,
}

impl CurlTransport {
    pub fn new(settings: &TransportSettings) -> Self {
        Self {
            settings: settings.clone(),
            parser: ResponseParser::new(),
        }
    }

    /// Run the transfer on the current thread
    ///
    /// Blocks until the transfer completes or fails. Do not call this from a
    /// latency-sensitive thread; the [`Transport`] impl moves it onto tokio's
    /// blocking pool.
    pub fn perform_blocking(&self, request: &TransportRequest) -> Result<TransportResponse, FirebaseError> {
        let mut easy = Easy::new();
        easy.url(&request.url)?;
        easy.post(true)?;
        easy.show_header(true)?;

        let mut headers = List::new();
        for (name, value) in &request.headers {
            if has_line_break(name) {
                return Err(FirebaseError::transport(format!("Invalid header name '{}'", name.escape_debug())));
            }
            // Value kept out of the message: it may carry the server key
            if has_line_break(value) {
                return Err(FirebaseError::transport(format!("Invalid value for header '{}'", name)));
            }
            headers.append(&format!("{}: {}", name, value))?;
        }
        // No `Expect: 100-continue` round trip
        headers.append("Expect:")?;
        easy.http_headers(headers)?;

        easy.post_field_size(request.body.len() as u64)?;
        easy.post_fields_copy(&request.body)?;

        if let Some(timeout) = self.settings.timeout {
            easy.timeout(timeout)?;
        }
        if let Some(user_agent) = &self.settings.user_agent {
            easy.useragent(user_agent)?;
        }

        let mut raw = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                raw.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        debug!("curl transport received {} raw bytes", raw.len());

        let parsed = self.parser.parse(&raw)?;
        Ok(TransportResponse {
            status: parsed.status,
            body: parsed.body,
        })
    }
}

/// libcurl writes header lines verbatim, so a CR or LF would start a new header
fn has_line_break(text: &str) -> bool {
    text.contains(['\r', '\n'])
}

#[async_trait]
impl Transport for CurlTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, FirebaseError> {
        let transport = self.clone();
        tokio::task::spawn_blocking(move || transport.perform_blocking(&request))
            .await
            .map_err(|e| FirebaseError::transport_with_source("Blocking transfer task failed", e))?
    }

    fn name(&self) -> &'static str {
        "curl"
    }
}
