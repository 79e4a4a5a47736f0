//! Client facade: one server key, one transport, one request per send

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use super::error::FirebaseError;
use super::response::FirebaseResponse;
use super::serializer::MessageSerializer;
use super::types::{DeviceToken, Message, ServerKey};
use crate::transport::{create_transport, Transport, TransportKind, TransportRequest, TransportSettings};

/// Legacy HTTP send endpoint of the gateway
pub const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

/// Pending send, resolves to exactly one [`FirebaseResponse`]
pub type SendFuture = Pin<Box<dyn Future<Output = FirebaseResponse> + Send + 'static>>;

/// Client for sending notifications to single devices
///
/// Holds the server key and one transport for its whole lifetime. Clones
/// share the transport. Concurrent sends are independent of each other and
/// no ordering is guaranteed between their completions.
///
/// # Example
///
/// ```rust,no_run
/// use fcm_push::fcm::{DeviceToken, Firebase, Message, Payload, ServerKey};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let firebase = Firebase::new(ServerKey::new("server-key"))?;
/// let message = Message::new(Payload::new("What's up!"));
///
/// let response = firebase.send(&message, &DeviceToken::new("device-token"))?.await;
/// if !response.success {
///     eprintln!("delivery failed: {:?}", response.error);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Firebase {
    server_key: ServerKey,
    endpoint: String,
    transport: Arc<dyn Transport>,
    serializer: MessageSerializer,
}

impl Firebase {
    /// Client using the async HTTP transport and the default endpoint
    pub fn new(server_key: ServerKey) -> Result<Self, FirebaseError> {
        Self::builder(server_key).build()
    }

    /// Client whose server key is read from a file
    ///
    /// Surrounding whitespace is trimmed. Fails with
    /// [`FirebaseError::KeyFile`] if the file cannot be read.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self, FirebaseError> {
        let server_key = read_server_key(path.as_ref())?;
        Self::new(server_key)
    }

    pub fn builder(server_key: ServerKey) -> FirebaseBuilder {
        FirebaseBuilder::new(server_key)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Send one message to one device
    ///
    /// The message is serialized before anything else happens: a
    /// serialization error is returned right away and no request is made.
    /// Every later failure (connectivity, HTTP status, gateway-reported
    /// errors) is carried inside the [`FirebaseResponse`] the returned future
    /// resolves to.
    pub fn send(&self, message: &Message, device: &DeviceToken) -> Result<SendFuture, FirebaseError> {
        let request = self.build_request(message, device)?;
        let transport = Arc::clone(&self.transport);

        debug!(
            "Sending {} byte notification to {} via {} transport",
            request.body.len(),
            request.url,
            transport.name()
        );

        Ok(Box::pin(async move {
            let response = FirebaseResponse::from_transport(transport.send(request).await);
            match &response.error {
                Some(error) => warn!(
                    "Push delivery failed ({}), status {:?}: {}",
                    error.kind(),
                    response.status_code,
                    error
                ),
                None => debug!("Push delivered, status {:?}", response.status_code),
            }
            response
        }))
    }

    /// Send one message and hand the response to `on_complete`
    ///
    /// `on_complete` runs exactly once unless a serialization error is
    /// returned, in which case it never runs. Inside a tokio runtime the send
    /// is spawned on the caller's runtime and its handle returned. Outside of
    /// one, a current-thread runtime drives the send to completion and the
    /// callback has already run when this returns `Ok(None)`.
    pub fn send_with_callback<F>(
        &self,
        message: &Message,
        device: &DeviceToken,
        on_complete: F,
    ) -> Result<Option<JoinHandle<()>>, FirebaseError>
    where
        F: FnOnce(FirebaseResponse) + Send + 'static,
    {
        let pending = self.send(message, device)?;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => Ok(Some(handle.spawn(async move {
                on_complete(pending.await);
            }))),
            Err(_) => {
                let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build();
                match runtime {
                    Ok(runtime) => on_complete(runtime.block_on(pending)),
                    Err(e) => on_complete(FirebaseResponse::failed(FirebaseError::transport_with_source(
                        "Failed to create runtime",
                        e,
                    ))),
                }
                Ok(None)
            }
        }
    }

    fn build_request(&self, message: &Message, device: &DeviceToken) -> Result<TransportRequest, FirebaseError> {
        let body = self.serializer.serialize(message, device)?;
        Ok(TransportRequest {
            url: self.endpoint.clone(),
            headers: self.build_headers(),
            body,
        })
    }

    fn build_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), self.server_key.authorization()),
        ]
    }
}

impl std::fmt::Debug for Firebase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Firebase")
            .field("server_key", &self.server_key)
            .field("endpoint", &self.endpoint)
            .field("transport", &self.transport.name())
            .finish()
    }
}

/// Builder for [`Firebase`] with a non-default endpoint or transport
pub struct FirebaseBuilder {
    server_key: ServerKey,
    endpoint: String,
    kind: TransportKind,
    settings: TransportSettings,
    transport: Option<Arc<dyn Transport>>,
}

impl FirebaseBuilder {
    pub fn new(server_key: ServerKey) -> Self {
        Self {
            server_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            kind: TransportKind::default(),
            settings: TransportSettings::default(),
            transport: None,
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn transport(mut self, kind: TransportKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.settings.user_agent = Some(user_agent.into());
        self
    }

    /// Use a caller-provided transport instead of a built-in one
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Firebase, FirebaseError> {
        Url::parse(&self.endpoint).map_err(|e| {
            FirebaseError::transport_with_source(format!("Invalid gateway endpoint '{}'", self.endpoint), e)
        })?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => create_transport(self.kind, &self.settings)?,
        };

        Ok(Firebase {
            server_key: self.server_key,
            endpoint: self.endpoint,
            transport,
            serializer: MessageSerializer::new(),
        })
    }
}

/// Read and trim a server key file
pub fn read_server_key(path: &Path) -> Result<ServerKey, FirebaseError> {
    let raw = std::fs::read_to_string(path).map_err(|e| FirebaseError::KeyFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(ServerKey::new(raw.trim()))
}
