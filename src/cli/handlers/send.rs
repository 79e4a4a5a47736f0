//! Send command handler
//!
//! Builds one message from the command line and delivers it through the
//! configured gateway client.

use super::super::commands::SendArgs;
use super::super::CliContext;
use crate::config::GatewayConfig;
use crate::errors::AppError;
use crate::fcm::{read_server_key, DeliveryOptions, DeviceToken, FirebaseResponse, Message, Payload};
use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};

/// Handler for the send command
pub struct SendHandler<'a> {
    context: &'a CliContext,
}

impl<'a> SendHandler<'a> {
    pub fn new(context: &'a CliContext) -> Self {
        Self { context }
    }

    pub async fn handle_send(&self, args: SendArgs) -> Result<()> {
        let message = build_message(&args)?;
        let device = DeviceToken::new(args.token.trim());
        let gateway = self.gateway_for(&args);

        let client = match &args.server_key_file {
            Some(path) => {
                let key = read_server_key(path)?;
                gateway.build_client_with_key(key)?
            }
            None => gateway.build_client()?,
        };
        debug!(endpoint = client.endpoint(), transport = client.transport_name(), "Client ready");

        let response = client
            .send(&message, &device)
            .context("Failed to prepare notification")?
            .await;

        report(response)
    }

    /// Configured gateway settings with command line overrides applied
    fn gateway_for(&self, args: &SendArgs) -> GatewayConfig {
        let mut gateway = self.context.config_manager.config().gateway.clone();
        if let Some(kind) = args.transport {
            gateway.transport = kind;
        }
        if let Some(endpoint) = &args.endpoint {
            gateway.endpoint = endpoint.clone();
        }
        gateway
    }
}

fn build_message(args: &SendArgs) -> Result<Message> {
    if args.message.is_none() && args.data.is_empty() {
        return Err(anyhow!("Nothing to send: pass --message or at least one --data KEY=VALUE"));
    }

    let mut payload = match &args.message {
        Some(text) => Payload::new(text.as_str()),
        None => Payload::empty(),
    };
    for item in &args.data {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| AppError::invalid_argument("--data", format!("'{}' is not KEY=VALUE", item)))?;
        if key.is_empty() {
            return Err(AppError::invalid_argument("--data", format!("'{}' has an empty key", item)).into());
        }
        payload.insert(key, value);
    }

    let options = DeliveryOptions {
        priority: args.priority,
        collapse_key: args.collapse_key.clone(),
        time_to_live: args.ttl,
        content_available: args.content_available.then_some(true),
        dry_run: args.dry_run.then_some(true),
        ..Default::default()
    };

    Ok(Message::new(payload).with_options(options))
}

fn report(response: FirebaseResponse) -> Result<()> {
    if response.success {
        let message_id = response.message_id().unwrap_or("-");
        info!(message_id, "Notification accepted");
        println!("Notification sent (message id: {})", message_id);
        if let Some(token) = response.canonical_token() {
            println!("Device has a newer registration token: {}", token);
        }
        return Ok(());
    }

    let status = response
        .status_code
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string());
    match response.error {
        Some(err) => {
            warn!(kind = err.kind(), %status, "Notification rejected");
            Err(anyhow!("Notification failed [{}] (status {}): {}", err.kind(), status, err))
        }
        None => Err(anyhow!("Notification failed (status {})", status)),
    }
}
