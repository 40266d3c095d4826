use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    core::config::NotificationConfig,
    notifications::{
        ChannelResult, NotificationDispatcher, NotificationError, NotificationKind,
        NotificationRequest, NotificationResults, templates,
    },
};

#[derive(Serialize)]
struct EmailMessage<'a> {
    to: &'a str,
    subject: String,
    text: String,
}

/// Sends email through an HTTP mail gateway. SMS is logged only; no SMS provider is wired up.
#[derive(Clone)]
pub struct GatewayDispatcher {
    client: Client,
    config: NotificationConfig,
}

impl GatewayDispatcher {
    pub fn new(client: Client, config: NotificationConfig) -> Self {
        Self { client, config }
    }

    async fn send_email(&self, to: &str, request: &NotificationRequest) -> ChannelResult {
        let Some(url) = self.config.email_gateway_url.as_deref() else {
            return ChannelResult::failed("email gateway not configured");
        };

        let message = EmailMessage {
            to,
            subject: templates::email_subject(request),
            text: templates::email_body(request, &self.config.site_url),
        };

        match self.post_email(url, &message).await {
            Ok(()) => {
                info!(
                    "Sent {} email for order #{}",
                    request.kind.as_str(),
                    request.order_details.order_number
                );
                ChannelResult::sent()
            }
            Err(err) => {
                warn!(
                    "Email for order #{} failed: {}",
                    request.order_details.order_number, err
                );
                ChannelResult::failed(err.to_string())
            }
        }
    }

    async fn post_email(&self, url: &str, message: &EmailMessage<'_>) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(url)
            .json(message)
            .send()
            .await
            .map_err(|e| NotificationError::GatewayUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::GatewayRejected(response.status().as_u16()));
        }
        Ok(())
    }

    fn send_sms(&self, to: &str, request: &NotificationRequest) -> ChannelResult {
        if !self.config.sms_enabled {
            return ChannelResult::failed("sms disabled");
        }
        info!("SMS to {}: {}", to, templates::sms_text(request));
        ChannelResult::sent()
    }
}

#[async_trait]
impl NotificationDispatcher for GatewayDispatcher {
    async fn dispatch(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationResults, NotificationError> {
        if request.kind == NotificationKind::StatusUpdate && request.status.is_none() {
            return Err(NotificationError::MissingStatus);
        }

        let mut results = NotificationResults::default();

        if request.email {
            if let Some(email) = request.customer_info.email.as_deref() {
                results.email = self.send_email(email, request).await;
            }
        }

        if request.phone {
            if let Some(phone) = request.customer_info.phone.as_deref() {
                results.sms = self.send_sms(phone, request);
            }
        }

        Ok(results)
    }
}
