use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Serialize;

use super::{PushError, PushMessage, PushProvider};
use crate::dao::models::SubscriptionEntity;

/// Runtime configuration describing how to reach the push gateway.
#[derive(Debug, Clone)]
pub struct PushGatewayConfig {
    pub base_url: String,
    pub api_key: String,
}

impl PushGatewayConfig {
    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> Result<Self, PushError> {
        let base_url = std::env::var("PUSH_GATEWAY_URL").map_err(|_| PushError::MissingEnvVar {
            var: "PUSH_GATEWAY_URL",
        })?;
        let api_key = std::env::var("PUSH_API_KEY").map_err(|_| PushError::MissingEnvVar {
            var: "PUSH_API_KEY",
        })?;

        Ok(Self { base_url, api_key })
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    endpoint: &'a str,
    title: &'a str,
    body: &'a str,
    tag: &'a str,
}

/// Push provider forwarding each delivery to an HTTP gateway.
#[derive(Clone)]
pub struct HttpPushGateway {
    client: Client,
    send_url: Arc<str>,
    api_key: Arc<str>,
}

impl HttpPushGateway {
    /// Build the gateway client.
    pub fn new(config: PushGatewayConfig) -> Result<Self, PushError> {
        let client = Client::builder()
            .build()
            .map_err(|source| PushError::ClientBuilder { source })?;

        Ok(Self {
            client,
            send_url: Arc::from(format!("{}/send", config.base_url.trim_end_matches('/'))),
            api_key: Arc::from(config.api_key),
        })
    }

    async fn deliver(
        &self,
        subscription: SubscriptionEntity,
        message: PushMessage,
    ) -> Result<(), PushError> {
        let payload = SendRequest {
            endpoint: &subscription.endpoint,
            title: &message.title,
            body: &message.body,
            tag: &message.tag,
        };

        let response = self
            .client
            .post(self.send_url.as_ref())
            .bearer_auth(self.api_key.as_ref())
            .json(&payload)
            .send()
            .await
            .map_err(|source| PushError::RequestSend {
                endpoint: subscription.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PushError::Rejected {
                endpoint: subscription.endpoint,
                status: status.as_u16(),
            })
        }
    }
}

impl PushProvider for HttpPushGateway {
    fn send(
        &self,
        subscription: SubscriptionEntity,
        message: PushMessage,
    ) -> BoxFuture<'static, Result<(), PushError>> {
        let gateway = self.clone();
        Box::pin(async move { gateway.deliver(subscription, message).await })
    }
}
