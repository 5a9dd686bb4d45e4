//! Push delivery providers consumed by the notification dispatcher.

#[cfg(feature = "http-push")]
pub mod http;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::dao::models::SubscriptionEntity;

#[cfg(feature = "http-push")]
pub use http::{HttpPushGateway, PushGatewayConfig};

/// Titled message delivered to every subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    /// Headline shown by the device.
    pub title: String,
    /// Message text.
    pub body: String,
    /// Collapse key so a gateway can drop duplicates of the same notification.
    pub tag: String,
}

/// Failures raised while delivering to a single subscription.
#[derive(Debug, Error)]
pub enum PushError {
    /// Required environment variable is missing.
    #[error("missing push environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed.
    #[cfg(feature = "http-push")]
    #[error("failed to build push gateway client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The gateway could not be reached.
    #[cfg(feature = "http-push")]
    #[error("failed to send push request for `{endpoint}`")]
    RequestSend {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The gateway answered with a non-success status.
    #[error("push gateway rejected `{endpoint}` with status {status}")]
    Rejected { endpoint: String, status: u16 },
    /// Delivery did not complete in time.
    #[error("push delivery to `{endpoint}` timed out")]
    Timeout { endpoint: String },
}

/// Delivery backend for push notifications.
pub trait PushProvider: Send + Sync {
    fn send(
        &self,
        subscription: SubscriptionEntity,
        message: PushMessage,
    ) -> BoxFuture<'static, Result<(), PushError>>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use futures::FutureExt;

    use super::*;

    /// Provider keeping every delivery in memory; endpoints listed in `failing` error out.
    #[derive(Clone, Default)]
    pub struct RecordingPushProvider {
        sent: Arc<Mutex<Vec<(String, PushMessage)>>>,
        failing: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingPushProvider {
        pub fn fail_endpoint(&self, endpoint: &str) {
            self.failing.lock().unwrap().push(endpoint.to_owned());
        }

        pub fn sent(&self) -> Vec<(String, PushMessage)> {
            self.sent.lock().unwrap().clone()
        }

        pub fn titles(&self) -> Vec<String> {
            self.sent()
                .into_iter()
                .map(|(_, message)| message.title)
                .collect()
        }
    }

    impl PushProvider for RecordingPushProvider {
        fn send(
            &self,
            subscription: SubscriptionEntity,
            message: PushMessage,
        ) -> BoxFuture<'static, Result<(), PushError>> {
            let failing = self
                .failing
                .lock()
                .unwrap()
                .contains(&subscription.endpoint);
            let result = if failing {
                Err(PushError::Rejected {
                    endpoint: subscription.endpoint,
                    status: 410,
                })
            } else {
                self.sent
                    .lock()
                    .unwrap()
                    .push((subscription.endpoint, message));
                Ok(())
            };
            async move { result }.boxed()
        }
    }
}
