//! Fan-out of lifecycle notifications to every registered subscription.

use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{
    dao::{
        event_store::EventStore,
        models::{EventEntity, ReminderThreshold, format_time},
    },
    services::push::{PushError, PushMessage, PushProvider},
};

/// Outcome of one dispatch across all subscriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Subscriptions a send was attempted for.
    pub attempted: usize,
    /// Sends the provider accepted in time.
    pub delivered: usize,
    /// Sends that errored or timed out.
    pub failed: usize,
}

/// Sends messages through the configured provider; a no-op when none is configured.
pub struct NotificationDispatcher {
    provider: Option<Arc<dyn PushProvider>>,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    /// Dispatcher delivering through `provider`, bounding each send by `send_timeout`.
    pub fn new(provider: Arc<dyn PushProvider>, send_timeout: Duration) -> Self {
        Self {
            provider: Some(provider),
            send_timeout,
        }
    }

    /// Dispatcher used when no delivery credentials are configured.
    pub fn disabled() -> Self {
        Self {
            provider: None,
            send_timeout: Duration::ZERO,
        }
    }

    /// Whether a provider is configured.
    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Deliver `message` to every subscription.
    ///
    /// Failures are logged per subscription and never returned; one bad endpoint
    /// does not prevent delivery to the others.
    pub async fn dispatch(
        &self,
        store: &Arc<dyn EventStore>,
        message: PushMessage,
    ) -> DispatchReport {
        let Some(provider) = self.provider.as_ref() else {
            debug!(tag = %message.tag, "push disabled; skipping notification");
            return DispatchReport::default();
        };

        let subscriptions = match store.list_subscriptions().await {
            Ok(subscriptions) => subscriptions,
            Err(err) => {
                warn!(
                    tag = %message.tag,
                    error = %err,
                    "failed to list subscriptions; notification dropped"
                );
                return DispatchReport::default();
            }
        };

        let attempts = subscriptions.into_iter().map(|subscription| {
            let provider = Arc::clone(provider);
            let message = message.clone();
            let limit = self.send_timeout;
            async move {
                let endpoint = subscription.endpoint.clone();
                let result = match timeout(limit, provider.send(subscription, message)).await {
                    Ok(result) => result,
                    Err(_) => Err(PushError::Timeout {
                        endpoint: endpoint.clone(),
                    }),
                };
                (endpoint, result)
            }
        });

        let mut report = DispatchReport::default();
        for (endpoint, result) in join_all(attempts).await {
            report.attempted += 1;
            match result {
                Ok(()) => {
                    report.delivered += 1;
                    debug!(%endpoint, "push delivered");
                }
                Err(err) => {
                    report.failed += 1;
                    debug!(%endpoint, error = %err, "push delivery failed");
                }
            }
        }

        info!(
            tag = %message.tag,
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            "notification dispatched"
        );
        report
    }
}

/// Pre-match reminder.
pub fn reminder_message(event: &EventEntity, threshold: ReminderThreshold) -> PushMessage {
    let hours = threshold.hours();
    let unit = if hours == 1 { "hour" } else { "hours" };
    let body = match event.start_time {
        Some(start) => format!("{} kicks off at {}.", event.name, format_time(start)),
        None => format!("{} is coming up.", event.name),
    };

    PushMessage {
        title: format!("Kick-off in {hours} {unit}"),
        body,
        tag: format!("{}:reminder-{hours}h", event.id),
    }
}

/// Award poll is accepting votes.
pub fn poll_opened_message(event: &EventEntity) -> PushMessage {
    PushMessage {
        title: "Vote for the player of the match".into(),
        body: format!("The award poll for {} is open.", event.name),
        tag: format!("{}:poll", event.id),
    }
}

/// Award poll has been finalized.
pub fn poll_results_message(event: &EventEntity) -> PushMessage {
    PushMessage {
        title: "Player of the match results".into(),
        body: format!("See who won the award for {}.", event.name),
        tag: format!("{}:poll", event.id),
    }
}

#[cfg(test)]
mod tests {
    use futures::{FutureExt, future::BoxFuture};
    use time::macros::datetime;
    use uuid::Uuid;

    use super::*;
    use crate::{
        dao::{event_store::MemoryEventStore, models::SubscriptionEntity},
        services::push::testing::RecordingPushProvider,
    };

    async fn store_with_endpoints(endpoints: &[&str]) -> Arc<dyn EventStore> {
        let store: Arc<dyn EventStore> = Arc::new(MemoryEventStore::new());
        for endpoint in endpoints {
            store
                .save_subscription(SubscriptionEntity {
                    id: Uuid::new_v4(),
                    user_id: None,
                    endpoint: (*endpoint).to_owned(),
                    created_at: datetime!(2026-10-01 08:00 UTC),
                })
                .await
                .unwrap();
        }
        store
    }

    fn message() -> PushMessage {
        PushMessage {
            title: "title".into(),
            body: "body".into(),
            tag: "tag".into(),
        }
    }

    #[tokio::test]
    async fn disabled_dispatcher_sends_nothing() {
        let store = store_with_endpoints(&["https://push.example/a"]).await;
        let report = NotificationDispatcher::disabled()
            .dispatch(&store, message())
            .await;

        assert_eq!(report, DispatchReport::default());
    }

    #[tokio::test]
    async fn failing_endpoint_does_not_block_others() {
        let store = store_with_endpoints(&[
            "https://push.example/a",
            "https://push.example/gone",
            "https://push.example/b",
        ])
        .await;
        let provider = RecordingPushProvider::default();
        provider.fail_endpoint("https://push.example/gone");
        let dispatcher =
            NotificationDispatcher::new(Arc::new(provider.clone()), Duration::from_secs(1));

        let report = dispatcher.dispatch(&store, message()).await;

        assert_eq!(
            report,
            DispatchReport {
                attempted: 3,
                delivered: 2,
                failed: 1
            }
        );
        assert_eq!(provider.sent().len(), 2);
    }

    struct StalledProvider;

    impl PushProvider for StalledProvider {
        fn send(
            &self,
            _subscription: SubscriptionEntity,
            _message: PushMessage,
        ) -> BoxFuture<'static, Result<(), PushError>> {
            async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn slow_delivery_counts_as_failure() {
        let store = store_with_endpoints(&["https://push.example/slow"]).await;
        let dispatcher =
            NotificationDispatcher::new(Arc::new(StalledProvider), Duration::from_millis(20));

        let report = dispatcher.dispatch(&store, message()).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 0);
    }

    #[test]
    fn reminder_message_names_the_hour_mark() {
        let event = EventEntity::new(
            "K7Q2ZP".into(),
            "Sunday league".into(),
            None,
            Some(time::macros::time!(19:30)),
            90,
            datetime!(2026-10-01 08:00 UTC),
        );

        let message = reminder_message(&event, ReminderThreshold::OneHour);
        assert_eq!(message.title, "Kick-off in 1 hour");
        assert_eq!(message.body, "Sunday league kicks off at 19:30.");

        let message = reminder_message(&event, ReminderThreshold::ThreeHours);
        assert_eq!(message.title, "Kick-off in 3 hours");
    }
}
