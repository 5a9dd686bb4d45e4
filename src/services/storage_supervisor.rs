//! Keeps the event store connected and mirrors its reachability into the
//! degraded flag served by health checks and SSE.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{event_store::EventStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Keep the event store connected, flipping degraded mode while it is unreachable.
///
/// A store that fails its health check is first retried in place; once those
/// attempts run out it is dropped and `connect` is called again.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn EventStore>, StorageError>> + Send,
{
    let mut backoff = Backoff::default();

    loop {
        match connect().await {
            Ok(store) => {
                backoff = Backoff::default();
                state.set_event_store(store.clone()).await;
                info!("event store installed");

                watch(&state, store.as_ref()).await;

                state.clear_event_store().await;
                warn!("event store dropped after failed recovery; dialing a fresh connection");
            }
            Err(err) => {
                warn!(error = %err, retry_in = ?backoff.peek(), "could not open event store");
            }
        }
        sleep(backoff.next_delay()).await;
    }
}

/// Poll health until the store cannot be recovered in place.
async fn watch(state: &SharedState, store: &dyn EventStore) {
    loop {
        if store.health_check().await.is_err() && !recover(state, store).await {
            return;
        }
        if state.is_degraded() {
            info!("event store responding; serving requests again");
            state.update_degraded(false);
        }
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

/// Retry the live store; the first failure switches the service to degraded mode.
async fn recover(state: &SharedState, store: &dyn EventStore) -> bool {
    let mut backoff = Backoff::default();

    for attempt in 1..=MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "event store recovered in place");
                return true;
            }
            Err(err) => {
                if attempt == 1 {
                    state.update_degraded(true);
                }
                warn!(
                    attempt,
                    max_attempts = MAX_RECONNECT_ATTEMPTS,
                    error = %err,
                    "event store recovery attempt failed"
                );
                sleep(backoff.next_delay()).await;
            }
        }
    }
    false
}

/// Doubling delay capped at [`MAX_DELAY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Backoff {
    current: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            current: INITIAL_DELAY,
        }
    }
}

impl Backoff {
    fn peek(&self) -> Duration {
        self.current
    }

    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(MAX_DELAY);
        delay
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::event_store::MemoryEventStore,
        services::notification_service::NotificationDispatcher,
        state::AppState,
    };

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let mut backoff = Backoff::default();
        let delays: Vec<_> = (0..6).map(|_| backoff.next_delay()).collect();

        assert_eq!(
            delays,
            [1, 2, 4, 8, 10, 10].map(Duration::from_secs).to_vec()
        );
    }

    #[tokio::test]
    async fn installs_store_and_leaves_degraded_mode() {
        let state = AppState::new(AppConfig::default(), NotificationDispatcher::disabled());
        assert!(state.is_degraded());

        let handle = tokio::spawn(run(state.clone(), || async {
            Ok(Arc::new(MemoryEventStore::new()) as Arc<dyn EventStore>)
        }));
        let mut watcher = state.degraded_watcher();
        tokio::time::timeout(Duration::from_secs(1), watcher.wait_for(|degraded| !degraded))
            .await
            .expect("supervisor connects")
            .expect("watch channel open");

        assert!(state.event_store().await.is_some());
        handle.abort();
    }

    #[tokio::test]
    async fn failed_connect_is_retried_while_degraded() {
        let state = AppState::new(AppConfig::default(), NotificationDispatcher::disabled());
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let handle = tokio::spawn(run(state.clone(), move || {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    Err(StorageError::invalid_data("server not ready"))
                } else {
                    Ok(Arc::new(MemoryEventStore::new()) as Arc<dyn EventStore>)
                }
            }
        }));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(state.is_degraded());
        assert!(state.event_store().await.is_none());

        let mut watcher = state.degraded_watcher();
        tokio::time::timeout(Duration::from_secs(3), watcher.wait_for(|degraded| !degraded))
            .await
            .expect("supervisor retries")
            .expect("watch channel open");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        handle.abort();
    }
}
