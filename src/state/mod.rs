pub mod clock;
mod sse;
pub mod tally;
pub mod windows;

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::event_store::EventStore,
    error::ServiceError,
    services::notification_service::NotificationDispatcher,
};

pub use self::sse::SseHub;
use self::{
    clock::{Clock, SystemClock},
    windows::WindowSettings,
};

pub type SharedState = Arc<AppState>;

const LIFECYCLE_SSE_CAPACITY: usize = 64;

/// Central application state: the injected store handle plus the collaborators
/// every lifecycle operation shares.
pub struct AppState {
    event_store: RwLock<Option<Arc<dyn EventStore>>>,
    lifecycle_sse: SseHub,
    notifier: NotificationDispatcher,
    clock: Arc<dyn Clock>,
    config: AppConfig,
    windows: WindowSettings,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, notifier: NotificationDispatcher) -> SharedState {
        Self::with_clock(config, notifier, Arc::new(SystemClock))
    }

    /// Same as [`AppState::new`] with an explicit time source.
    pub fn with_clock(
        config: AppConfig,
        notifier: NotificationDispatcher,
        clock: Arc<dyn Clock>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            event_store: RwLock::new(None),
            lifecycle_sse: SseHub::new(LIFECYCLE_SSE_CAPACITY),
            notifier,
            clock,
            windows: config.window_settings(),
            config,
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current event store, if one is installed.
    pub async fn event_store(&self) -> Option<Arc<dyn EventStore>> {
        let guard = self.event_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current event store or [`ServiceError::Degraded`] when none is installed.
    pub async fn require_event_store(&self) -> Result<Arc<dyn EventStore>, ServiceError> {
        self.event_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new event store implementation and leave degraded mode.
    pub async fn set_event_store(&self, store: Arc<dyn EventStore>) {
        {
            let mut guard = self.event_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current event store and enter degraded mode.
    pub async fn clear_event_store(&self) {
        {
            let mut guard = self.event_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Broadcast hub used for the lifecycle SSE stream.
    pub fn lifecycle_sse(&self) -> &SseHub {
        &self.lifecycle_sse
    }

    /// Push notification fan-out.
    pub fn notifier(&self) -> &NotificationDispatcher {
        &self.notifier
    }

    /// Loaded runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Window tunables resolved once from the configuration.
    pub fn window_settings(&self) -> &WindowSettings {
        &self.windows
    }

    /// Current instant according to the installed clock.
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }
}
