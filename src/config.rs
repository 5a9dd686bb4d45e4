//! Application-level configuration loading, including the lifecycle timings.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_with::{DurationMilliSeconds, DurationSeconds, serde_as};
use tracing::{info, warn};

use crate::state::windows::WindowSettings;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MATCHDAY_BACK_CONFIG_PATH";

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Delay between an event's scheduled end and its award poll opening.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub poll_open_delay: Duration,
    /// How long the award poll accepts votes.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub poll_duration: Duration,
    /// Time results stay visible after the poll closes before the event recycles.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub reset_grace: Duration,
    /// Offset, in minutes east of UTC, of the wall clock event dates are written in.
    pub event_utc_offset_minutes: i32,
    /// Period of the in-process ticker; disabled when unset.
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    pub tick_interval: Option<Duration>,
    /// Upper bound for a single push delivery.
    #[serde(rename = "push_timeout_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub push_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_open_delay: Duration::from_secs(10 * 60),
            poll_duration: Duration::from_secs(30 * 60),
            reset_grace: Duration::from_secs(60 * 60),
            event_utc_offset_minutes: 0,
            tick_interval: None,
            push_timeout: Duration::from_millis(5_000),
        }
    }
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        tick_interval = ?config.tick_interval,
                        "loaded lifecycle settings from config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Period for the in-process ticker, when one should run.
    ///
    /// A zero period is logged and treated as unset.
    pub fn ticker_period(&self) -> Option<Duration> {
        match self.tick_interval {
            Some(period) if period.is_zero() => {
                warn!("tick_interval is zero; in-process ticker disabled");
                None
            }
            period => period,
        }
    }

    /// Window tunables derived from this configuration.
    ///
    /// An out-of-range UTC offset is logged and replaced by UTC.
    pub fn window_settings(&self) -> WindowSettings {
        let utc_offset = self
            .event_utc_offset_minutes
            .checked_mul(60)
            .and_then(|seconds| time::UtcOffset::from_whole_seconds(seconds).ok())
            .unwrap_or_else(|| {
                warn!(
                    minutes = self.event_utc_offset_minutes,
                    "event UTC offset out of range; using UTC"
                );
                time::UtcOffset::UTC
            });

        WindowSettings {
            utc_offset,
            poll_open_delay: to_signed(self.poll_open_delay),
            poll_duration: to_signed(self.poll_duration),
            reset_grace: to_signed(self.reset_grace),
        }
    }
}

fn to_signed(value: Duration) -> time::Duration {
    time::Duration::try_from(value).unwrap_or(time::Duration::MAX)
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
