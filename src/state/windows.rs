//! Time windows derived from an event's schedule.

use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::dao::models::{EventEntity, ReminderThreshold};

const NANOS_PER_HOUR: i128 = 3_600 * 1_000_000_000;

/// Tunables shaping the windows computed for every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSettings {
    /// Offset of the wall clock the event's date and time are written in.
    pub utc_offset: UtcOffset,
    /// Delay between the scheduled end and the award poll opening.
    pub poll_open_delay: Duration,
    /// How long the award poll accepts votes.
    pub poll_duration: Duration,
    /// Delay after the poll closes before the roster is recycled.
    pub reset_grace: Duration,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            utc_offset: UtcOffset::UTC,
            poll_open_delay: Duration::minutes(10),
            poll_duration: Duration::minutes(30),
            reset_grace: Duration::minutes(60),
        }
    }
}

impl WindowSettings {
    /// Earliest instant at which a finalized poll closing at `poll_ends_at` may be reset.
    ///
    /// `None` when the deadline falls outside the representable range.
    pub fn reset_deadline(&self, poll_ends_at: OffsetDateTime) -> Option<OffsetDateTime> {
        poll_ends_at.checked_add(self.reset_grace)
    }
}

/// Instants governing one roster generation of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindows {
    /// Kick-off.
    pub start: OffsetDateTime,
    /// Scheduled end (`start + duration`).
    pub end: OffsetDateTime,
    /// Award poll opens.
    pub poll_opens_at: OffsetDateTime,
    /// Award poll closes.
    pub poll_closes_at: OffsetDateTime,
}

impl EventWindows {
    /// Compute the windows for `event`.
    ///
    /// `None` while its date or start time is unset, or when a derived instant
    /// would leave the representable calendar range.
    pub fn compute(event: &EventEntity, settings: &WindowSettings) -> Option<Self> {
        let date = event.date?;
        let start_time = event.start_time?;

        let offset = Duration::seconds(i64::from(settings.utc_offset.whole_seconds()));
        let start = PrimitiveDateTime::new(date, start_time)
            .assume_utc()
            .checked_sub(offset)?;
        let end = start.checked_add(Duration::minutes(i64::from(event.duration_minutes)))?;
        let poll_opens_at = end.checked_add(settings.poll_open_delay)?;
        let poll_closes_at = poll_opens_at.checked_add(settings.poll_duration)?;

        Some(Self {
            start,
            end,
            poll_opens_at,
            poll_closes_at,
        })
    }

    /// Instant at which the reminder for `threshold` is due.
    pub fn reminder_at(&self, threshold: ReminderThreshold) -> Option<OffsetDateTime> {
        self.start.checked_sub(Duration::hours(threshold.hours()))
    }

    /// Whole hours left until kick-off, rounded up.
    pub fn hours_until_start(&self, now: OffsetDateTime) -> i64 {
        let nanos = (self.start - now).whole_nanoseconds();
        let hours = nanos.div_euclid(NANOS_PER_HOUR);
        let partial = i128::from(nanos.rem_euclid(NANOS_PER_HOUR) > 0);
        (hours + partial) as i64
    }

    /// Reminder whose hour mark matches `now`, if any.
    pub fn due_reminder(&self, now: OffsetDateTime) -> Option<ReminderThreshold> {
        ReminderThreshold::from_hours(self.hours_until_start(now))
    }
}
