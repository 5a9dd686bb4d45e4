use time::{Date, OffsetDateTime, Time, macros::format_description};
use uuid::Uuid;

/// Lifecycle phase of an event within the current roster generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStatus {
    /// Roster is being assembled or the match is in progress.
    Open,
    /// Scheduled end has passed; the award poll takes over.
    Finished,
}

impl EventStatus {
    /// Stable lowercase name used by storage backends.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Open => "open",
            EventStatus::Finished => "finished",
        }
    }

    /// Parse the stored representation produced by [`EventStatus::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(EventStatus::Open),
            "finished" => Some(EventStatus::Finished),
            _ => None,
        }
    }
}

/// One of the pre-match reminder points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderThreshold {
    /// Three hours before kick-off.
    ThreeHours,
    /// Two hours before kick-off.
    TwoHours,
    /// One hour before kick-off.
    OneHour,
}

impl ReminderThreshold {
    /// Every threshold, furthest first.
    pub const ALL: [ReminderThreshold; 3] = [
        ReminderThreshold::ThreeHours,
        ReminderThreshold::TwoHours,
        ReminderThreshold::OneHour,
    ];

    /// Whole hours before start at which this reminder fires.
    pub fn hours(&self) -> i64 {
        match self {
            ReminderThreshold::ThreeHours => 3,
            ReminderThreshold::TwoHours => 2,
            ReminderThreshold::OneHour => 1,
        }
    }

    /// Threshold matching a whole-hour distance, if any.
    pub fn from_hours(hours: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|threshold| threshold.hours() == hours)
    }

    /// Name of the persisted flag tracking this reminder.
    pub fn flag_name(&self) -> &'static str {
        match self {
            ReminderThreshold::ThreeHours => "reminder_3h_sent",
            ReminderThreshold::TwoHours => "reminder_2h_sent",
            ReminderThreshold::OneHour => "reminder_1h_sent",
        }
    }
}

/// Scheduled meetup persisted by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEntity {
    /// Durable identifier, kept across roster generations.
    pub id: Uuid,
    /// Short human-shareable code, kept across roster generations.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Local calendar date of the match, when scheduled.
    pub date: Option<Date>,
    /// Local kick-off time, when scheduled.
    pub start_time: Option<Time>,
    /// Planned duration in minutes.
    pub duration_minutes: u32,
    /// Current lifecycle phase.
    pub status: EventStatus,
    /// Roster generation counter, bumped by every reset.
    pub generation: u32,
    /// Whether joining/leaving the roster is locked.
    pub roster_locked: bool,
    /// Whether the lineup board is locked.
    pub lineup_locked: bool,
    /// T-3h reminder already dispatched in this generation.
    pub reminder_3h_sent: bool,
    /// T-2h reminder already dispatched in this generation.
    pub reminder_2h_sent: bool,
    /// T-1h reminder already dispatched in this generation.
    pub reminder_1h_sent: bool,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
}

impl EventEntity {
    /// Build a fresh open event with every flag cleared.
    pub fn new(
        code: String,
        name: String,
        date: Option<Date>,
        start_time: Option<Time>,
        duration_minutes: u32,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            name,
            date,
            start_time,
            duration_minutes,
            status: EventStatus::Open,
            generation: 0,
            roster_locked: false,
            lineup_locked: false,
            reminder_3h_sent: false,
            reminder_2h_sent: false,
            reminder_1h_sent: false,
            created_at,
        }
    }

    /// Whether the reminder for `threshold` has already gone out.
    pub fn reminder_sent(&self, threshold: ReminderThreshold) -> bool {
        match threshold {
            ReminderThreshold::ThreeHours => self.reminder_3h_sent,
            ReminderThreshold::TwoHours => self.reminder_2h_sent,
            ReminderThreshold::OneHour => self.reminder_1h_sent,
        }
    }

    /// Mutable access to the flag backing `threshold`.
    pub fn reminder_flag_mut(&mut self, threshold: ReminderThreshold) -> &mut bool {
        match threshold {
            ReminderThreshold::ThreeHours => &mut self.reminder_3h_sent,
            ReminderThreshold::TwoHours => &mut self.reminder_2h_sent,
            ReminderThreshold::OneHour => &mut self.reminder_1h_sent,
        }
    }

    /// Return the event to a fresh open generation, keeping its identity.
    ///
    /// The schedule is cleared as well: the past date would otherwise finish the
    /// new generation on the very next pass.
    pub fn recycle(&mut self) {
        self.date = None;
        self.start_time = None;
        self.status = EventStatus::Open;
        self.generation = self.generation.wrapping_add(1);
        self.roster_locked = false;
        self.lineup_locked = false;
        self.reminder_3h_sent = false;
        self.reminder_2h_sent = false;
        self.reminder_1h_sent = false;
    }
}

/// Post-event most-valuable-participant poll, one per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardPollEntity {
    /// Primary key of the poll.
    pub id: Uuid,
    /// Event the poll belongs to.
    pub event_id: Uuid,
    /// Voting opens at this instant.
    pub starts_at: Option<OffsetDateTime>,
    /// Voting closes at this instant.
    pub ends_at: Option<OffsetDateTime>,
    /// Terminal flag; never reverts once set.
    pub finalized: bool,
    /// A poll notification has been claimed; never reverts once set.
    pub notif_sent: bool,
    /// Participant chosen when the poll was finalized.
    pub winner_participant_id: Option<Uuid>,
    /// When finalization was applied.
    pub finalized_at: Option<OffsetDateTime>,
}

impl AwardPollEntity {
    /// Build a not-yet-finalized poll for the given window.
    pub fn open(event_id: Uuid, starts_at: OffsetDateTime, ends_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            starts_at: Some(starts_at),
            ends_at: Some(ends_at),
            finalized: false,
            notif_sent: false,
            winner_participant_id: None,
            finalized_at: None,
        }
    }

    /// Whether votes are accepted at `now`.
    pub fn accepts_votes(&self, now: OffsetDateTime) -> bool {
        match (self.starts_at, self.ends_at) {
            (Some(starts_at), Some(ends_at)) => {
                !self.finalized && starts_at <= now && now <= ends_at
            }
            _ => false,
        }
    }

    /// Whether the voting window has closed without the poll being finalized.
    pub fn awaiting_finalization(&self, now: OffsetDateTime) -> bool {
        !self.finalized && self.ends_at.is_some_and(|ends_at| now > ends_at)
    }
}

/// Outcome applied atomically when a poll is finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult {
    /// Winning participant, when any vote was cast.
    pub winner_participant_id: Option<Uuid>,
    /// Registered user receiving the award; `None` for guests or no winner.
    pub award_user_id: Option<Uuid>,
    /// Finalization timestamp.
    pub finalized_at: OffsetDateTime,
}

/// Ballot from one participant; a later ballot from the same voter replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteEntity {
    /// Poll the vote belongs to.
    pub poll_id: Uuid,
    /// Participant casting the vote.
    pub voter_participant_id: Uuid,
    /// Participant receiving the vote.
    pub target_participant_id: Uuid,
    /// Last time this voter wrote a ballot.
    pub cast_at: OffsetDateTime,
}

/// Per-user award accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardEntity {
    /// Registered user owning the award.
    pub user_id: Uuid,
    /// Number of polls won.
    pub count: u32,
    /// Award level, incremented together with `count`.
    pub level: u32,
}

/// Opaque push delivery target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionEntity {
    /// Primary key of the subscription.
    pub id: Uuid,
    /// Optional registered user owning the subscription.
    pub user_id: Option<Uuid>,
    /// Provider-specific endpoint.
    pub endpoint: String,
    /// Registration timestamp.
    pub created_at: OffsetDateTime,
}

/// Member of an event roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantEntity {
    /// Primary key of the participant.
    pub id: Uuid,
    /// Event the participant joined.
    pub event_id: Uuid,
    /// Registered user behind the participant; `None` for guests.
    pub user_id: Option<Uuid>,
    /// Name shown on the roster.
    pub display_name: String,
}

/// Team formed within an event roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamEntity {
    /// Primary key of the team.
    pub id: Uuid,
    /// Event the team belongs to.
    pub event_id: Uuid,
    /// Team name.
    pub name: String,
}

/// Participant placed on a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentEntity {
    /// Team the participant plays for.
    pub team_id: Uuid,
    /// Assigned participant.
    pub participant_id: Uuid,
}

/// Position of a lineup token on a team's board.
#[derive(Debug, Clone, PartialEq)]
pub struct LineupPositionEntity {
    /// Team owning the board.
    pub team_id: Uuid,
    /// Participant the token represents.
    pub participant_id: Uuid,
    /// Horizontal board coordinate.
    pub x: f32,
    /// Vertical board coordinate.
    pub y: f32,
}

/// Parse a calendar date written as `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
}

/// Render a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "invalid-date".into())
}

/// Parse a time of day written as `HH:MM`.
pub fn parse_time(value: &str) -> Result<Time, time::error::Parse> {
    Time::parse(value, format_description!("[hour]:[minute]"))
}

/// Render a time of day as `HH:MM`.
pub fn format_time(time: Time) -> String {
    time.format(format_description!("[hour]:[minute]"))
        .unwrap_or_else(|_| "invalid-time".into())
}
