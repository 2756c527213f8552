use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::domain::WorkshopId;

/// Bookable hour of the workshop day, always one of [`HOURS_CATALOG`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotHour(u8);

pub const OPENING_HOUR: u8 = 8;
pub const CLOSING_HOUR: u8 = 18;

/// Every schedulable hour, 08:00 through 18:00.
pub const HOURS_CATALOG: [SlotHour; 11] = [
    SlotHour(8),
    SlotHour(9),
    SlotHour(10),
    SlotHour(11),
    SlotHour(12),
    SlotHour(13),
    SlotHour(14),
    SlotHour(15),
    SlotHour(16),
    SlotHour(17),
    SlotHour(18),
];

impl SlotHour {
    pub fn new(hour: u8) -> Result<Self, InvalidHour> {
        if (OPENING_HOUR..=CLOSING_HOUR).contains(&hour) {
            Ok(Self(hour))
        } else {
            Err(InvalidHour(format!("{hour:02}:00")))
        }
    }

    pub const fn hour(self) -> u8 {
        self.0
    }

    pub fn label(self) -> String {
        format!("{:02}:00", self.0)
    }
}

impl fmt::Display for SlotHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

impl FromStr for SlotHour {
    type Err = InvalidHour;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (hour, minutes) = trimmed
            .split_once(':')
            .ok_or_else(|| InvalidHour(trimmed.to_string()))?;
        if minutes != "00" {
            return Err(InvalidHour(trimmed.to_string()));
        }
        let hour = hour
            .parse::<u8>()
            .map_err(|_| InvalidHour(trimmed.to_string()))?;
        Self::new(hour).map_err(|_| InvalidHour(trimmed.to_string()))
    }
}

impl TryFrom<String> for SlotHour {
    type Error = InvalidHour;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotHour> for String {
    fn from(value: SlotHour) -> Self {
        value.label()
    }
}

/// Raised when an hour label is not part of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a schedulable hour (expected HH:00 between 08:00 and 18:00)")]
pub struct InvalidHour(pub String);

/// One hour of a day schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourSlot {
    pub hour: SlotHour,
    pub active: bool,
    pub capacity: u32,
    #[serde(rename = "booked_count")]
    pub booked: u32,
}

impl HourSlot {
    pub(crate) const fn closed(hour: SlotHour) -> Self {
        Self {
            hour,
            active: false,
            capacity: 1,
            booked: 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        if self.active {
            self.capacity.saturating_sub(self.booked)
        } else {
            0
        }
    }
}

/// A workshop's bookable hours for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub workshop_id: WorkshopId,
    pub date: NaiveDate,
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    pub slots: Vec<HourSlot>,
}

/// Requested configuration for one hour when a day is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConfig {
    pub hour: SlotHour,
    pub active: bool,
    pub capacity: u32,
}

/// Partial update of one hour; absent fields keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotUpdate {
    pub hour: SlotHour,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl SlotUpdate {
    pub fn open(hour: SlotHour, capacity: u32) -> Self {
        Self {
            hour,
            active: Some(true),
            capacity: Some(capacity),
        }
    }

    pub fn close(hour: SlotHour) -> Self {
        Self {
            hour,
            active: Some(false),
            capacity: None,
        }
    }
}

/// Request payload for creating a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub slots: Vec<SlotConfig>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Merge request for an existing day.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayUpdate {
    #[serde(default)]
    pub slots: Vec<SlotUpdate>,
    #[serde(default)]
    pub blocked: Option<bool>,
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Named bulk configuration: open `hours` with the same capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTemplate {
    pub name: String,
    pub hours: Vec<SlotHour>,
    pub capacity: u32,
}

impl ScheduleTemplate {
    pub fn morning(capacity: u32) -> Self {
        Self::span("morning", 8, 12, capacity)
    }

    pub fn afternoon(capacity: u32) -> Self {
        Self::span("afternoon", 14, 18, capacity)
    }

    pub fn full_day(capacity: u32) -> Self {
        Self::span("full_day", OPENING_HOUR, CLOSING_HOUR, capacity)
    }

    /// Resolve one of the built-in templates by name.
    pub fn builtin(name: &str, capacity: u32) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "morning" => Some(Self::morning(capacity)),
            "afternoon" => Some(Self::afternoon(capacity)),
            "full_day" | "full-day" => Some(Self::full_day(capacity)),
            _ => None,
        }
    }

    fn span(name: &str, from: u8, to: u8, capacity: u32) -> Self {
        Self {
            name: name.to_string(),
            hours: HOURS_CATALOG
                .iter()
                .copied()
                .filter(|hour| (from..=to).contains(&hour.hour()))
                .collect(),
            capacity,
        }
    }
}

/// Why a reservation was refused on an otherwise known hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedReason {
    DayBlocked,
    SlotInactive,
    DayNotConfigured,
}

impl ClosedReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::DayBlocked => "the day is blocked",
            Self::SlotInactive => "the hour is not open for bookings",
            Self::DayNotConfigured => "the day has no schedule configured",
        }
    }
}

/// Result of a release; `AlreadyEmpty` signals a double release upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released { remaining_booked: u32 },
    AlreadyEmpty,
}

/// An hour that can take at least one more booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailableSlot {
    pub hour: SlotHour,
    pub capacity: u32,
    pub remaining: u32,
}
