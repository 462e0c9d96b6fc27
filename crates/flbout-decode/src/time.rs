use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Wire form the timestamp was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TimeEncoding {
    /// `fixext8` payload: seconds (4B BE) then nanoseconds (4B BE).
    EventTime { ext_type: i8 },
    /// Plain integer of whole seconds.
    Integer,
}

/// Event timestamp with nanosecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventTime {
    seconds: i64,
    nanoseconds: u32,
    encoding: TimeEncoding,
}

impl EventTime {
    /// Timestamp from an EventTime extension payload.
    pub fn from_event_time(seconds: u32, nanoseconds: u32, ext_type: i8) -> Self {
        Self {
            seconds: i64::from(seconds),
            nanoseconds,
            encoding: TimeEncoding::EventTime { ext_type },
        }
    }

    /// Timestamp from integer seconds.
    pub fn from_seconds(seconds: i64) -> Self {
        Self {
            seconds,
            nanoseconds: 0,
            encoding: TimeEncoding::Integer,
        }
    }

    /// Whole seconds since the Unix epoch, as carried on the wire.
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Sub-second part as carried on the wire.
    ///
    /// Producers are not required to keep this below one second; the
    /// conversions below carry the excess into the seconds.
    pub fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    pub fn encoding(&self) -> TimeEncoding {
        self.encoding
    }

    /// Whole seconds since the epoch after normalizing the sub-second part.
    pub fn unix_seconds(&self) -> i64 {
        self.seconds
            .saturating_add(i64::from(self.nanoseconds / 1_000_000_000))
    }

    /// Convert to the platform clock representation.
    ///
    /// Returns `None` when the instant is not representable.
    pub fn to_system_time(&self) -> Option<SystemTime> {
        let subsec = Duration::from_nanos(u64::from(self.nanoseconds));
        if self.seconds >= 0 {
            UNIX_EPOCH
                .checked_add(Duration::from_secs(self.seconds.unsigned_abs()))?
                .checked_add(subsec)
        } else {
            UNIX_EPOCH
                .checked_sub(Duration::from_secs(self.seconds.unsigned_abs()))?
                .checked_add(subsec)
        }
    }
}
