//! Timestamps and zone offsets as they cross the store boundary.
//!
//! Timestamps are `DateTime<Utc>` serialized as ISO-8601; zone offsets are
//! `±HH:MM` strings qualifying the local time of the reading.

use crate::error::ValidationError;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest offset accepted, in minutes (±18:00)
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// A UTC offset in `±HH:MM` form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ZoneOffset {
    minutes: i32,
}

impl ZoneOffset {
    pub const UTC: ZoneOffset = ZoneOffset { minutes: 0 };

    /// Build an offset from signed minutes east of UTC
    pub fn from_minutes(minutes: i32) -> Result<Self, ValidationError> {
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ValidationError::InvalidValue(format!(
                "zone offset of {} minutes is outside ±18:00",
                minutes
            )));
        }
        Ok(Self { minutes })
    }

    pub fn total_minutes(&self) -> i32 {
        self.minutes
    }

    /// The equivalent chrono offset
    pub fn to_fixed(&self) -> FixedOffset {
        // In range by construction
        FixedOffset::east_opt(self.minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Render `time` in this offset's local time
    pub fn localize(&self, time: DateTime<Utc>) -> DateTime<FixedOffset> {
        time.with_timezone(&self.to_fixed())
    }
}

impl FromStr for ZoneOffset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ValidationError::InvalidValue(format!("zone offset '{}' is not in ±HH:MM form", s))
        };

        let bytes = s.as_bytes();
        if bytes.len() != 6 || bytes[3] != b':' {
            return Err(invalid());
        }
        let sign = match bytes[0] {
            b'+' => 1,
            b'-' => -1,
            _ => return Err(invalid()),
        };
        let digits = |range: std::ops::Range<usize>| -> Result<i32, ValidationError> {
            let part = &s[range];
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse::<i32>().map_err(|_| invalid())
        };
        let hours = digits(1..3)?;
        let minutes = digits(4..6)?;
        if minutes >= 60 {
            return Err(invalid());
        }
        Self::from_minutes(sign * (hours * 60 + minutes))
    }
}

impl fmt::Display for ZoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minutes < 0 { '-' } else { '+' };
        let abs = self.minutes.abs();
        write!(f, "{}{:02}:{:02}", sign, abs / 60, abs % 60)
    }
}

impl Serialize for ZoneOffset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ZoneOffset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Time span shared by interval records
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_zone_offset: Option<ZoneOffset>,
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_zone_offset: Option<ZoneOffset>,
}

impl Interval {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            start_zone_offset: None,
            end_time,
            end_zone_offset: None,
        }
    }

    /// Apply one offset to both ends
    pub fn with_zone_offset(mut self, offset: ZoneOffset) -> Self {
        self.start_zone_offset = Some(offset);
        self.end_zone_offset = Some(offset);
        self
    }

    /// Fail unless `start_time <= end_time` (or `<` when `strict`)
    pub fn check_order(&self, strict: bool) -> Result<(), ValidationError> {
        let ok = if strict {
            self.start_time < self.end_time
        } else {
            self.start_time <= self.end_time
        };
        if ok {
            Ok(())
        } else {
            Err(ValidationError::InvalidRange(format!(
                "start time {} must be {} end time {}",
                self.start_time,
                if strict { "before" } else { "at or before" },
                self.end_time
            )))
        }
    }

    /// Whether `[start, end]` lies inside this interval (inclusive)
    pub fn contains_span(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start >= self.start_time && end <= self.end_time
    }
}

/// Single point in time shared by instant records
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instant {
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_offset: Option<ZoneOffset>,
}

impl Instant {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time,
            zone_offset: None,
        }
    }

    pub fn with_zone_offset(mut self, offset: ZoneOffset) -> Self {
        self.zone_offset = Some(offset);
        self
    }
}
