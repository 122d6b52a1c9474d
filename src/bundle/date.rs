use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Point in time as milliseconds since the Unix epoch.
///
/// Kept as a plain millisecond count so every 64-bit value survives a round
/// trip, including instants outside the range `chrono` can represent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Date(i64);

impl Date {
    pub const EPOCH: Date = Date(0);

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn millis(self) -> i64 {
        self.0
    }

    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// `None` when the instant is outside `chrono`'s supported range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Date {
    fn from(dt: DateTime<Tz>) -> Self {
        Self(dt.timestamp_millis())
    }
}

impl fmt::Display for Date {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "@{}ms", self.0),
        }
    }
}
