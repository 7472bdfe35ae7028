//! Local-day calendar: a single fixed UTC offset, no timezone database.

use core::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use bordertally_core::{DomainError, ValueObject};

/// The fixed reference offset that defines which calendar day an instant
/// falls on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceZone {
    offset: FixedOffset,
}

impl ReferenceZone {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn from_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Offset east of UTC in seconds; `None` when outside ±24h.
    pub fn east_seconds(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(Self::from_offset)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar date of `at` in this zone.
    pub fn local_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl ValueObject for ReferenceZone {}

impl core::fmt::Display for ReferenceZone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.offset, f)
    }
}

/// Accepts `Z`, `UTC`, and anything chrono reads as a fixed offset
/// (`+HH:MM`, `-HHMM`).
impl FromStr for ReferenceZone {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }

        s.parse::<FixedOffset>()
            .map(Self::from_offset)
            .map_err(|e| DomainError::validation("utcOffset", format!("'{s}' is not an offset like +05:30: {e}")))
    }
}

impl TryFrom<String> for ReferenceZone {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReferenceZone> for String {
    fn from(value: ReferenceZone) -> Self {
        value.to_string()
    }
}

/// Days from `first` through `last`, both counted. Zero when `last` precedes
/// `first`.
pub fn inclusive_days(first: NaiveDate, last: NaiveDate) -> u32 {
    if last < first {
        return 0;
    }
    let span = last.signed_duration_since(first).num_days() + 1;
    u32::try_from(span).unwrap_or(u32::MAX)
}
