use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bordertally_core::{DomainError, DomainResult, ValueObject};

/// Direction of a border crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CrossingKind {
    Entry,
    Exit,
}

/// A single timestamped border crossing, as the day-accounting engine sees it.
///
/// `location` and the proof fields are carried for the record keeper; the
/// engine only reads `kind` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossingEvent {
    #[serde(rename = "type")]
    pub kind: CrossingKind,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "portOfEntry")]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_link: Option<String>,
    #[serde(rename = "i94Proof", default, skip_serializing_if = "Option::is_none")]
    pub i94_proof: Option<String>,
}

impl CrossingEvent {
    pub fn new(kind: CrossingKind, timestamp: DateTime<Utc>, location: impl Into<String>) -> Self {
        Self {
            kind,
            timestamp,
            location: location.into(),
            notes: None,
            proof_link: None,
            i94_proof: None,
        }
    }

    pub fn entry(timestamp: DateTime<Utc>, location: impl Into<String>) -> Self {
        Self::new(CrossingKind::Entry, timestamp, location)
    }

    pub fn exit(timestamp: DateTime<Utc>, location: impl Into<String>) -> Self {
        Self::new(CrossingKind::Exit, timestamp, location)
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl ValueObject for CrossingEvent {}

/// Unvalidated crossing as submitted by a caller (JSON, camelCase keys).
///
/// Every field is optional at the serde level so that a missing or malformed
/// value surfaces as a `DomainError::Validation` naming the field rather than
/// an opaque deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCrossing {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<String>,
    pub port_of_entry: Option<String>,
    pub notes: Option<String>,
    pub proof_link: Option<String>,
    #[serde(rename = "i94Proof")]
    pub i94_proof: Option<String>,
}

impl NewCrossing {
    /// Check every field and produce the engine-facing value.
    pub fn validate(self) -> DomainResult<CrossingEvent> {
        let kind = match self.kind.as_deref().map(str::trim) {
            Some("ENTRY") => CrossingKind::Entry,
            Some("EXIT") => CrossingKind::Exit,
            Some(other) => {
                return Err(DomainError::validation(
                    "type",
                    format!("expected ENTRY or EXIT, got '{other}'"),
                ));
            }
            None => return Err(DomainError::validation("type", "is required")),
        };

        let raw_date = self
            .date
            .as_deref()
            .ok_or_else(|| DomainError::validation("date", "is required"))?;
        let timestamp = DateTime::parse_from_rfc3339(raw_date.trim())
            .map_err(|e| DomainError::validation("date", format!("'{raw_date}' is not an RFC 3339 datetime: {e}")))?
            .with_timezone(&Utc);

        let location = match self.port_of_entry {
            Some(port) if !port.trim().is_empty() => port.trim().to_string(),
            _ => return Err(DomainError::validation("portOfEntry", "Port of entry is required")),
        };

        Ok(CrossingEvent {
            kind,
            timestamp,
            location,
            notes: non_blank(self.notes),
            proof_link: optional_link("proofLink", self.proof_link)?,
            i94_proof: optional_link("i94Proof", self.i94_proof)?,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Empty string means "no link"; anything else must be an absolute http(s) URL.
fn optional_link(field: &'static str, value: Option<String>) -> DomainResult<Option<String>> {
    let Some(link) = non_blank(value) else {
        return Ok(None);
    };
    let link = link.trim();
    let rest = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"))
        .ok_or_else(|| DomainError::validation(field, format!("'{link}' is not an http(s) URL")))?;

    let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    if host_end == 0 || link.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(field, format!("'{link}' is not an http(s) URL")));
    }
    Ok(Some(link.to_string()))
}
