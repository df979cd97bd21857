//! Audit record types and the line wire format.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Separator between the fields of a serialized audit record.
const FIELD_SEPARATOR: &str = " — ";

/// Timestamp format used in the audit log.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine observation (service healthy, recovery succeeded).
    Info,
    /// Degraded but still being handled (restart attempt, failed attempt).
    Warning,
    /// Requires operator attention (retry ceiling reached).
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Error returned when parsing an unknown severity keyword.
#[derive(Debug, thiserror::Error)]
#[error("Unknown severity: {0:?}")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseSeverityError(s.to_owned())),
        }
    }
}

/// One immutable entry of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    /// When the record was written.
    pub timestamp: DateTime<Local>,

    /// Severity of the event.
    pub severity: Severity,

    /// Human-readable description of the decision or outcome.
    pub message: String,
}

impl AuditRecord {
    /// Creates a record stamped with the current local time.
    #[must_use]
    pub fn now(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            severity,
            message: message.into(),
        }
    }

    /// Serializes the record into its single-line wire form.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.severity,
            self.message
        )
    }

    /// Parses a record from its single-line wire form.
    ///
    /// Returns `None` for lines that do not match the format (foreign lines
    /// in the sink are tolerated, not fatal).
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, FIELD_SEPARATOR);
        let timestamp_str = parts.next()?;
        let severity_str = parts.next()?;
        let message = parts.next()?;

        let naive = NaiveDateTime::parse_from_str(timestamp_str, TIMESTAMP_FORMAT).ok()?;
        let timestamp = Local.from_local_datetime(&naive).earliest()?;
        let severity = severity_str.parse().ok()?;

        Some(Self {
            timestamp,
            severity,
            message: message.to_owned(),
        })
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_round_trip() {
        let record = AuditRecord::now(Severity::Warning, "restart attempt 1 of 3");
        let parsed = AuditRecord::parse_line(&record.to_line()).unwrap();

        assert_eq!(parsed.severity, Severity::Warning);
        assert_eq!(parsed.message, "restart attempt 1 of 3");
        // Sub-second precision is not part of the wire format.
        assert_eq!(
            parsed.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
        );
    }

    #[test]
    fn test_message_may_contain_separator() {
        let record = AuditRecord::now(Severity::Info, "left — right");
        let parsed = AuditRecord::parse_line(&record.to_line()).unwrap();
        assert_eq!(parsed.message, "left — right");
    }

    #[test]
    fn test_foreign_lines_are_rejected() {
        assert!(AuditRecord::parse_line("").is_none());
        assert!(AuditRecord::parse_line("rotated by logrotate").is_none());
        assert!(AuditRecord::parse_line("2026-01-01 00:00:00 — shouting — msg").is_none());
        assert!(AuditRecord::parse_line("not a date — info — msg").is_none());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Critical.to_string(), "critical");
    }
}
