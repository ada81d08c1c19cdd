//! JSON output formatting.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use ledgerlens_core::{ColumnKey, Credential, CredentialState, PeriodKey};
use serde::{Serialize, Serializer};

// ============================================================================
// Output Types
// ============================================================================

/// One report column and its value.
#[derive(Debug, Serialize)]
pub struct ColumnOutput {
    pub column: String,
    pub value: f64,
}

/// Converts a column series for output.
pub fn columns_output(series: &[(ColumnKey, f64)]) -> Vec<ColumnOutput> {
    series
        .iter()
        .map(|(key, value)| ColumnOutput {
            column: key.to_string(),
            value: *value,
        })
        .collect()
}

/// Monthly temperatures for one location and year.
#[derive(Debug, Serialize)]
pub struct TemperatureOutput {
    pub location: String,
    pub year: i32,
    pub months: BTreeMap<PeriodKey, f64>,
}

/// Stored credential summary. Tokens are never included.
#[derive(Debug, Serialize)]
pub struct AuthStatusOutput {
    pub context: String,
    pub state: CredentialState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub refresh_expires_at: Option<DateTime<Utc>>,
}

impl AuthStatusOutput {
    /// Summarizes `credential` at `now` (epoch seconds).
    pub fn new(context: &str, credential: Option<&Credential>, now: i64) -> Self {
        let state = CredentialState::of(credential, now);
        let complete = credential.filter(|c| c.is_complete());

        Self {
            context: context.to_string(),
            state,
            realm_id: complete.map(|c| c.realm_id.clone()),
            expires_at: complete.and_then(|c| DateTime::from_timestamp(c.expires_at, 0)),
            seconds_remaining: complete.map(|c| c.seconds_remaining(now).max(0)),
            refresh_expires_at: complete
                .and_then(|c| c.refresh_expires_at)
                .and_then(|t| DateTime::from_timestamp(t, 0)),
        }
    }
}

// ============================================================================
// Serialization helpers
// ============================================================================

#[allow(clippy::ref_option)]
fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}

// ============================================================================
// Tests
// ============================================================================
