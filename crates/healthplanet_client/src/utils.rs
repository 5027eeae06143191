//! Wire format helpers for dates, times and loosely typed JSON scalars.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::HealthPlanetError;

/// The service reports and accepts wall-clock time in Asia/Tokyo, which has
/// no daylight saving.
pub const TOKYO_UTC_OFFSET_SECS: i64 = 9 * 3600;

const MEASUREMENT_DATE_FORMAT: &str = "%Y%m%d%H%M";
const RANGE_BOUND_FORMAT: &str = "%Y%m%d%H%M%S";
const BIRTH_DATE_FORMAT: &str = "%Y%m%d";

/// Convert a `YYYYMMDDhhmm` Tokyo timestamp to unix seconds.
///
/// Only the canonical 12-digit form is accepted, so two rows with the same
/// instant always carry the same string and land in the same group.
pub fn parse_local_timestamp(s: &str) -> Result<i64, HealthPlanetError> {
    let malformed = || HealthPlanetError::TypeCoercion {
        field: "date",
        expected: "YYYYMMDDhhmm timestamp",
        value: s.to_string(),
    };
    if s.len() != 12 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let local =
        NaiveDateTime::parse_from_str(s, MEASUREMENT_DATE_FORMAT).map_err(|_| malformed())?;
    Ok(local.and_utc().timestamp() - TOKYO_UTC_OFFSET_SECS)
}

/// Parse the profile birth date. `YYYYMMDD` is what the service sends;
/// `YYYY-MM-DD` is accepted as well.
pub fn parse_birth_date(s: &str) -> Result<NaiveDate, HealthPlanetError> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, BIRTH_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .map_err(|_| HealthPlanetError::TypeCoercion {
            field: "birth_date",
            expected: "calendar date",
            value: s.to_string(),
        })
}

/// Format a `from`/`to` bound for the status endpoints.
pub fn format_range_bound(t: &NaiveDateTime) -> String {
    t.format(RANGE_BOUND_FORMAT).to_string()
}

/// Accept either a JSON string or a JSON number and keep its text form.
pub(crate) fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
