//! Reshaping of tag-coded status data into typed records.
//!
//! The service returns one wire row per measured quantity. Rows that share a
//! `(date, model)` pair were taken in the same reading; they are merged into a
//! single [`MeasurementRecord`] whose fields are filled from the schema of the
//! requested category.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::HealthPlanetError;
use crate::resolver;
use crate::schema::{FieldValue, Measurement};
use crate::utils::{deserialize_string_or_number, parse_local_timestamp};

/// Which timestamp the service should report for each reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateType {
    /// Time the reading was uploaded to the service.
    RegisteredAt,
    /// Time the device took the reading.
    #[default]
    MeasuredAt,
}

impl DateType {
    /// Value of the `date` form parameter.
    pub fn code(self) -> u8 {
        match self {
            DateType::RegisteredAt => 0,
            DateType::MeasuredAt => 1,
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            DateType::RegisteredAt => "registered_at",
            DateType::MeasuredAt => "measured_at",
        }
    }
}

impl fmt::Display for DateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl TryFrom<u8> for DateType {
    type Error = HealthPlanetError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(DateType::RegisteredAt),
            1 => Ok(DateType::MeasuredAt),
            other => Err(HealthPlanetError::Config(format!(
                "invalid date type: {other}"
            ))),
        }
    }
}

impl FromStr for DateType {
    type Err = HealthPlanetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" | "registered_at" => Ok(DateType::RegisteredAt),
            "1" | "measured_at" => Ok(DateType::MeasuredAt),
            other => Err(HealthPlanetError::Config(format!(
                "invalid date type: {other}"
            ))),
        }
    }
}

/// One row of the `data` array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMeasurement {
    pub date: String,
    pub model: String,
    pub tag: String,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub keydata: String,
}

impl RawMeasurement {
    pub fn new(
        date: impl Into<String>,
        model: impl Into<String>,
        tag: impl Into<String>,
        keydata: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            model: model.into(),
            tag: tag.into(),
            keydata: keydata.into(),
        }
    }
}

/// A single reading with every field of its category.
///
/// Exactly one of `measured_at` / `registered_at` is set, depending on the
/// [`DateType`] the data was requested with.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct MeasurementRecord<M: Measurement> {
    measured_at: Option<i64>,
    registered_at: Option<i64>,
    model: String,
    #[serde(flatten)]
    values: M,
}

impl<M: Measurement> MeasurementRecord<M> {
    fn new(date_type: DateType, timestamp: i64, model: String) -> Self {
        let (measured_at, registered_at) = match date_type {
            DateType::MeasuredAt => (Some(timestamp), None),
            DateType::RegisteredAt => (None, Some(timestamp)),
        };
        Self {
            measured_at,
            registered_at,
            model,
            values: M::default(),
        }
    }

    /// Unix seconds of the reading time, when requested with [`DateType::MeasuredAt`].
    pub fn measured_at(&self) -> Option<i64> {
        self.measured_at
    }

    /// Unix seconds of the upload time, when requested with [`DateType::RegisteredAt`].
    pub fn registered_at(&self) -> Option<i64> {
        self.registered_at
    }

    /// Whichever timestamp is populated.
    pub fn timestamp(&self) -> i64 {
        self.measured_at.or(self.registered_at).unwrap_or_default()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn values(&self) -> &M {
        &self.values
    }

    pub fn into_values(self) -> M {
        self.values
    }
}

/// Group, type and order raw rows for category `M`.
///
/// Rows are grouped by `(date, model)`. Groups come back ascending by
/// timestamp; groups with equal timestamps keep the order in which they were
/// first seen. Within a group a repeated tag overwrites the earlier value.
/// Any unknown tag or unparsable value fails the whole call.
pub fn reshape<M: Measurement>(
    date_type: DateType,
    rows: &[RawMeasurement],
) -> Result<Vec<MeasurementRecord<M>>, HealthPlanetError> {
    let mut slots: HashMap<(&str, &str), usize> = HashMap::new();
    let mut records: Vec<MeasurementRecord<M>> = Vec::new();

    for row in rows {
        let key = (row.date.as_str(), row.model.as_str());
        let slot = match slots.get(&key) {
            Some(&slot) => slot,
            None => {
                let timestamp = parse_local_timestamp(&row.date)?;
                records.push(MeasurementRecord::new(
                    date_type,
                    timestamp,
                    row.model.clone(),
                ));
                slots.insert(key, records.len() - 1);
                records.len() - 1
            }
        };

        let spec = resolver::resolve(M::CATEGORY, &row.tag)?;
        let value = FieldValue::parse(spec.name, spec.kind, &row.keydata)?;
        records[slot].values.assign(spec.name, value)?;
    }

    records.sort_by_key(|r| r.timestamp());
    tracing::trace!(
        category = %M::CATEGORY,
        rows = rows.len(),
        records = records.len(),
        "reshaped status rows"
    );
    Ok(records)
}
