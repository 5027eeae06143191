//! Status response container.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::HealthPlanetError;
use crate::reshape::{DateType, MeasurementRecord, RawMeasurement, reshape};
use crate::schema::Measurement;
use crate::utils::{deserialize_string_or_number, parse_birth_date};

/// Decoded body of a status endpoint, before reshaping.
#[derive(Clone, Debug, Deserialize)]
pub struct StatusPayload {
    pub birth_date: String,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub height: String,
    pub sex: String,
    #[serde(default)]
    pub data: Vec<RawMeasurement>,
}

/// Profile fields and the readings of one status call.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct StatusResult<M: Measurement> {
    birth_date: NaiveDate,
    height: f64,
    sex: String,
    items: Vec<MeasurementRecord<M>>,
}

impl<M: Measurement> StatusResult<M> {
    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    /// Height in centimeters.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// `"male"` or `"female"`, as reported by the service.
    pub fn sex(&self) -> &str {
        &self.sex
    }

    /// Readings in ascending timestamp order.
    pub fn items(&self) -> &[MeasurementRecord<M>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<MeasurementRecord<M>> {
        self.items
    }
}

/// Turn a decoded payload into a typed result.
pub fn build_result<M: Measurement>(
    date_type: DateType,
    payload: StatusPayload,
) -> Result<StatusResult<M>, HealthPlanetError> {
    let birth_date = parse_birth_date(&payload.birth_date)?;
    let height = payload
        .height
        .trim()
        .parse::<f64>()
        .map_err(|_| HealthPlanetError::TypeCoercion {
            field: "height",
            expected: "float",
            value: payload.height.clone(),
        })?;
    let items = reshape::<M>(date_type, &payload.data)?;
    Ok(StatusResult {
        birth_date,
        height,
        sex: payload.sex,
        items,
    })
}
