//! Form parameters for the status endpoints.

use std::fmt;

use chrono::NaiveDateTime;
use secrecy::{ExposeSecret, SecretString};

use crate::HealthPlanetError;
use crate::reshape::DateType;
use crate::schema::Category;
use crate::utils::format_range_bound;

/// Optional `from` / `to` bounds, in Tokyo wall-clock time.
///
/// A missing bound leaves that side open; the service then applies its own
/// default window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        Self { from, to }
    }

    pub fn between(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self::new(Some(from), Some(to))
    }

    pub fn since(from: NaiveDateTime) -> Self {
        Self::new(Some(from), None)
    }

    pub fn until(to: NaiveDateTime) -> Self {
        Self::new(None, Some(to))
    }

    fn validate(&self) -> Result<(), HealthPlanetError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(HealthPlanetError::Config(format!(
                    "date range starts after it ends: {} > {}",
                    format_range_bound(&from),
                    format_range_bound(&to)
                )));
            }
        }
        Ok(())
    }
}

/// A fully built status request: endpoint path plus form body.
#[derive(Clone, PartialEq, Eq)]
pub struct StatusRequest {
    pub path: &'static str,
    pub params: Vec<(&'static str, String)>,
}

impl StatusRequest {
    /// Build the request for `category`. Every tag of the category schema is
    /// requested.
    pub fn build(
        category: Category,
        access_token: &SecretString,
        date_type: DateType,
        range: &DateRange,
    ) -> Result<Self, HealthPlanetError> {
        let token = access_token.expose_secret();
        if token.trim().is_empty() {
            return Err(HealthPlanetError::Config(
                "param 'access_token' is required".into(),
            ));
        }
        range.validate()?;

        let mut params: Vec<(&'static str, String)> = vec![
            ("access_token", token.to_string()),
            ("date", date_type.code().to_string()),
            ("tag", category.tag_codes()),
        ];
        if let Some(from) = range.from.as_ref() {
            params.push(("from", format_range_bound(from)));
        }
        if let Some(to) = range.to.as_ref() {
            params.push(("to", format_range_bound(to)));
        }

        Ok(Self {
            path: category.endpoint(),
            params,
        })
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for StatusRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| {
                if *k == "access_token" {
                    (*k, "[REDACTED]")
                } else {
                    (*k, v.as_str())
                }
            })
            .collect();
        f.debug_struct("StatusRequest")
            .field("path", &self.path)
            .field("params", &params)
            .finish()
    }
}
