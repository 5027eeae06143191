//! Client for the Health Planet measurement API.
//!
//! The service exposes four status endpoints that return a flat list of
//! tag-coded readings. This crate requests them and reshapes the reply into
//! one typed record per reading, see [`reshape::reshape`].

use async_trait::async_trait;
use thiserror::Error;

pub mod auth;
pub mod config;
pub mod http_client;
pub mod observability;
pub mod request;
pub mod reshape;
pub mod resolver;
pub mod result;
pub mod schema;
pub mod utils;

pub use auth::{AccessToken, OAuthClient};
pub use config::Config;
pub use request::{DateRange, StatusRequest};
pub use reshape::{DateType, MeasurementRecord, RawMeasurement};
pub use result::StatusResult;
pub use schema::{
    BloodPressure, BodyComposition, Category, FieldSpec, FieldValue, Measurement, Pedometer,
    Scope, UrinarySugar, ValueKind,
};

#[derive(Debug, Error)]
pub enum HealthPlanetError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("oauth error: {0}")]
    OAuth(String),
    #[error("malformed response: {source} - body: {body}")]
    MalformedResponse {
        source: serde_json::Error,
        body: String,
    },
    #[error("unknown tag {tag} for {category}")]
    UnknownTag { category: Category, tag: String },
    #[error("cannot parse {field} value {value:?} as {expected}")]
    TypeCoercion {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

impl HealthPlanetError {
    /// Short stable label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Config(_) => "config",
            Self::OAuth(_) => "oauth",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::UnknownTag { .. } => "unknown_tag",
            Self::TypeCoercion { .. } => "type_coercion",
            Self::Status { .. } => "status",
        }
    }
}

/// Read access to the four status endpoints.
///
/// Every call issues one request and returns a freshly built result; nothing
/// is cached between calls.
#[async_trait]
pub trait HealthPlanetClient: Send + Sync + 'static {
    /// Body composition scale readings (`/status/innerscan.json`).
    async fn get_body_composition(
        &self,
        range: DateRange,
    ) -> Result<StatusResult<BodyComposition>, HealthPlanetError>;

    /// Blood pressure monitor readings (`/status/sphygmomanometer.json`).
    async fn get_blood_pressure(
        &self,
        range: DateRange,
    ) -> Result<StatusResult<BloodPressure>, HealthPlanetError>;

    /// Pedometer readings (`/status/pedometer.json`).
    async fn get_pedometer(
        &self,
        range: DateRange,
    ) -> Result<StatusResult<Pedometer>, HealthPlanetError>;

    /// Urine glucose readings (`/status/smug.json`).
    async fn get_urinary_sugar(
        &self,
        range: DateRange,
    ) -> Result<StatusResult<UrinarySugar>, HealthPlanetError>;
}
