//! HTTP client implementation for the Health Planet API.
//!
//! This module provides a reqwest-based implementation of the
//! [`HealthPlanetClient`](crate::HealthPlanetClient) trait.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::observability;
use crate::request::{DateRange, StatusRequest};
use crate::reshape::DateType;
use crate::result::{StatusPayload, StatusResult, build_result};
use crate::schema::{BloodPressure, BodyComposition, Measurement, Pedometer, UrinarySugar};
use crate::{HealthPlanetClient, HealthPlanetError};

/// Client for the status endpoints using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestHealthPlanetClient {
    base_url: String,
    access_token: SecretString,
    date_type: DateType,
    client: reqwest::Client,
}

impl ReqwestHealthPlanetClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the service (e.g., "https://www.healthplanet.jp")
    /// * `access_token` - Token obtained through [`crate::OAuthClient::exchange_token`]
    /// * `date_type` - Which timestamp every fetch made by this client reports
    pub fn new(
        base_url: &str,
        access_token: SecretString,
        date_type: DateType,
    ) -> Result<Self, HealthPlanetError> {
        if access_token.expose_secret().trim().is_empty() {
            return Err(HealthPlanetError::Config(
                "param 'access_token' is required".into(),
            ));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            date_type,
            client: build_http_client()?,
        })
    }

    /// Create a client from the base URL and access token in `config`.
    pub fn from_config(config: &Config, date_type: DateType) -> Result<Self, HealthPlanetError> {
        let token = config.access_token.clone().ok_or_else(|| {
            HealthPlanetError::Config("param 'access_token' is required".into())
        })?;
        Self::new(&config.base_url, token, date_type)
    }

    pub fn date_type(&self) -> DateType {
        self.date_type
    }

    /// Fetch and reshape the status data of category `M`.
    pub async fn fetch_status<M: Measurement>(
        &self,
        range: DateRange,
    ) -> Result<StatusResult<M>, HealthPlanetError> {
        let category = M::CATEGORY;
        let outcome = self.fetch_status_inner::<M>(range).await;
        match &outcome {
            Ok(result) => observability::record_fetch(category, result.items().len()),
            Err(e) => observability::record_failure(category, e),
        }
        outcome
    }

    async fn fetch_status_inner<M: Measurement>(
        &self,
        range: DateRange,
    ) -> Result<StatusResult<M>, HealthPlanetError> {
        let request =
            StatusRequest::build(M::CATEGORY, &self.access_token, self.date_type, &range)?;
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(
            category = %M::CATEGORY,
            date_type = %self.date_type,
            from = range.from.is_some(),
            to = range.to.is_some(),
            "requesting status"
        );

        observability::record_request(M::CATEGORY);
        let (status, body) = post_form(&self.client, &url, &request.params).await?;
        if !status.is_success() {
            tracing::warn!(
                category = %M::CATEGORY,
                status = status.as_u16(),
                "status request failed"
            );
            return Err(error_from_status(status, &body));
        }

        let payload: StatusPayload = decode_json(&body)?;
        let result = build_result::<M>(self.date_type, payload)?;
        tracing::debug!(
            category = %M::CATEGORY,
            records = result.items().len(),
            "status reshaped"
        );
        Ok(result)
    }
}

#[async_trait]
impl HealthPlanetClient for ReqwestHealthPlanetClient {
    async fn get_body_composition(
        &self,
        range: DateRange,
    ) -> Result<StatusResult<BodyComposition>, HealthPlanetError> {
        self.fetch_status(range).await
    }

    async fn get_blood_pressure(
        &self,
        range: DateRange,
    ) -> Result<StatusResult<BloodPressure>, HealthPlanetError> {
        self.fetch_status(range).await
    }

    async fn get_pedometer(
        &self,
        range: DateRange,
    ) -> Result<StatusResult<Pedometer>, HealthPlanetError> {
        self.fetch_status(range).await
    }

    async fn get_urinary_sugar(
        &self,
        range: DateRange,
    ) -> Result<StatusResult<UrinarySugar>, HealthPlanetError> {
        self.fetch_status(range).await
    }
}

/// Build the shared reqwest client. Certificate verification stays on.
pub(crate) fn build_http_client() -> Result<reqwest::Client, HealthPlanetError> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("healthplanet_client/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// POST `params` as an urlencoded form and return the status and body text.
pub(crate) async fn post_form<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    params: &T,
) -> Result<(StatusCode, String), HealthPlanetError> {
    let resp = client.post(url).form(params).send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    Ok((status, body))
}

/// Decode a JSON body, keeping the raw text on failure.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, HealthPlanetError> {
    serde_json::from_str(body).map_err(|source| HealthPlanetError::MalformedResponse {
        source,
        body: body.to_string(),
    })
}

/// Extract error information from a failed response.
pub(crate) fn error_from_status(status: StatusCode, body: &str) -> HealthPlanetError {
    let body_snippet: String = body.chars().take(256).collect();
    HealthPlanetError::Status {
        status: status.as_u16(),
        body: body_snippet,
    }
}
