//! OAuth2 authorization-code flow against `/oauth/auth` and `/oauth/token`.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::HealthPlanetError;
use crate::config::Config;
use crate::http_client::{build_http_client, decode_json, error_from_status, post_form};
use crate::schema::Scope;

pub const AUTH_PATH: &str = "/oauth/auth";
pub const TOKEN_PATH: &str = "/oauth/token";

/// Token returned by a successful code exchange.
#[derive(Clone, Debug)]
pub struct AccessToken {
    pub access_token: SecretString,
    /// Lifetime in seconds.
    pub expires_in: u64,
    pub refresh_token: SecretString,
}

#[derive(Deserialize)]
struct TokenPayload {
    access_token: String,
    expires_in: u64,
    refresh_token: String,
}

/// Builds the consent URL and exchanges authorization codes for tokens.
#[derive(Clone, Debug)]
pub struct OAuthClient {
    base_url: String,
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    scopes: Vec<Scope>,
    client: reqwest::Client,
}

impl OAuthClient {
    /// Create a client from `config`. Client id, client secret, redirect URI
    /// and at least one scope are required.
    pub fn new(config: &Config) -> Result<Self, HealthPlanetError> {
        let client_id = config
            .client_id
            .clone()
            .ok_or_else(|| missing("client_id"))?;
        let client_secret = config
            .client_secret
            .clone()
            .ok_or_else(|| missing("client_secret"))?;
        let redirect_uri = config
            .redirect_uri
            .clone()
            .ok_or_else(|| missing("redirect_uri"))?;
        if config.scopes.is_empty() {
            return Err(missing("scopes"));
        }
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            redirect_uri,
            scopes: config.scopes.clone(),
            client: build_http_client()?,
        })
    }

    /// URL the user opens in a browser to grant access.
    pub fn auth_uri(&self) -> Result<String, HealthPlanetError> {
        let scope = self
            .scopes
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let url = reqwest::Url::parse_with_params(
            &format!("{}{}", self.base_url, AUTH_PATH),
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("response_type", "code"),
            ],
        )
        .map_err(|e| HealthPlanetError::Config(format!("invalid base url: {e}")))?;
        Ok(url.to_string())
    }

    /// Exchange the code from the redirect for an access token.
    ///
    /// An `error` field in the reply is returned as [`HealthPlanetError::OAuth`]
    /// carrying the service's message.
    pub async fn exchange_token(&self, code: &str) -> Result<AccessToken, HealthPlanetError> {
        let url = format!("{}{}", self.base_url, TOKEN_PATH);
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];
        let (status, body) = post_form(&self.client, &url, &params).await?;

        let value: serde_json::Value = match decode_json(&body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => return Err(error_from_status(status, &body)),
            Err(e) => return Err(e),
        };
        if let Some(error) = value.get("error") {
            let message = match error {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            tracing::warn!(status = status.as_u16(), error = %message, "token exchange rejected");
            return Err(HealthPlanetError::OAuth(format!(
                "exchange_token: {message}"
            )));
        }
        if !status.is_success() {
            return Err(error_from_status(status, &body));
        }

        let payload: TokenPayload =
            serde_json::from_value(value).map_err(|source| HealthPlanetError::MalformedResponse {
                source,
                body,
            })?;
        tracing::debug!(expires_in = payload.expires_in, "access token issued");
        Ok(AccessToken {
            access_token: SecretString::new(payload.access_token.into()),
            expires_in: payload.expires_in,
            refresh_token: SecretString::new(payload.refresh_token.into()),
        })
    }
}

fn missing(param: &str) -> HealthPlanetError {
    HealthPlanetError::Config(format!("param '{param}' is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            client_id: Some("hoge_client_id".into()),
            client_secret: Some(SecretString::new("hoge_client_secret".into())),
            redirect_uri: Some("hoge_redirect_uri".into()),
            scopes: vec![Scope::Innerscan],
            ..Config::default()
        }
    }

    #[test]
    fn auth_uri_has_fixed_parameter_order() {
        let auth = OAuthClient::new(&config()).unwrap();
        assert_eq!(
            auth.auth_uri().unwrap(),
            "https://www.healthplanet.jp/oauth/auth?client_id=hoge_client_id&redirect_uri=hoge_redirect_uri&scope=innerscan&response_type=code"
        );
    }

    #[test]
    fn auth_uri_joins_scopes_with_commas() {
        let cfg = Config {
            scopes: vec![Scope::Innerscan, Scope::Pedometer],
            redirect_uri: Some("https://example.com/cb".into()),
            ..config()
        };
        let uri = OAuthClient::new(&cfg).unwrap().auth_uri().unwrap();
        assert!(uri.contains("scope=innerscan%2Cpedometer"));
        assert!(uri.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fcb"));
    }

    #[test]
    fn missing_parameters_are_configuration_errors() {
        for cfg in [
            Config {
                client_id: None,
                ..config()
            },
            Config {
                client_secret: None,
                ..config()
            },
            Config {
                redirect_uri: None,
                ..config()
            },
            Config {
                scopes: vec![],
                ..config()
            },
        ] {
            assert!(matches!(
                OAuthClient::new(&cfg),
                Err(HealthPlanetError::Config(_))
            ));
        }
    }

    #[test]
    fn debug_hides_client_secret() {
        let auth = OAuthClient::new(&config()).unwrap();
        assert!(!format!("{auth:?}").contains("hoge_client_secret"));
    }
}
