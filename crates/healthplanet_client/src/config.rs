use crate::HealthPlanetError;
use crate::schema::Scope;
use secrecy::SecretString;

pub const DEFAULT_BASE_URL: &str = "https://www.healthplanet.jp";

/// Credentials and defaults shared by [`crate::OAuthClient`] and
/// [`crate::http_client::ReqwestHealthPlanetClient`].
///
/// Values are read when a client is constructed; changing the config later
/// does not affect clients that already exist.
#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    pub redirect_uri: Option<String>,
    pub access_token: Option<SecretString>,
    pub scopes: Vec<Scope>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            access_token: None,
            scopes: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, HealthPlanetError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, HealthPlanetError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let base_url = non_empty(get("HEALTHPLANET_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();
        let scopes = match non_empty(get("HEALTHPLANET_SCOPES")) {
            Some(list) => list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<Scope>())
                .collect::<Result<Vec<Scope>, _>>()?,
            None => Vec::new(),
        };
        let redirect_uri = non_empty(get("HEALTHPLANET_REDIRECT_URI"))
            .unwrap_or_else(|| format!("{base_url}/success.html"));

        Ok(Self {
            base_url,
            client_id: non_empty(get("HEALTHPLANET_CLIENT_ID")),
            client_secret: non_empty(get("HEALTHPLANET_CLIENT_SECRET"))
                .map(|s| SecretString::new(s.into())),
            redirect_uri: Some(redirect_uri),
            access_token: non_empty(get("HEALTHPLANET_ACCESS_TOKEN"))
                .map(|s| SecretString::new(s.into())),
            scopes,
        })
    }
}
