use std::time::Duration;

use cookie::SameSite;
use http::HeaderName;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::session::SessionIdLocation;

fn default_expiry_in_s() -> u64 {
    3600
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

/// Session settings. Loaded once at startup and shared read-only by every request.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct SessionConfig {
    /// Cookie or header carrying the session identifier.
    pub id_location: SessionIdLocation,
    /// Lifetime used by handlers that do not pick their own, in seconds.
    #[serde(default = "default_expiry_in_s")]
    pub default_expiry_in_s: u64,
    /// Attributes for the session cookie. Ignored for header locations.
    #[serde(default)]
    pub cookie: CookieConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct CookieConfig {
    #[serde(default = "default_cookie_path")]
    pub path: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_true")]
    pub http_only: bool,
    #[serde(default)]
    pub same_site: SameSitePolicy,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    Strict,
    #[default]
    Lax,
    None,
}

impl From<SameSitePolicy> for SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            path: default_cookie_path(),
            domain: None,
            secure: false,
            http_only: true,
            same_site: SameSitePolicy::Lax,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id_location: SessionIdLocation::Cookie {
                name: "SESSION_ID".to_string(),
            },
            default_expiry_in_s: default_expiry_in_s(),
            cookie: CookieConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn default_expiry(&self) -> Duration {
        Duration::from_secs(self.default_expiry_in_s)
    }

    /// Rejects names and attributes that could not be written to a response.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.id_location {
            SessionIdLocation::Cookie { name } => {
                if !is_cookie_token(name) {
                    return Err(ConfigError::Invalid(format!(
                        "session.id_location: '{}' is not a valid cookie name",
                        name
                    )));
                }
            }
            SessionIdLocation::Header { name } => {
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                    ConfigError::Invalid(format!(
                        "session.id_location: '{}' is not a valid header name",
                        name
                    ))
                })?;
            }
        }

        let attributes = [Some(&self.cookie.path), self.cookie.domain.as_ref()];
        if attributes
            .into_iter()
            .flatten()
            .any(|value| value.chars().any(|c| c == ';' || c.is_control()))
        {
            return Err(ConfigError::Invalid(
                "session.cookie: path and domain must not contain ';' or control characters"
                    .to_string(),
            ));
        }

        if self.cookie.same_site == SameSitePolicy::None && !self.cookie.secure {
            return Err(ConfigError::Invalid(
                "session.cookie: same_site 'none' requires secure = true".to_string(),
            ));
        }

        Ok(())
    }
}

/// RFC 6265 cookie-name: a token without separators.
fn is_cookie_token(name: &str) -> bool {
    const SEPARATORS: &str = "()<>@,;:\\\"/[]?={} \t";
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_graphic() && !SEPARATORS.contains(c))
}
