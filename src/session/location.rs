use cookie::Cookie;
use http::header::{HeaderMap, COOKIE};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::id::SessionId;

/// Where the session identifier travels between client and server.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionIdLocation {
    /// A cookie with the given name.
    Cookie { name: String },
    /// A request/response header with the given name.
    Header { name: String },
}

impl SessionIdLocation {
    pub fn name(&self) -> &str {
        match self {
            SessionIdLocation::Cookie { name } | SessionIdLocation::Header { name } => name,
        }
    }

    /// Extracts the session identifier from incoming request headers.
    ///
    /// Returns `None` when the configured cookie/header is absent or does not
    /// carry a well-formed identifier.
    pub fn read(&self, headers: &HeaderMap) -> Option<SessionId> {
        let raw = match self {
            SessionIdLocation::Cookie { name } => headers
                .get_all(COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .flat_map(Cookie::split_parse)
                .filter_map(Result::ok)
                .find(|cookie| cookie.name() == name)
                .map(|cookie| cookie.value().to_string()),
            SessionIdLocation::Header { name } => headers
                .get(name.as_str())
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        }?;

        let id = SessionId::parse(&raw);
        if id.is_none() {
            debug!("Ignoring malformed session identifier in '{}'", self.name());
        }
        id
    }
}
