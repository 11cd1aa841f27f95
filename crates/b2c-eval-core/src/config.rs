//! Sandbox connection configuration.

use serde::{Deserialize, Serialize};

/// Code version probed and debugged when none is configured.
pub const DEFAULT_CODE_VERSION: &str = "version1";

/// Site targeted by the storefront trigger when none is configured.
pub const DEFAULT_SITE_ID: &str = "RefArch";

/// Locale segment used by the trigger's fallback request.
pub const DEFAULT_LOCALE: &str = "default";

/// Connection details for one B2C Commerce sandbox.
///
/// Credentials may be a username/password pair, a client-id/secret pair, or
/// both; resolution order lives in [`crate::auth::Credentials::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Sandbox hostname, e.g. `dev01-eu01-project.demandware.net`.
    pub hostname: String,

    /// Business Manager username.
    #[serde(default)]
    pub username: Option<String>,
    /// Business Manager password / WebDAV access key.
    #[serde(default)]
    pub password: Option<String>,

    /// OCAPI client id.
    #[serde(default)]
    pub client_id: Option<String>,
    /// OCAPI client secret.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Active code version on the sandbox.
    #[serde(default = "default_code_version")]
    pub code_version: String,
}

fn default_code_version() -> String {
    DEFAULT_CODE_VERSION.to_string()
}

impl ConnectionConfig {
    /// Create a config with just a hostname; credentials are filled in with
    /// the builder-style setters.
    #[must_use]
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            username: None,
            password: None,
            client_id: None,
            client_secret: None,
            code_version: default_code_version(),
        }
    }

    /// Set Business Manager credentials.
    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the OCAPI client pair.
    #[must_use]
    pub fn with_client_pair(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self.client_secret = Some(secret.into());
        self
    }

    /// Override the code version.
    #[must_use]
    pub fn with_code_version(mut self, version: impl Into<String>) -> Self {
        self.code_version = version.into();
        self
    }
}

/// Reduce a site id to its bare form.
///
/// Business Manager and log files render site ids as `Sites-X-Site`; the
/// storefront URL space wants the bare `X`. Accept either form.
#[must_use]
pub fn normalize_site_id(raw: &str) -> &str {
    raw.strip_prefix("Sites-")
        .and_then(|s| s.strip_suffix("-Site"))
        .unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_wrapped_site_id() {
        assert_eq!(normalize_site_id("Sites-RefArchGlobal-Site"), "RefArchGlobal");
    }

    #[test]
    fn test_normalize_bare_site_id() {
        assert_eq!(normalize_site_id("RefArchGlobal"), "RefArchGlobal");
    }

    #[test]
    fn test_normalize_prefix_only_left_alone() {
        // Half-wrapped ids are passed through untouched.
        assert_eq!(normalize_site_id("Sites-RefArch"), "Sites-RefArch");
    }

    #[test]
    fn test_builder_setters() {
        let config = ConnectionConfig::new("sandbox.demandware.net")
            .with_basic_auth("admin", "secret")
            .with_code_version("version2");
        assert_eq!(config.username.as_deref(), Some("admin"));
        assert_eq!(config.code_version, "version2");
        assert!(config.client_id.is_none());
    }
}
