//! Credential resolution for WebDAV and the Script Debugger API.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::config::ConnectionConfig;
use crate::error::EvalError;

/// Resolved authentication context.
///
/// Both remote surfaces (the WebDAV existence probe and the SDAPI control
/// API) accept HTTP Basic, so one resolved pair serves both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Business Manager username + password.
    Basic { username: String, password: String },
    /// OCAPI client id + secret, used as an equivalent Basic pair.
    ClientPair { client_id: String, client_secret: String },
}

impl Credentials {
    /// Resolve credentials from a connection config.
    ///
    /// Username/password wins when both pairs are configured. Resolution runs
    /// before any remote call: even when the cartridge probe is skipped, the
    /// debugger API itself always requires auth.
    ///
    /// # Errors
    /// Returns [`EvalError::MissingCredentials`] when neither pair is present.
    pub fn resolve(config: &ConnectionConfig) -> Result<Self, EvalError> {
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            return Ok(Self::Basic {
                username: username.clone(),
                password: password.clone(),
            });
        }
        if let (Some(client_id), Some(client_secret)) = (&config.client_id, &config.client_secret) {
            return Ok(Self::ClientPair {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            });
        }
        Err(EvalError::MissingCredentials)
    }

    /// Render the `Authorization` header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        let pair = match self {
            Self::Basic { username, password } => format!("{username}:{password}"),
            Self::ClientPair {
                client_id,
                client_secret,
            } => format!("{client_id}:{client_secret}"),
        };
        format!("Basic {}", BASE64.encode(pair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_pair_preferred() {
        let config = ConnectionConfig::new("host")
            .with_basic_auth("admin", "pw")
            .with_client_pair("cid", "cs");
        let creds = Credentials::resolve(&config).unwrap();
        assert!(matches!(creds, Credentials::Basic { .. }));
    }

    #[test]
    fn test_client_pair_fallback() {
        let config = ConnectionConfig::new("host").with_client_pair("cid", "cs");
        let creds = Credentials::resolve(&config).unwrap();
        // base64("cid:cs")
        assert_eq!(creds.authorization_header(), "Basic Y2lkOmNz");
    }

    #[test]
    fn test_missing_credentials_message() {
        let err = Credentials::resolve(&ConnectionConfig::new("host")).unwrap_err();
        assert_eq!(err.to_string(), "No authentication credentials available");
    }

    #[test]
    fn test_header_encoding() {
        let creds = Credentials::Basic {
            username: "admin".into(),
            password: "secret".into(),
        };
        // base64("admin:secret")
        assert_eq!(creds.authorization_header(), "Basic YWRtaW46c2VjcmV0");
    }
}
