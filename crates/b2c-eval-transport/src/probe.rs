//! Cartridge layout detection via WebDAV existence probes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use b2c_eval_core::{
    ConnectionConfig, Credentials, EvalError, HttpRequest, HttpTransport, Method, TransportError,
};

/// Default breakpoint line inside the entry controller.
///
/// Line 12 sits at the top of `Home-Show`'s route handler in both supported
/// layouts, so any storefront homepage request reaches it. Callers override
/// it per request when they target other code.
pub const DEFAULT_BREAKPOINT_LINE: u32 = 12;

/// Cap on a single existence probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// The two storefront code layouts the subsystem can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartridgeLayout {
    /// Storefront Reference Architecture (`app_storefront_base`).
    Sfra,
    /// Legacy SiteGenesis controllers (`app_storefront_controllers`).
    SiteGenesis,
}

impl CartridgeLayout {
    /// Fixed probe priority: the modern layout wins when both are deployed.
    pub const PROBE_ORDER: [Self; 2] = [Self::Sfra, Self::SiteGenesis];

    /// Marker path whose presence identifies the layout, relative to the
    /// cartridge root of a code version.
    #[must_use]
    pub const fn marker_path(self) -> &'static str {
        match self {
            Self::Sfra => "app_storefront_base/cartridge/controllers/Home.js",
            Self::SiteGenesis => "app_storefront_controllers/cartridge/controllers/Home.js",
        }
    }

    /// Default breakpoint script path for the layout, in SDAPI form.
    #[must_use]
    pub const fn default_breakpoint_file(self) -> &'static str {
        match self {
            Self::Sfra => "/app_storefront_base/cartridge/controllers/Home.js",
            Self::SiteGenesis => "/app_storefront_controllers/cartridge/controllers/Home.js",
        }
    }

    /// Human-readable name used in diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Sfra => "SFRA (app_storefront_base)",
            Self::SiteGenesis => "SiteGenesis (app_storefront_controllers)",
        }
    }
}

impl fmt::Display for CartridgeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Detects which supported layout is deployed on a sandbox.
///
/// Skipped entirely by the orchestrator when the caller pins an explicit
/// breakpoint file.
pub struct CartridgeProbe {
    transport: Arc<dyn HttpTransport>,
    hostname: String,
    code_version: String,
    authorization: String,
}

impl CartridgeProbe {
    /// Create a probe for one sandbox.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        config: &ConnectionConfig,
        credentials: &Credentials,
    ) -> Self {
        Self {
            transport,
            hostname: config.hostname.clone(),
            code_version: config.code_version.clone(),
            authorization: credentials.authorization_header(),
        }
    }

    /// Probe the markers in priority order; first hit wins.
    ///
    /// # Errors
    /// [`EvalError::CartridgeNotFound`] when neither marker exists,
    /// [`EvalError::Transport`] when a probe itself fails.
    pub async fn detect(&self) -> Result<CartridgeLayout, EvalError> {
        for layout in CartridgeLayout::PROBE_ORDER {
            if self.marker_exists(layout).await? {
                tracing::debug!(%layout, hostname = %self.hostname, "detected cartridge layout");
                return Ok(layout);
            }
        }
        Err(EvalError::CartridgeNotFound {
            hostname: self.hostname.clone(),
        })
    }

    async fn marker_exists(&self, layout: CartridgeLayout) -> Result<bool, TransportError> {
        let url = format!(
            "https://{}/on/demandware.servlet/webdav/Sites/Cartridges/{}/{}",
            self.hostname,
            self.code_version,
            layout.marker_path()
        );
        let request = HttpRequest::new(Method::Head, url.as_str())
            .with_authorization(self.authorization.as_str())
            .with_timeout(PROBE_TIMEOUT);
        let response = self.transport.execute(request).await?;
        match response.status {
            // 207 is WebDAV multi-status; servers answer it for PROPFIND-style
            // existence checks.
            200..=299 | 207 => Ok(true),
            404 => Ok(false),
            status => Err(TransportError::UnexpectedStatus { url, status }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use b2c_eval_core::HttpResponse;

    use super::*;

    struct MarkerHost {
        deployed: Vec<CartridgeLayout>,
        probed: Mutex<Vec<String>>,
    }

    impl MarkerHost {
        fn new(deployed: Vec<CartridgeLayout>) -> Arc<Self> {
            Arc::new(Self {
                deployed,
                probed: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for MarkerHost {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.probed.lock().unwrap().push(request.url.clone());
            let exists = self
                .deployed
                .iter()
                .any(|layout| request.url.ends_with(layout.marker_path()));
            Ok(HttpResponse::status_only(if exists { 200 } else { 404 }))
        }
    }

    fn probe_for(host: Arc<MarkerHost>) -> CartridgeProbe {
        let config = ConnectionConfig::new("sandbox.demandware.net").with_basic_auth("admin", "pw");
        let credentials = Credentials::resolve(&config).unwrap();
        CartridgeProbe::new(host, &config, &credentials)
    }

    #[tokio::test]
    async fn test_sfra_wins_when_both_deployed() {
        let host = MarkerHost::new(vec![CartridgeLayout::Sfra, CartridgeLayout::SiteGenesis]);
        let probe = probe_for(Arc::clone(&host));
        assert_eq!(probe.detect().await.unwrap(), CartridgeLayout::Sfra);
        // First hit wins: the legacy marker is never probed.
        assert_eq!(host.probed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_legacy_fallback() {
        let host = MarkerHost::new(vec![CartridgeLayout::SiteGenesis]);
        let probe = probe_for(Arc::clone(&host));
        assert_eq!(probe.detect().await.unwrap(), CartridgeLayout::SiteGenesis);
        assert_eq!(host.probed.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_neither_marker_found() {
        let host = MarkerHost::new(vec![]);
        let probe = probe_for(host);
        let err = probe.detect().await.unwrap_err();
        assert!(err.to_string().contains("No compatible storefront cartridge found"));
    }

    #[tokio::test]
    async fn test_probe_url_carries_code_version() {
        let host = MarkerHost::new(vec![CartridgeLayout::Sfra]);
        let config = ConnectionConfig::new("sandbox.demandware.net")
            .with_basic_auth("admin", "pw")
            .with_code_version("version42");
        let credentials = Credentials::resolve(&config).unwrap();
        let probe = CartridgeProbe::new(Arc::clone(&host) as Arc<dyn HttpTransport>, &config, &credentials);
        probe.detect().await.unwrap();
        assert!(host.probed.lock().unwrap()[0].contains("/Cartridges/version42/"));
    }
}
