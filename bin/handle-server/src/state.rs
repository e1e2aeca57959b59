//! Shared application state injected into every Axum handler.

use std::fmt;
use std::sync::Arc;

use handle_vendor::{VendorApi, VendorClient, VendorError};

use crate::config::Config;
use crate::error::ServerError;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Vendor client; `None` when no credential is configured.
    vendor: Option<Arc<dyn VendorApi>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("vendor_configured", &self.vendor.is_some())
            .finish()
    }
}

impl AppState {
    /// Build state from configuration, creating the HTTP vendor client when a
    /// credential is present.
    pub fn from_config(config: Config) -> Result<Self, VendorError> {
        let vendor = match config.api_token.as_deref() {
            Some(token) => {
                Some(Arc::new(VendorClient::new(&config.vendor_url, token)?) as Arc<dyn VendorApi>)
            }
            None => None,
        };
        Ok(Self::with_vendor(config, vendor))
    }

    pub fn with_vendor(config: Config, vendor: Option<Arc<dyn VendorApi>>) -> Self {
        Self { config: Arc::new(config), vendor }
    }

    pub fn vendor_configured(&self) -> bool {
        self.vendor.is_some()
    }

    /// The vendor client, or a configuration error when the credential is missing.
    pub fn vendor(&self) -> Result<&dyn VendorApi, ServerError> {
        self.vendor.as_deref().ok_or_else(|| {
            ServerError::Misconfigured("missing API token (set ASKHANDLE_API_TOKEN)".into())
        })
    }
}
