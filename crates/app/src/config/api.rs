//! API Config

use clap::Args;
use url::Url;

/// Backend API settings.
#[derive(Debug, Clone, Args)]
pub struct ApiConfig {
    /// Base URL of the storefront REST API
    #[arg(
        long,
        env = "STOREFRONT_API_URL",
        default_value = "http://localhost:5000/api/",
        global = true
    )]
    pub api_url: Url,
}
