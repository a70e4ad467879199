//! Session Config

use std::path::PathBuf;

use clap::Args;

/// Persisted session settings.
#[derive(Debug, Clone, Args)]
pub struct SessionConfig {
    /// File holding the auth token, guest id and pending-payment snapshots
    #[arg(
        long,
        env = "STOREFRONT_SESSION_FILE",
        default_value = ".storefront/session.json",
        global = true
    )]
    pub session_file: PathBuf,
}
