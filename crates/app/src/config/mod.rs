//! Client configuration

use std::{fs, io, path::PathBuf};

use clap::Args;
use storefront::checkout::{LocationCatalog, LocationCatalogError};
use thiserror::Error;

pub mod api;
pub mod logging;
pub mod session;

pub use api::ApiConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use session::SessionConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read location catalog {path}")]
    LocationsFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid location catalog")]
    Locations(#[from] LocationCatalogError),
}

/// Settings shared by every command.
#[derive(Debug, Clone, Args)]
pub struct StorefrontConfig {
    /// Backend API settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Persisted session settings.
    #[command(flatten)]
    pub session: SessionConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// YAML file replacing the built-in province/district/ward catalog
    #[arg(long, env = "STOREFRONT_LOCATIONS", global = true)]
    pub locations: Option<PathBuf>,
}

impl StorefrontConfig {
    /// The location catalog used to validate shipping forms.
    ///
    /// # Errors
    ///
    /// Returns an error when the override file cannot be read or parsed.
    pub fn location_catalog(&self) -> Result<LocationCatalog, ConfigError> {
        let Some(path) = &self.locations else {
            return Ok(LocationCatalog::builtin()?);
        };

        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::LocationsFile {
            path: path.clone(),
            source,
        })?;

        Ok(LocationCatalog::from_yaml(&yaml)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        config: StorefrontConfig,
    }

    fn parse(args: &[&str]) -> Result<StorefrontConfig, clap::Error> {
        let mut argv = vec!["storefront"];
        argv.extend_from_slice(args);

        Cli::try_parse_from(argv).map(|cli| cli.config)
    }

    #[test]
    fn explicit_flags_are_parsed() -> TestResult {
        let config = parse(&[
            "--api-url",
            "https://shop.example/api",
            "--session-file",
            "/tmp/session.json",
            "--log-level",
            "debug",
            "--log-format",
            "json",
        ])?;

        assert_eq!(config.api.api_url.as_str(), "https://shop.example/api");
        assert_eq!(config.session.session_file, PathBuf::from("/tmp/session.json"));
        assert_eq!(config.logging.log_level, "debug");
        assert!(
            matches!(config.logging.log_format, LogFormat::Json),
            "expected json format, got {:?}",
            config.logging.log_format
        );

        Ok(())
    }

    #[test]
    fn malformed_api_url_is_rejected() {
        let result = parse(&["--api-url", "not a url"]);

        assert!(
            matches!(&result, Err(error) if error.kind() == clap::error::ErrorKind::ValueValidation),
            "expected a value validation error, got {result:?}"
        );
    }

    #[test]
    fn location_override_is_loaded() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            "provinces:\n  - code: \"01\"\n    name: Hà Nội\n    districts:\n      - code: \"001\"\n        name: Ba Đình\n        wards:\n          - code: \"00001\"\n            name: Phúc Xá"
        )?;

        let path = file.path().to_string_lossy().into_owned();
        let config = parse(&["--locations", &path])?;

        let catalog = config.location_catalog()?;

        assert_eq!(catalog.provinces().len(), 1, "expected one province");
        let ward = catalog
            .province("01")
            .and_then(|province| province.district("001"))
            .and_then(|district| district.ward("00001"));
        assert!(ward.is_some(), "expected the overridden ward to resolve");

        Ok(())
    }
}
