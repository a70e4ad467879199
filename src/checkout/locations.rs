//! Province / district / ward catalog used by the shipping form.

use serde::Deserialize;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("locations.yaml");

/// Errors raised while loading a location catalog.
#[derive(Debug, Error)]
pub enum LocationCatalogError {
    /// The document was not valid catalog YAML.
    #[error("invalid location catalog: {0}")]
    Parse(#[from] serde_norway::Error),

    /// The catalog had no provinces.
    #[error("location catalog has no provinces")]
    Empty,
}

/// A ward.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ward {
    /// Administrative code.
    pub code: String,

    /// Display name.
    pub name: String,
}

/// A district and its wards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct District {
    /// Administrative code.
    pub code: String,

    /// Display name.
    pub name: String,

    /// Wards in this district.
    #[serde(default)]
    pub wards: Vec<Ward>,
}

/// A province and its districts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Province {
    /// Administrative code.
    pub code: String,

    /// Display name.
    pub name: String,

    /// Districts in this province.
    #[serde(default)]
    pub districts: Vec<District>,
}

/// The selectable shipping locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocationCatalog {
    provinces: Vec<Province>,
}

impl LocationCatalog {
    /// Parse a catalog from YAML.
    ///
    /// # Errors
    ///
    /// - [`LocationCatalogError::Parse`]: the YAML does not describe a catalog.
    /// - [`LocationCatalogError::Empty`]: the catalog has no provinces.
    pub fn from_yaml(yaml: &str) -> Result<Self, LocationCatalogError> {
        let catalog: Self = serde_norway::from_str(yaml)?;

        if catalog.provinces.is_empty() {
            return Err(LocationCatalogError::Empty);
        }

        Ok(catalog)
    }

    /// The catalog shipped with the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded document fails to parse.
    pub fn builtin() -> Result<Self, LocationCatalogError> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// All provinces.
    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    /// Find a province by code or name.
    pub fn province(&self, key: &str) -> Option<&Province> {
        find(&self.provinces, key, |p| (&p.code, &p.name))
    }
}

impl Province {
    /// Find one of this province's districts by code or name.
    pub fn district(&self, key: &str) -> Option<&District> {
        find(&self.districts, key, |d| (&d.code, &d.name))
    }
}

impl District {
    /// Find one of this district's wards by code or name.
    pub fn ward(&self, key: &str) -> Option<&Ward> {
        find(&self.wards, key, |w| (&w.code, &w.name))
    }
}

fn find<'a, T>(
    entries: &'a [T],
    key: &str,
    keys: impl Fn(&'a T) -> (&'a String, &'a String),
) -> Option<&'a T> {
    let key = key.trim();

    if key.is_empty() {
        return None;
    }

    entries.iter().find(|&entry| {
        let (code, name) = keys(entry);

        code == key || name == key
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn builtin_catalog_parses() -> TestResult {
        let catalog = LocationCatalog::builtin()?;

        assert!(!catalog.provinces().is_empty(), "catalog should not be empty");

        Ok(())
    }

    #[test]
    fn lookups_accept_code_or_name() -> TestResult {
        let catalog = LocationCatalog::from_yaml(
            "provinces:\n  - code: \"79\"\n    name: Ho Chi Minh\n    districts:\n      - code: \"760\"\n        name: District 1\n        wards:\n          - code: \"26734\"\n            name: Ben Nghe\n",
        )?;

        let province = catalog.province("79").ok_or("province by code")?;
        let district = province.district("District 1").ok_or("district by name")?;

        assert_eq!(district.ward("26734").map(|w| w.name.as_str()), Some("Ben Nghe"));
        assert!(catalog.province("Ho Chi Minh").is_some());
        assert!(catalog.province("  ").is_none());

        Ok(())
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let result = LocationCatalog::from_yaml("provinces: []\n");

        assert!(
            matches!(result, Err(LocationCatalogError::Empty)),
            "expected Empty, got {result:?}"
        );
    }
}
