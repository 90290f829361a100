//! Well-known sources that the registry cannot converge the generic way
//!
//! The default gallery cannot be registered from a blank slate with an
//! explicit location, and once registered its policy is changed through a
//! dedicated primitive. Names listed here get that treatment.

use serde::{Deserialize, Serialize};

/// How a well-known source is converged to Present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConvergenceStrategy {
    /// Update in place when registered, otherwise register without a location
    GalleryUpdate,
}

/// Name of the default PowerShell gallery
pub const PSGALLERY: &str = "PSGallery";

/// Table of well-known source names, matched case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellKnownSources {
    entries: Vec<(String, ConvergenceStrategy)>,
}

impl Default for WellKnownSources {
    fn default() -> Self {
        Self::empty().with(PSGALLERY, ConvergenceStrategy::GalleryUpdate)
    }
}

impl WellKnownSources {
    /// A table with no special names
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add (or replace) a name
    pub fn with(mut self, name: &str, strategy: ConvergenceStrategy) -> Self {
        self.insert(name, strategy);
        self
    }

    /// Add (or replace) a name in place
    pub fn insert(&mut self, name: &str, strategy: ConvergenceStrategy) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.entries.push((name.to_string(), strategy));
    }

    /// Strategy for `name`, if it is well-known
    pub fn strategy_for(&self, name: &str) -> Option<ConvergenceStrategy> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, s)| *s)
    }

    /// Names in the table
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_contains_gallery() {
        let table = WellKnownSources::default();
        assert_eq!(
            table.strategy_for("psgallery"),
            Some(ConvergenceStrategy::GalleryUpdate)
        );
        assert_eq!(
            table.strategy_for("PSGALLERY"),
            Some(ConvergenceStrategy::GalleryUpdate)
        );
        assert_eq!(table.strategy_for("PSGallery2"), None);
    }

    #[test]
    fn test_insert_replaces_case_insensitively() {
        let mut table = WellKnownSources::default();
        table.insert("psgallery", ConvergenceStrategy::GalleryUpdate);
        table.insert("InternalGallery", ConvergenceStrategy::GalleryUpdate);
        assert_eq!(table.names().count(), 2);
        assert!(table.strategy_for("internalgallery").is_some());
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(WellKnownSources::empty().strategy_for(PSGALLERY), None);
    }

    #[test]
    fn test_strategy_deserializes_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            s: ConvergenceStrategy,
        }
        let wrapper: Wrapper = toml::from_str("s = 'gallery-update'").unwrap();
        assert_eq!(wrapper.s, ConvergenceStrategy::GalleryUpdate);
    }
}
