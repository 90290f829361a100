//! Test outcomes: what differs between observed and desired state

use serde::{Deserialize, Serialize};
use std::fmt;

/// One property whose observed value does not match the desired one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drift {
    /// Property name as the host knows it
    pub property: String,
    /// Desired value
    pub expected: String,
    /// Observed value, `None` when the property is not reported
    pub actual: Option<String>,
}

impl Drift {
    /// Create a drift record
    pub fn new(
        property: &str,
        expected: impl fmt::Display,
        actual: Option<impl fmt::Display>,
    ) -> Self {
        Self {
            property: property.to_string(),
            expected: expected.to_string(),
            actual: actual.map(|a| a.to_string()),
        }
    }
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected '{}', found '{}'",
            self.property,
            self.expected,
            self.actual.as_deref().unwrap_or("<none>")
        )
    }
}

/// Outcome of testing a resource: the observed state plus every drift found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome<O> {
    /// State read from the system
    pub observed: O,
    /// Properties that differ; empty means in desired state
    pub drift: Vec<Drift>,
}

impl<O> TestOutcome<O> {
    /// Outcome with no drift
    pub fn matched(observed: O) -> Self {
        Self {
            observed,
            drift: Vec::new(),
        }
    }

    /// Whether observed state satisfies the desired state
    pub fn is_match(&self) -> bool {
        self.drift.is_empty()
    }

    /// Names of the differing properties, in detection order
    pub fn differing_properties(&self) -> Vec<&str> {
        self.drift.iter().map(|d| d.property.as_str()).collect()
    }

    /// Drift record for a property, if that property differs
    pub fn drift_for(&self, property: &str) -> Option<&Drift> {
        self.drift.iter().find(|d| d.property == property)
    }
}
