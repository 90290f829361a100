//! Core types for declarative resource management

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a resource should exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Presence {
    /// Resource exists/is configured
    #[default]
    Present,
    /// Resource does not exist/is not configured
    Absent,
}

impl Presence {
    /// Check if this represents presence
    pub fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("Present"),
            Self::Absent => f.write_str("Absent"),
        }
    }
}

/// Result of applying a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// Resource was created
    Created,
    /// Resource was modified
    Modified,
    /// Resource was removed
    Removed,
    /// Apply was skipped
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created | Self::Modified | Self::Removed)
    }

    /// Short label for reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Modified => "Modified",
            Self::Removed => "Removed",
            Self::Skipped { .. } => "Skipped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_default_and_serde() {
        assert_eq!(Presence::default(), Presence::Present);
        assert_eq!(serde_json::to_string(&Presence::Absent).unwrap(), "\"Absent\"");
        let parsed: Presence = serde_json::from_str("\"Present\"").unwrap();
        assert!(parsed.is_present());
    }

    #[test]
    fn test_apply_result_is_change() {
        assert!(ApplyResult::Created.is_change());
        assert!(ApplyResult::Removed.is_change());
        let skipped = ApplyResult::Skipped {
            reason: "what-if".into(),
        };
        assert!(!skipped.is_change());
        assert_eq!(skipped.label(), "Skipped");
    }
}
