//! Errors raised while converging a package source

use thiserror::Error;

/// A registry call made by `set` failed
///
/// Both variants are fatal to the apply; nothing is retried or rolled back.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Registration (or the gallery update) failed
    #[error("failed to register package source '{name}': {source}")]
    RegistrationFailed {
        name: String,
        source: sourcekit::Error,
    },

    /// Unregistration failed
    #[error("failed to unregister package source '{name}': {source}")]
    UnregistrationFailed {
        name: String,
        source: sourcekit::Error,
    },
}

impl ReconcileError {
    /// Name of the source the failed call targeted
    pub fn name(&self) -> &str {
        match self {
            Self::RegistrationFailed { name, .. } | Self::UnregistrationFailed { name, .. } => name,
        }
    }

    /// The registry error behind this failure
    pub fn registry_error(&self) -> &sourcekit::Error {
        match self {
            Self::RegistrationFailed { source, .. } | Self::UnregistrationFailed { source, .. } => {
                source
            }
        }
    }
}
