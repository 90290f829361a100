//! Error types for package-source registry operations.
//!
//! Errors are categorized from the registry's own output so callers can
//! give the operator a useful hint. Nothing here is retried.

use thiserror::Error;

/// Categories of registry errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Source or provider lookup found nothing
    NotFound,
    /// Network-related failure while contacting the source
    Network,
    /// Access denied (needs elevation or a credential)
    Permission,
    /// The requested package provider is not installed
    ProviderMissing,
    /// No PowerShell executable could be located
    PowerShellNotFound,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Source not found",
            Self::Network => "Network connectivity issue",
            Self::Permission => "Permission denied",
            Self::ProviderMissing => "Package provider not available",
            Self::PowerShellNotFound => "PowerShell not installed",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "Verify the source name, provider and location",
            Self::Network => "Check that the source location is reachable",
            Self::Permission => "Run elevated or supply a credential for the source",
            Self::ProviderMissing => "Install the provider with Install-PackageProvider",
            Self::PowerShellNotFound => "Install PowerShell 7 from https://aka.ms/powershell",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No source or provider matched
    #[error("not found: {message}")]
    NotFound {
        /// Registry output describing what was missing
        message: String,
    },

    /// Network failure while resolving the source location
    #[error("network error: {message}")]
    Network {
        /// Detailed error message
        message: String,
    },

    /// Access denied
    #[error("permission denied: {message}")]
    Permission {
        /// Details about what permission was denied
        message: String,
    },

    /// The provider is not installed and could not be bootstrapped
    #[error("package provider '{provider}' is not available")]
    ProviderMissing {
        /// Provider name from the request
        provider: String,
    },

    /// PowerShell is not installed or not found in PATH
    #[error("PowerShell not found. Install it from https://aka.ms/powershell")]
    PowerShellNotFound,

    /// The registry rejected the request
    #[error("{message}")]
    Rejected {
        /// Why the request was rejected
        message: String,
    },

    /// Command execution failed
    #[error("command failed: {message}")]
    CommandFailed {
        /// Description of what command failed
        message: String,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Network { .. } => ErrorCategory::Network,
            Error::Permission { .. } => ErrorCategory::Permission,
            Error::ProviderMissing { .. } => ErrorCategory::ProviderMissing,
            Error::PowerShellNotFound => ErrorCategory::PowerShellNotFound,
            _ => ErrorCategory::Other,
        }
    }

    /// Create an error from PowerShell's error stream.
    ///
    /// Analyzes stderr to categorize the error appropriately.
    pub fn from_pwsh_output(stderr: &str, provider_name: Option<&str>) -> Self {
        let lower = stderr.to_lowercase();

        let no_provider_match =
            "no match was found for the specified search criteria for the provider";
        if lower.contains("unable to find package provider")
            || lower.contains(no_provider_match)
            || lower.contains("provider is not installed")
        {
            return Error::ProviderMissing {
                provider: provider_name.unwrap_or("unknown").to_string(),
            };
        }

        if lower.contains("unable to resolve")
            || lower.contains("could not be resolved")
            || lower.contains("unable to connect")
            || lower.contains("the remote name could not be resolved")
            || lower.contains("timed out")
            || lower.contains("ssl")
            || lower.contains("certificate")
        {
            return Error::Network {
                message: stderr.trim().to_string(),
            };
        }

        if lower.contains("access is denied")
            || lower.contains("access denied")
            || lower.contains("administrator rights")
            || lower.contains("unauthorizedaccess")
            || lower.contains("401")
        {
            return Error::Permission {
                message: stderr.trim().to_string(),
            };
        }

        if lower.contains("no match was found")
            || lower.contains("unable to find")
            || lower.contains("does not exist")
        {
            return Error::NotFound {
                message: stderr.trim().to_string(),
            };
        }

        Error::CommandFailed {
            message: format!(
                "PowerShell command failed{}",
                provider_name
                    .map(|p| format!(" for provider {p}"))
                    .unwrap_or_default()
            ),
            stderr: stderr.trim().to_string(),
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;
