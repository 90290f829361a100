//! Core types for package-source registry operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether packages from a source may be installed without confirmation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustPolicy {
    /// Packages install without prompting or validation
    Trusted,
    /// Packages require confirmation before install
    #[default]
    Untrusted,
}

impl TrustPolicy {
    /// Map a registry trust flag to a policy.
    pub fn from_flag(is_trusted: bool) -> Self {
        if is_trusted {
            Self::Trusted
        } else {
            Self::Untrusted
        }
    }

    /// The registry trust flag for this policy.
    pub fn is_trusted(self) -> bool {
        matches!(self, Self::Trusted)
    }

    /// Name of the policy as used by PowerShellGet's `-InstallationPolicy`.
    pub fn installation_policy(self) -> &'static str {
        match self {
            Self::Trusted => "Trusted",
            Self::Untrusted => "Untrusted",
        }
    }
}

impl fmt::Display for TrustPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.installation_policy())
    }
}

/// Opaque credential handed through to registration calls.
///
/// The secret never appears in `Debug` output and the type is not
/// serializable, so it cannot leak into reported state.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    #[serde(rename = "UserName", alias = "username")]
    user_name: String,
    #[serde(rename = "Password", alias = "password")]
    password: String,
}

impl Credential {
    /// Create a credential from a user name and secret.
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
        }
    }

    /// The user name.
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// The secret. Only backends should call this.
    pub fn expose_password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user_name", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A source as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceEntry {
    /// Registered source name
    pub name: String,
    /// Location the registry reports (may differ in casing from the request)
    pub location: String,
    /// Provider owning the source
    pub provider_name: String,
    /// Whether the registry marks the source as active
    pub is_registered: bool,
    /// Whether the registry trusts packages from the source
    pub is_trusted: bool,
}

impl SourceEntry {
    /// Trust policy derived from the registry flag.
    pub fn trust_policy(&self) -> TrustPolicy {
        TrustPolicy::from_flag(self.is_trusted)
    }
}

/// Lookup key for `query_sources`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    /// Source name
    pub name: String,
    /// Provider name
    pub provider_name: String,
    /// Source location
    pub location: String,
    /// Let the provider install missing bootstrap components
    pub force_bootstrap: bool,
}

impl SourceQuery {
    /// Create a query for the given identity triple.
    pub fn new(
        name: impl Into<String>,
        provider_name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider_name: provider_name.into(),
            location: location.into(),
            force_bootstrap: true,
        }
    }

    /// Set whether the provider may bootstrap itself.
    pub fn with_force_bootstrap(mut self, force: bool) -> Self {
        self.force_bootstrap = force;
        self
    }
}

/// Arguments for registering a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Source name
    pub name: String,
    /// Provider name
    pub provider_name: String,
    /// Source location; `None` lets the provider pick its built-in default
    pub location: Option<String>,
    /// Optional credential for the source
    pub credential: Option<Credential>,
    /// Registry trust flag
    pub trusted: bool,
    /// Overwrite an existing registration without prompting
    pub force: bool,
}

impl RegisterRequest {
    /// Drop the location so the provider uses its default for this name.
    pub fn without_location(mut self) -> Self {
        self.location = None;
        self
    }
}

/// Arguments for unregistering a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnregisterRequest {
    /// Source name
    pub name: String,
    /// Provider name
    pub provider_name: String,
    /// Source location
    pub location: Option<String>,
    /// Optional credential for the source
    pub credential: Option<Credential>,
    /// Skip confirmation prompts
    pub force: bool,
}

/// Arguments for the gallery-specific policy update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryUpdate {
    /// Gallery name
    pub name: String,
    /// Gallery location
    pub location: String,
    /// Policy to apply
    pub trust_policy: TrustPolicy,
}

/// Compare two source locations the way registries treat them.
///
/// Case-insensitive over all of Unicode, ignoring trailing slashes.
pub fn same_location(a: &str, b: &str) -> bool {
    a.trim_end_matches('/').to_lowercase() == b.trim_end_matches('/').to_lowercase()
}
