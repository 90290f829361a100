//! Backend abstraction for package-source registries.
//!
//! The [`Backend`] trait defines the interface for querying and changing
//! registered sources, allowing for different implementations (the real
//! PowerShell registry, an in-memory registry for tests).

pub mod memory;
pub mod pwsh;

use crate::error::Result;
use crate::types::{GalleryUpdate, RegisterRequest, SourceEntry, SourceQuery, UnregisterRequest};

/// Backend trait for package-source registry operations.
///
/// Calls are blocking. Implementations own whatever concurrency guarantees
/// the underlying registry provides.
pub trait Backend: Send + Sync {
    /// Check if the registry can be reached at all.
    fn is_available(&self) -> bool;

    /// List sources matching the query.
    ///
    /// "No match" is an empty list, never an error.
    fn query_sources(&self, query: &SourceQuery) -> Result<Vec<SourceEntry>>;

    /// Register (or, with `force`, overwrite) a source.
    fn register_source(&self, request: &RegisterRequest) -> Result<()>;

    /// Remove a source registration.
    fn unregister_source(&self, request: &UnregisterRequest) -> Result<()>;

    /// Update the location and policy of an existing gallery registration.
    fn update_gallery_source(&self, update: &GalleryUpdate) -> Result<()>;
}

/// Get the default backend (PowerShell on PATH).
pub fn default_backend() -> Result<pwsh::PowerShellBackend> {
    pwsh::PowerShellBackend::new()
}
