//! # sourcekit
//!
//! Pure Rust interface to package-source registries.
//!
//! This crate provides:
//! - The [`Backend`] trait: query, register, unregister and the
//!   gallery-specific policy update
//! - [`PowerShellBackend`], which drives PackageManagement/PowerShellGet
//! - [`MemoryBackend`], an in-process registry for tests
//! - Categorized [`Error`]s built from the registry's own output
//!
//! ## Example
//!
//! ```no_run
//! use sourcekit::{Backend, PowerShellBackend, SourceQuery};
//!
//! let backend = PowerShellBackend::new().expect("PowerShell not available");
//! let gallery = "https://www.powershellgallery.com/api/v2";
//! let query = SourceQuery::new("PSGallery", "PowerShellGet", gallery);
//! for source in backend.query_sources(&query).expect("query failed") {
//!     println!("{} -> {} (trusted: {})", source.name, source.location, source.is_trusted);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod types;

pub use backend::Backend;
pub use backend::memory::{Call, MemoryBackend, Operation, PSGALLERY_LOCATION};
pub use backend::pwsh::PowerShellBackend;
pub use error::{Error, ErrorCategory, Result};
pub use types::{
    Credential, GalleryUpdate, RegisterRequest, SourceEntry, SourceQuery, TrustPolicy,
    UnregisterRequest, same_location,
};
