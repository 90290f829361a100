//! # Declarative
//!
//! The get/test/set contract for declarative configuration resources.
//!
//! ## Core Concepts
//!
//! - **Resource**: Something on the host with state a configuration host manages
//! - **Presence**: Whether the resource should exist
//! - **TestOutcome**: Observed state plus the list of drifted properties
//! - **ApplyResult**: What `set` did
//!
//! ## Collaborators
//!
//! Resources never log or localize on their own. The host hands them a
//! [`MessageSink`]:
//!
//! - [`LogSink`]: forwards to the `log` facade
//! - [`CollectingSink`]: keeps messages in memory (tests, reports)
//! - [`Silent`]: drops everything

pub mod context;
pub mod diff;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{ApplyContext, CollectingSink, Level, LogSink, MessageSink, Silent};
pub use diff::{Drift, TestOutcome};
pub use resource::Resource;
pub use types::{ApplyResult, Presence};
