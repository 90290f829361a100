//! Declarative resources managed by pkgsource
//!
//! Each resource implements [`declarative::Resource`]: read the current
//! state, test it against the desired state, set it to converge.

pub mod error;
pub mod package_source;
pub mod well_known;

pub use error::ReconcileError;
pub use package_source::{DesiredState, ObservedState, SourceReconciler};
pub use well_known::{ConvergenceStrategy, WellKnownSources};
