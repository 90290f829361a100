//! Resource trait for declarative state management
//!
//! A Resource knows how to read the current state of something on the host,
//! decide whether it matches a desired state, and change it to match.

use crate::context::ApplyContext;
use crate::diff::TestOutcome;
use crate::types::ApplyResult;
use anyhow::Result;
use std::fmt;

/// The three-operation contract used by configuration hosts
///
/// The host decides call ordering: `get` reports drift, `test` decides
/// whether `set` is needed, and `set` converges. Resources do not re-read
/// state after `set`; the host is expected to call `test` again.
///
/// # Example
///
/// ```ignore
/// use declarative::{ApplyContext, ApplyResult, Drift, Presence, Resource, TestOutcome};
///
/// #[derive(Debug)]
/// struct FileResource;
///
/// impl Resource for FileResource {
///     type Desired = (String, Presence);
///     type Observed = Presence;
///
///     fn resource_type(&self) -> &'static str {
///         "file"
///     }
///
///     fn get(&self, desired: &Self::Desired) -> anyhow::Result<Presence> {
///         Ok(if std::path::Path::new(&desired.0).exists() {
///             Presence::Present
///         } else {
///             Presence::Absent
///         })
///     }
///
///     fn test(&self, desired: &Self::Desired) -> anyhow::Result<TestOutcome<Presence>> {
///         let observed = self.get(desired)?;
///         let mut outcome = TestOutcome::matched(observed);
///         if observed != desired.1 {
///             outcome.drift.push(Drift::new("Presence", desired.1, Some(observed)));
///         }
///         Ok(outcome)
///     }
///
///     fn set(&self, desired: &Self::Desired, ctx: &ApplyContext) -> anyhow::Result<ApplyResult> {
///         if ctx.dry_run {
///             return Ok(ApplyResult::Skipped { reason: "what-if".into() });
///         }
///         std::fs::write(&desired.0, "")?;
///         Ok(ApplyResult::Created)
///     }
/// }
/// ```
pub trait Resource: fmt::Debug {
    /// Desired-state document supplied by the host
    type Desired;

    /// Observed-state document returned to the host
    type Observed;

    /// Resource type name (e.g., "PackageSource")
    fn resource_type(&self) -> &'static str;

    /// Read the current state of the resource keyed by `desired`
    fn get(&self, desired: &Self::Desired) -> Result<Self::Observed>;

    /// Compare current state with `desired`
    fn test(&self, desired: &Self::Desired) -> Result<TestOutcome<Self::Observed>>;

    /// Change the system so it matches `desired`
    fn set(&self, desired: &Self::Desired, ctx: &ApplyContext) -> Result<ApplyResult>;

    /// Check if the resource needs changes to reach desired state
    fn needs_apply(&self, desired: &Self::Desired) -> Result<bool> {
        Ok(!self.test(desired)?.is_match())
    }
}
