//! In-process registry backend.
//!
//! Behaves like PackageManagement for the cases the reconciler cares about:
//! forced registration overwrites, well-known names fall back to a built-in
//! location when none is given, and every call is journaled so tests can
//! assert which primitive ran.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{
    GalleryUpdate, RegisterRequest, SourceEntry, SourceQuery, UnregisterRequest, same_location,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Built-in location of the default PowerShell gallery.
pub const PSGALLERY_LOCATION: &str = "https://www.powershellgallery.com/api/v2";

/// A registry primitive, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `query_sources`
    Query,
    /// `register_source`
    Register,
    /// `unregister_source`
    Unregister,
    /// `update_gallery_source`
    UpdateGallery,
}

/// A journaled call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `query_sources` was called
    Query(SourceQuery),
    /// `register_source` was called
    Register(RegisterRequest),
    /// `unregister_source` was called
    Unregister(UnregisterRequest),
    /// `update_gallery_source` was called
    UpdateGallery(GalleryUpdate),
}

impl Call {
    /// The primitive this call used.
    pub fn operation(&self) -> Operation {
        match self {
            Call::Query(_) => Operation::Query,
            Call::Register(_) => Operation::Register,
            Call::Unregister(_) => Operation::Unregister,
            Call::UpdateGallery(_) => Operation::UpdateGallery,
        }
    }
}

#[derive(Default)]
struct MemoryState {
    sources: Vec<SourceEntry>,
    default_locations: HashMap<String, String>,
    failures: HashMap<Operation, String>,
    calls: Vec<Call>,
}

impl MemoryState {
    fn fail_if_injected(&self, operation: Operation) -> Result<()> {
        match self.failures.get(&operation) {
            Some(message) => Err(Error::Rejected {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Registry kept in memory.
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create an empty registry that knows the PSGallery default location.
    pub fn new() -> Self {
        Self::empty().with_default_location("PSGallery", PSGALLERY_LOCATION)
    }

    /// Create an empty registry with no built-in locations.
    pub fn empty() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Seed a source.
    pub fn with_source(self, entry: SourceEntry) -> Self {
        self.state().sources.push(entry);
        self
    }

    /// Give a name a built-in location used when registration omits one.
    pub fn with_default_location(self, name: &str, location: &str) -> Self {
        self.state()
            .default_locations
            .insert(name.to_lowercase(), location.to_string());
        self
    }

    /// Make every call to `operation` fail with `message`.
    pub fn fail_on(self, operation: Operation, message: &str) -> Self {
        self.state().failures.insert(operation, message.to_string());
        self
    }

    /// Snapshot of the registered sources.
    pub fn sources(&self) -> Vec<SourceEntry> {
        self.state().sources.clone()
    }

    /// Snapshot of the call journal.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Journaled calls that changed (or tried to change) the registry.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation() != Operation::Query)
            .collect()
    }

    /// Forget the call journal.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn same_source(entry: &SourceEntry, name: &str, provider_name: &str) -> bool {
    entry.name.eq_ignore_ascii_case(name)
        && entry.provider_name.eq_ignore_ascii_case(provider_name)
}

impl Backend for MemoryBackend {
    fn is_available(&self) -> bool {
        true
    }

    fn query_sources(&self, query: &SourceQuery) -> Result<Vec<SourceEntry>> {
        let mut state = self.state();
        state.calls.push(Call::Query(query.clone()));
        state.fail_if_injected(Operation::Query)?;

        Ok(state
            .sources
            .iter()
            .filter(|e| same_source(e, &query.name, &query.provider_name))
            .filter(|e| same_location(&e.location, &query.location))
            .cloned()
            .collect())
    }

    fn register_source(&self, request: &RegisterRequest) -> Result<()> {
        let mut state = self.state();
        state.calls.push(Call::Register(request.clone()));
        state.fail_if_injected(Operation::Register)?;

        let location = match &request.location {
            Some(location) => location.clone(),
            None => state
                .default_locations
                .get(&request.name.to_lowercase())
                .cloned()
                .ok_or_else(|| Error::Rejected {
                    message: format!("a location is required to register '{}'", request.name),
                })?,
        };

        let exists = state
            .sources
            .iter()
            .any(|e| same_source(e, &request.name, &request.provider_name));
        if exists && !request.force {
            return Err(Error::Rejected {
                message: format!("package source '{}' already exists", request.name),
            });
        }

        state
            .sources
            .retain(|e| !same_source(e, &request.name, &request.provider_name));
        state.sources.push(SourceEntry {
            name: request.name.clone(),
            location,
            provider_name: request.provider_name.clone(),
            is_registered: true,
            is_trusted: request.trusted,
        });
        Ok(())
    }

    fn unregister_source(&self, request: &UnregisterRequest) -> Result<()> {
        let mut state = self.state();
        state.calls.push(Call::Unregister(request.clone()));
        state.fail_if_injected(Operation::Unregister)?;

        let before = state.sources.len();
        state
            .sources
            .retain(|e| !same_source(e, &request.name, &request.provider_name));

        if state.sources.len() == before && !request.force {
            return Err(Error::NotFound {
                message: format!("Unable to find package source '{}'", request.name),
            });
        }
        Ok(())
    }

    fn update_gallery_source(&self, update: &GalleryUpdate) -> Result<()> {
        let mut state = self.state();
        state.calls.push(Call::UpdateGallery(update.clone()));
        state.fail_if_injected(Operation::UpdateGallery)?;

        let entry = state
            .sources
            .iter_mut()
            .find(|e| e.name.eq_ignore_ascii_case(&update.name))
            .ok_or_else(|| Error::NotFound {
                message: format!("Unable to find repository '{}'", update.name),
            })?;
        entry.location = update.location.clone();
        entry.is_trusted = update.trust_policy.is_trusted();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrustPolicy;

    fn register(name: &str, location: Option<&str>, trusted: bool, force: bool) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            provider_name: "NuGet".into(),
            location: location.map(String::from),
            credential: None,
            trusted,
            force,
        }
    }

    #[test]
    fn test_register_then_query() {
        let backend = MemoryBackend::new();
        backend
            .register_source(&register("Foo", Some("http://example/feed"), true, true))
            .unwrap();

        let found = backend
            .query_sources(&SourceQuery::new("foo", "nuget", "HTTP://EXAMPLE/FEED/"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location, "http://example/feed");
        assert!(found[0].is_registered);
        assert!(found[0].is_trusted);
    }

    #[test]
    fn test_query_without_match_is_empty() {
        let backend = MemoryBackend::new();
        let found = backend
            .query_sources(&SourceQuery::new("Foo", "NuGet", "http://example/feed"))
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_forced_register_overwrites() {
        let backend = MemoryBackend::new();
        backend
            .register_source(&register("Foo", Some("http://a"), false, true))
            .unwrap();
        backend
            .register_source(&register("Foo", Some("http://b"), true, true))
            .unwrap();

        let sources = backend.sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].location, "http://b");
        assert!(sources[0].is_trusted);
    }

    #[test]
    fn test_register_without_force_rejects_duplicate() {
        let backend = MemoryBackend::new();
        backend
            .register_source(&register("Foo", Some("http://a"), false, false))
            .unwrap();
        let err = backend
            .register_source(&register("Foo", Some("http://a"), false, false))
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_register_without_location_uses_default() {
        let backend = MemoryBackend::new();
        backend
            .register_source(&register("psgallery", None, false, true))
            .unwrap();
        assert_eq!(backend.sources()[0].location, PSGALLERY_LOCATION);

        let err = backend
            .register_source(&register("Other", None, false, true))
            .unwrap_err();
        assert!(err.to_string().contains("location is required"));
    }

    #[test]
    fn test_unregister_missing_source() {
        let backend = MemoryBackend::new();
        let mut request = UnregisterRequest {
            name: "Foo".into(),
            provider_name: "NuGet".into(),
            location: None,
            credential: None,
            force: false,
        };
        assert!(matches!(
            backend.unregister_source(&request),
            Err(Error::NotFound { .. })
        ));

        request.force = true;
        backend.unregister_source(&request).unwrap();
    }

    #[test]
    fn test_update_gallery_source() {
        let backend = MemoryBackend::new();
        backend
            .register_source(&register("PSGallery", None, false, true))
            .unwrap();
        backend
            .update_gallery_source(&GalleryUpdate {
                name: "PSGallery".into(),
                location: PSGALLERY_LOCATION.into(),
                trust_policy: TrustPolicy::Trusted,
            })
            .unwrap();
        assert!(backend.sources()[0].is_trusted);
    }

    #[test]
    fn test_injected_failure_is_journaled() {
        let backend = MemoryBackend::new().fail_on(Operation::Register, "boom");
        let err = backend
            .register_source(&register("Foo", Some("http://a"), false, true))
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(backend.mutations().len(), 1);
        assert!(backend.sources().is_empty());

        backend.clear_calls();
        assert!(backend.calls().is_empty());
    }
}
