//! Package source resource
//!
//! Keeps a named package source (provider + location) registered or
//! unregistered. All state lives in the registry behind
//! [`sourcekit::Backend`]; the reconciler itself is stateless.

use declarative::{
    ApplyContext, ApplyResult, Drift, MessageSink, Presence, Resource, TestOutcome,
};
use serde::{Deserialize, Serialize};
use sourcekit::{
    Backend, Credential, GalleryUpdate, RegisterRequest, SourceQuery, TrustPolicy,
    UnregisterRequest, same_location,
};
use std::fmt;

use super::error::ReconcileError;
use super::well_known::{ConvergenceStrategy, WellKnownSources};
use crate::messages::{EnglishMessages, Messages};

/// Desired state supplied by the configuration host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DesiredState {
    pub name: String,
    pub provider_name: String,
    pub source_location: String,
    #[serde(default, alias = "Ensure")]
    pub presence: Presence,
    #[serde(default)]
    pub credential: Option<Credential>,
    #[serde(default)]
    pub trust_policy: TrustPolicy,
}

impl DesiredState {
    /// A Present, Untrusted source without a credential
    pub fn new(
        name: impl Into<String>,
        provider_name: impl Into<String>,
        source_location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider_name: provider_name.into(),
            source_location: source_location.into(),
            presence: Presence::Present,
            credential: None,
            trust_policy: TrustPolicy::Untrusted,
        }
    }

    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    pub fn with_trust_policy(mut self, trust_policy: TrustPolicy) -> Self {
        self.trust_policy = trust_policy;
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Required key fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("Name", &self.name),
            ("ProviderName", &self.provider_name),
            ("SourceLocation", &self.source_location),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// State reported by `get`
///
/// Location and trust policy exist only for a Present source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObservedState {
    presence: Presence,
    name: String,
    provider_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trust_policy: Option<TrustPolicy>,
}

impl ObservedState {
    pub fn absent(name: &str, provider_name: &str) -> Self {
        Self {
            presence: Presence::Absent,
            name: name.to_string(),
            provider_name: provider_name.to_string(),
            source_location: None,
            trust_policy: None,
        }
    }

    pub fn present(
        name: &str,
        provider_name: &str,
        source_location: &str,
        trust_policy: TrustPolicy,
    ) -> Self {
        Self {
            presence: Presence::Present,
            name: name.to_string(),
            provider_name: provider_name.to_string(),
            source_location: Some(source_location.to_string()),
            trust_policy: Some(trust_policy),
        }
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn source_location(&self) -> Option<&str> {
        self.source_location.as_deref()
    }

    pub fn trust_policy(&self) -> Option<TrustPolicy> {
        self.trust_policy
    }
}

/// Converges one package source against the registry
pub struct SourceReconciler<'a> {
    backend: &'a dyn Backend,
    sink: &'a dyn MessageSink,
    messages: &'a dyn Messages,
    well_known: WellKnownSources,
    force_bootstrap: bool,
}

impl fmt::Debug for SourceReconciler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceReconciler")
            .field("well_known", &self.well_known)
            .field("force_bootstrap", &self.force_bootstrap)
            .finish_non_exhaustive()
    }
}

impl<'a> SourceReconciler<'a> {
    pub fn new(backend: &'a dyn Backend, sink: &'a dyn MessageSink) -> Self {
        Self {
            backend,
            sink,
            messages: &EnglishMessages,
            well_known: WellKnownSources::default(),
            force_bootstrap: true,
        }
    }

    pub fn with_messages(mut self, messages: &'a dyn Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_well_known(mut self, well_known: WellKnownSources) -> Self {
        self.well_known = well_known;
        self
    }

    pub fn with_force_bootstrap(mut self, force_bootstrap: bool) -> Self {
        self.force_bootstrap = force_bootstrap;
        self
    }

    /// Read the registration state of a source.
    ///
    /// Registry failures are reported as "not registered". The first
    /// registered entry the registry returns supplies location and policy.
    pub fn read(&self, name: &str, provider_name: &str, source_location: &str) -> ObservedState {
        self.sink
            .verbose(&self.messages.querying(name, provider_name, source_location));

        let query = SourceQuery::new(name, provider_name, source_location)
            .with_force_bootstrap(self.force_bootstrap);
        let entries = match self.backend.query_sources(&query) {
            Ok(entries) => entries,
            Err(err) => {
                log::debug!("query for package source '{name}' failed: {err}");
                self.sink.verbose(&self.messages.query_failed(name));
                Vec::new()
            }
        };

        match entries.iter().find(|e| e.is_registered) {
            Some(entry) => {
                let policy = entry.trust_policy();
                self.sink
                    .verbose(&self.messages.source_found(name, &entry.location, policy));
                ObservedState::present(name, provider_name, &entry.location, policy)
            }
            None => {
                self.sink.verbose(&self.messages.source_not_found(name));
                ObservedState::absent(name, provider_name)
            }
        }
    }

    /// Compare the registry against `desired`, recording every drifted property.
    pub fn test(&self, desired: &DesiredState) -> TestOutcome<ObservedState> {
        let observed = self.read(
            &desired.name,
            &desired.provider_name,
            &desired.source_location,
        );
        let mut drift = Vec::new();

        if observed.presence != desired.presence {
            self.sink.verbose(&self.messages.presence_mismatch(
                &desired.name,
                desired.presence,
                observed.presence,
            ));
            drift.push(Drift::new(
                "Presence",
                desired.presence,
                Some(observed.presence),
            ));
        } else if desired.presence.is_present() {
            let location_matches = observed
                .source_location()
                .is_some_and(|l| same_location(l, &desired.source_location));
            if !location_matches {
                let actual = observed.source_location().unwrap_or_default();
                self.sink.verbose(&self.messages.property_mismatch(
                    &desired.name,
                    "SourceLocation",
                    &desired.source_location,
                    actual,
                ));
                drift.push(Drift::new(
                    "SourceLocation",
                    &desired.source_location,
                    observed.source_location(),
                ));
            }

            if observed.trust_policy != Some(desired.trust_policy) {
                let actual = observed
                    .trust_policy
                    .map(|p| p.to_string())
                    .unwrap_or_default();
                self.sink.verbose(&self.messages.property_mismatch(
                    &desired.name,
                    "TrustPolicy",
                    desired.trust_policy.installation_policy(),
                    &actual,
                ));
                drift.push(Drift::new(
                    "TrustPolicy",
                    desired.trust_policy,
                    observed.trust_policy,
                ));
            }
        }

        if drift.is_empty() {
            self.sink
                .verbose(&self.messages.in_desired_state(&desired.name));
        }

        TestOutcome { observed, drift }
    }

    /// Register or unregister the source so the registry matches `desired`.
    ///
    /// Does not re-read state afterwards.
    pub fn apply(
        &self,
        desired: &DesiredState,
        ctx: &ApplyContext,
    ) -> Result<ApplyResult, ReconcileError> {
        match desired.presence {
            Presence::Present => self.apply_present(desired, ctx),
            Presence::Absent => self.apply_absent(desired, ctx),
        }
    }

    fn apply_present(
        &self,
        desired: &DesiredState,
        ctx: &ApplyContext,
    ) -> Result<ApplyResult, ReconcileError> {
        self.sink.warning(
            &self
                .messages
                .trust_policy_warning(&desired.name, desired.trust_policy),
        );

        let request = RegisterRequest {
            name: desired.name.clone(),
            provider_name: desired.provider_name.clone(),
            location: Some(desired.source_location.clone()),
            credential: desired.credential.clone(),
            trusted: desired.trust_policy.is_trusted(),
            force: true,
        };

        let result = match self.well_known.strategy_for(&desired.name) {
            Some(ConvergenceStrategy::GalleryUpdate) => {
                let existing = self.read(
                    &desired.name,
                    &desired.provider_name,
                    &desired.source_location,
                );
                if existing.presence.is_present() {
                    self.update_gallery(desired, ctx)?
                } else {
                    self.register(&request.without_location(), ctx)?
                }
            }
            None => self.register(&request, ctx)?,
        };

        if result.is_change() {
            self.sink.verbose(&self.messages.registered(&desired.name));
        }
        Ok(result)
    }

    fn register(
        &self,
        request: &RegisterRequest,
        ctx: &ApplyContext,
    ) -> Result<ApplyResult, ReconcileError> {
        let policy = TrustPolicy::from_flag(request.trusted);
        let action = self
            .messages
            .registering(&request.name, request.location.as_deref(), policy);

        if ctx.dry_run {
            return Ok(self.skipped(&action));
        }

        self.sink.verbose(&action);
        self.backend
            .register_source(request)
            .map_err(|source| ReconcileError::RegistrationFailed {
                name: request.name.clone(),
                source,
            })?;
        Ok(ApplyResult::Created)
    }

    fn update_gallery(
        &self,
        desired: &DesiredState,
        ctx: &ApplyContext,
    ) -> Result<ApplyResult, ReconcileError> {
        let update = GalleryUpdate {
            name: desired.name.clone(),
            location: desired.source_location.clone(),
            trust_policy: desired.trust_policy,
        };
        let action =
            self.messages
                .updating_gallery(&update.name, &update.location, update.trust_policy);

        if ctx.dry_run {
            return Ok(self.skipped(&action));
        }

        self.sink.verbose(&action);
        self.backend
            .update_gallery_source(&update)
            .map_err(|source| ReconcileError::RegistrationFailed {
                name: desired.name.clone(),
                source,
            })?;
        Ok(ApplyResult::Modified)
    }

    fn apply_absent(
        &self,
        desired: &DesiredState,
        ctx: &ApplyContext,
    ) -> Result<ApplyResult, ReconcileError> {
        let request = UnregisterRequest {
            name: desired.name.clone(),
            provider_name: desired.provider_name.clone(),
            location: Some(desired.source_location.clone()),
            credential: desired.credential.clone(),
            force: true,
        };
        let action = self.messages.unregistering(&desired.name);

        if ctx.dry_run {
            return Ok(self.skipped(&action));
        }

        self.sink.verbose(&action);
        self.backend
            .unregister_source(&request)
            .map_err(|source| ReconcileError::UnregistrationFailed {
                name: desired.name.clone(),
                source,
            })?;
        self.sink.verbose(&self.messages.unregistered(&desired.name));
        Ok(ApplyResult::Removed)
    }

    fn skipped(&self, action: &str) -> ApplyResult {
        let reason = self.messages.what_if(action);
        self.sink.verbose(&reason);
        ApplyResult::Skipped { reason }
    }
}

impl Resource for SourceReconciler<'_> {
    type Desired = DesiredState;
    type Observed = ObservedState;

    fn resource_type(&self) -> &'static str {
        "PackageSource"
    }

    fn get(&self, desired: &DesiredState) -> anyhow::Result<ObservedState> {
        Ok(self.read(
            &desired.name,
            &desired.provider_name,
            &desired.source_location,
        ))
    }

    fn test(&self, desired: &DesiredState) -> anyhow::Result<TestOutcome<ObservedState>> {
        Ok(SourceReconciler::test(self, desired))
    }

    fn set(&self, desired: &DesiredState, ctx: &ApplyContext) -> anyhow::Result<ApplyResult> {
        Ok(self.apply(desired, ctx)?)
    }
}
