//! Operator-facing message catalog
//!
//! Every sentence the reconciler emits comes from a [`Messages`]
//! implementation, so hosts can swap in another language without touching
//! the reconciliation logic.

use declarative::Presence;
use sourcekit::TrustPolicy;

/// Message catalog used by the package-source reconciler
pub trait Messages: Send + Sync {
    fn querying(&self, name: &str, provider: &str, location: &str) -> String;
    fn query_failed(&self, name: &str) -> String;
    fn source_found(&self, name: &str, location: &str, policy: TrustPolicy) -> String;
    fn source_not_found(&self, name: &str) -> String;
    fn presence_mismatch(&self, name: &str, desired: Presence, actual: Presence) -> String;
    fn property_mismatch(
        &self,
        name: &str,
        property: &str,
        desired: &str,
        actual: &str,
    ) -> String;
    fn in_desired_state(&self, name: &str) -> String;
    fn trust_policy_warning(&self, name: &str, policy: TrustPolicy) -> String;
    fn registering(&self, name: &str, location: Option<&str>, policy: TrustPolicy) -> String;
    fn updating_gallery(&self, name: &str, location: &str, policy: TrustPolicy) -> String;
    fn registered(&self, name: &str) -> String;
    fn unregistering(&self, name: &str) -> String;
    fn unregistered(&self, name: &str) -> String;
    fn what_if(&self, action: &str) -> String;
}

/// Built-in English catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishMessages;

impl Messages for EnglishMessages {
    fn querying(&self, name: &str, provider: &str, location: &str) -> String {
        format!("Looking up package source '{name}' ({provider}) at '{location}'")
    }

    fn query_failed(&self, name: &str) -> String {
        format!("Lookup of package source '{name}' failed; treating it as not registered")
    }

    fn source_found(&self, name: &str, location: &str, policy: TrustPolicy) -> String {
        format!("Package source '{name}' is registered at '{location}' ({policy})")
    }

    fn source_not_found(&self, name: &str) -> String {
        format!("Package source '{name}' is not registered")
    }

    fn presence_mismatch(&self, name: &str, desired: Presence, actual: Presence) -> String {
        format!("Package source '{name}' should be {desired} but is {actual}")
    }

    fn property_mismatch(
        &self,
        name: &str,
        property: &str,
        desired: &str,
        actual: &str,
    ) -> String {
        format!("Package source '{name}': {property} is '{actual}', expected '{desired}'")
    }

    fn in_desired_state(&self, name: &str) -> String {
        format!("Package source '{name}' is in the desired state")
    }

    fn trust_policy_warning(&self, name: &str, policy: TrustPolicy) -> String {
        format!(
            "Registering package source '{name}' as {policy}. Packages from an Untrusted \
             source are not validated before install; make sure this policy is intended"
        )
    }

    fn registering(&self, name: &str, location: Option<&str>, policy: TrustPolicy) -> String {
        match location {
            Some(location) => {
                format!("Registering package source '{name}' at '{location}' as {policy}")
            }
            None => {
                format!("Registering package source '{name}' at its default location as {policy}")
            }
        }
    }

    fn updating_gallery(&self, name: &str, location: &str, policy: TrustPolicy) -> String {
        format!("Updating gallery '{name}' at '{location}' to {policy}")
    }

    fn registered(&self, name: &str) -> String {
        format!("Package source '{name}' registered")
    }

    fn unregistering(&self, name: &str) -> String {
        format!("Unregistering package source '{name}'")
    }

    fn unregistered(&self, name: &str) -> String {
        format!("Package source '{name}' unregistered")
    }

    fn what_if(&self, action: &str) -> String {
        format!("What if: {action}")
    }
}
