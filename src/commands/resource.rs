//! `get`, `test` and `set` for a package source
//!
//! Each command reads one desired-state JSON document and writes one JSON
//! document (or a colored summary with `--format pretty`) to stdout.

use anyhow::{Context as AnyhowContext, Result, bail};
use colored::Colorize;
use declarative::{ApplyContext, ApplyResult, LogSink, Resource, TestOutcome};
use serde::Serialize;
use sourcekit::PowerShellBackend;
use sourcekit::backend::default_backend;
use std::fs;
use std::io;

use crate::Context;
use crate::cli::{InputArgs, OutputFormat};
use crate::config::Config;
use crate::resource::{DesiredState, ObservedState, SourceReconciler};
use crate::ui;

/// Operation requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Test,
    Set { what_if: bool },
}

/// Result of one operation, ready to print
#[derive(Debug)]
pub enum Report {
    Get(ObservedState),
    Test(TestOutcome<ObservedState>),
    Set(ApplyResult),
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TestDocument<'a> {
    #[serde(flatten)]
    observed: &'a ObservedState,
    in_desired_state: bool,
    differing_properties: Vec<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SetDocument<'a> {
    result: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

pub fn run(ctx: &Context, operation: Operation, input: &InputArgs) -> Result<()> {
    let desired = read_desired(input)?;
    let backend = build_backend(&ctx.config)?;
    let sink = LogSink;
    let reconciler = SourceReconciler::new(&backend, &sink)
        .with_well_known(ctx.config.well_known_sources())
        .with_force_bootstrap(ctx.config.force_bootstrap);

    let report = execute(&reconciler, operation, &desired)?;
    match ctx.format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Pretty => report.print_pretty(&desired),
    }
    Ok(())
}

/// Run `operation` through the resource contract
pub fn execute<R>(resource: &R, operation: Operation, desired: &DesiredState) -> Result<Report>
where
    R: Resource<Desired = DesiredState, Observed = ObservedState>,
{
    log::debug!(
        "{} {:?} for '{}'",
        resource.resource_type(),
        operation,
        desired.name
    );
    let report = match operation {
        Operation::Get => Report::Get(resource.get(desired)?),
        Operation::Test => Report::Test(resource.test(desired)?),
        Operation::Set { what_if } => {
            let ctx = if what_if {
                ApplyContext::what_if()
            } else {
                ApplyContext::new()
            };
            Report::Set(resource.set(desired, &ctx)?)
        }
    };
    Ok(report)
}

impl Report {
    pub fn to_json(&self) -> Result<String> {
        let json = match self {
            Self::Get(observed) => serde_json::to_string(observed)?,
            Self::Test(outcome) => serde_json::to_string(&TestDocument {
                observed: &outcome.observed,
                in_desired_state: outcome.is_match(),
                differing_properties: outcome.differing_properties(),
            })?,
            Self::Set(result) => serde_json::to_string(&SetDocument {
                result: result.label(),
                reason: match result {
                    ApplyResult::Skipped { reason } => Some(reason.as_str()),
                    _ => None,
                },
            })?,
        };
        Ok(json)
    }

    fn print_pretty(&self, desired: &DesiredState) {
        match self {
            Self::Get(observed) => print_observed(observed),
            Self::Test(outcome) => {
                print_observed(&outcome.observed);
                println!();
                if outcome.is_match() {
                    ui::success(&format!("'{}' is in the desired state", desired.name));
                } else {
                    ui::warn(&format!("'{}' is not in the desired state", desired.name));
                    for drift in &outcome.drift {
                        ui::dim(&drift.to_string());
                    }
                }
            }
            Self::Set(ApplyResult::Skipped { reason }) => ui::info(reason),
            Self::Set(result) => {
                ui::success(&format!("{} '{}'", result.label(), desired.name));
            }
        }
    }
}

fn print_observed(observed: &ObservedState) {
    ui::header(&format!("Package source {}", observed.name()));
    let presence = observed.presence().to_string();
    let presence = if observed.presence().is_present() {
        presence.green()
    } else {
        presence.yellow()
    };
    ui::kv("Presence", &presence.to_string());
    ui::kv("ProviderName", observed.provider_name());
    ui::kv("SourceLocation", ui::or_unset(observed.source_location()));
    let policy = observed.trust_policy().map(|p| p.to_string());
    ui::kv("TrustPolicy", ui::or_unset(policy.as_deref()));
}

/// Read and validate the desired-state document
pub fn read_desired(input: &InputArgs) -> Result<DesiredState> {
    let (content, origin) = match (&input.input, &input.file) {
        (Some(json), _) => (json.clone(), "--input".to_string()),
        (None, Some(path)) => (
            fs::read_to_string(path)
                .with_context(|| format!("Could not read {}", path.display()))?,
            path.display().to_string(),
        ),
        (None, None) => (
            io::read_to_string(io::stdin()).context("Could not read desired state from stdin")?,
            "stdin".to_string(),
        ),
    };
    parse_desired(&content).with_context(|| format!("Invalid desired state from {origin}"))
}

fn parse_desired(content: &str) -> Result<DesiredState> {
    let desired: DesiredState = serde_json::from_str(content)?;
    let missing = desired.missing_fields();
    if !missing.is_empty() {
        bail!("missing required properties: {}", missing.join(", "));
    }
    Ok(desired)
}

/// Build the PowerShell registry backend, honoring a configured executable
pub fn build_backend(config: &Config) -> Result<PowerShellBackend> {
    let backend = match config.powershell_path() {
        Some(path) => PowerShellBackend::with_executable(&path)
            .with_context(|| format!("PowerShell not found at {}", path.display()))?,
        None => default_backend().context("PowerShell is required")?,
    };
    Ok(backend)
}
