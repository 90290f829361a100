//! Real registry backend driving PackageManagement through PowerShell.
//!
//! Request values reach the scripts through environment variables so that
//! names and locations are never spliced into PowerShell source.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{
    Credential, GalleryUpdate, RegisterRequest, SourceEntry, SourceQuery, UnregisterRequest,
};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const ENV_NAME: &str = "PKGSOURCE_NAME";
const ENV_PROVIDER: &str = "PKGSOURCE_PROVIDER";
const ENV_LOCATION: &str = "PKGSOURCE_LOCATION";
const ENV_TRUSTED: &str = "PKGSOURCE_TRUSTED";
const ENV_FORCE: &str = "PKGSOURCE_FORCE";
const ENV_FORCE_BOOTSTRAP: &str = "PKGSOURCE_FORCE_BOOTSTRAP";
const ENV_POLICY: &str = "PKGSOURCE_POLICY";
const ENV_CRED_USER: &str = "PKGSOURCE_CRED_USER";
const ENV_CRED_PASSWORD: &str = "PKGSOURCE_CRED_PASSWORD";

const ALL_ENV: [&str; 9] = [
    ENV_NAME,
    ENV_PROVIDER,
    ENV_LOCATION,
    ENV_TRUSTED,
    ENV_FORCE,
    ENV_FORCE_BOOTSTRAP,
    ENV_POLICY,
    ENV_CRED_USER,
    ENV_CRED_PASSWORD,
];

const QUERY_SCRIPT: &str = r#"
$params = @{
    Name = $env:PKGSOURCE_NAME
    ProviderName = $env:PKGSOURCE_PROVIDER
    Location = $env:PKGSOURCE_LOCATION
    ErrorAction = 'SilentlyContinue'
    WarningAction = 'SilentlyContinue'
}
if ($env:PKGSOURCE_FORCE_BOOTSTRAP -eq '1') { $params.ForceBootstrap = $true }
$found = @(Get-PackageSource @params | Select-Object Name, Location, ProviderName, IsRegistered, IsTrusted)
ConvertTo-Json -InputObject $found -Compress
"#;

const CREDENTIAL_FRAGMENT: &str = r#"
if ($env:PKGSOURCE_CRED_USER) {
    $secret = ConvertTo-SecureString $env:PKGSOURCE_CRED_PASSWORD -AsPlainText -Force
    $params.Credential = [pscredential]::new($env:PKGSOURCE_CRED_USER, $secret)
}
"#;

const REGISTER_SCRIPT: &str = r#"
$ErrorActionPreference = 'Stop'
$params = @{
    Name = $env:PKGSOURCE_NAME
    ProviderName = $env:PKGSOURCE_PROVIDER
    Trusted = ($env:PKGSOURCE_TRUSTED -eq '1')
    Force = ($env:PKGSOURCE_FORCE -eq '1')
}
if ($env:PKGSOURCE_LOCATION) { $params.Location = $env:PKGSOURCE_LOCATION }
"#;

const UNREGISTER_SCRIPT: &str = r#"
$ErrorActionPreference = 'Stop'
$params = @{
    Name = $env:PKGSOURCE_NAME
    ProviderName = $env:PKGSOURCE_PROVIDER
    Force = ($env:PKGSOURCE_FORCE -eq '1')
}
if ($env:PKGSOURCE_LOCATION) { $params.Location = $env:PKGSOURCE_LOCATION }
"#;

const UPDATE_GALLERY_SCRIPT: &str = r#"
$ErrorActionPreference = 'Stop'
Set-PSRepository -Name $env:PKGSOURCE_NAME -SourceLocation $env:PKGSOURCE_LOCATION -InstallationPolicy $env:PKGSOURCE_POLICY
"#;

type ScriptEnv = Vec<(&'static str, String)>;

/// Backend that executes PackageManagement cmdlets.
#[derive(Debug)]
pub struct PowerShellBackend {
    /// Path to the PowerShell executable
    executable: PathBuf,
}

impl PowerShellBackend {
    /// Create a new backend using the first PowerShell found on PATH.
    ///
    /// Returns an error if PowerShell is not installed.
    pub fn new() -> Result<Self> {
        let executable = find_powershell()?;
        log::debug!("Using PowerShell at {}", executable.display());
        Ok(Self { executable })
    }

    /// Create a backend for an explicit PowerShell executable.
    pub fn with_executable(path: impl Into<PathBuf>) -> Result<Self> {
        let executable = path.into();
        if !executable.exists() {
            return Err(Error::PowerShellNotFound);
        }
        Ok(Self { executable })
    }

    /// Path of the executable this backend runs.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run a script and return raw output.
    fn run_script(&self, script: &str, env: &ScriptEnv) -> Result<Output> {
        let mut command = Command::new(&self.executable);
        // Values left over in our own environment must not leak into a request
        for key in ALL_ENV {
            command.env_remove(key);
        }
        let output = command
            .args(["-NoProfile", "-NonInteractive", "-Command", script])
            .envs(env.iter().map(|(k, v)| (*k, v.as_str())))
            .output()?;
        Ok(output)
    }

    /// Run a script and check for success.
    fn run_script_checked(
        &self,
        script: &str,
        env: &ScriptEnv,
        provider_name: Option<&str>,
    ) -> Result<String> {
        let output = self.run_script(script, env)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::from_pwsh_output(&stderr, provider_name));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Backend for PowerShellBackend {
    fn is_available(&self) -> bool {
        self.run_script("$PSVersionTable.PSVersion.Major", &Vec::new())
            .is_ok_and(|o| o.status.success())
    }

    fn query_sources(&self, query: &SourceQuery) -> Result<Vec<SourceEntry>> {
        let stdout =
            self.run_script_checked(QUERY_SCRIPT, &query_env(query), Some(&query.provider_name))?;
        parse_sources(&stdout)
    }

    fn register_source(&self, request: &RegisterRequest) -> Result<()> {
        let script = format!(
            "{}{}Register-PackageSource @params | Out-Null\n",
            REGISTER_SCRIPT, CREDENTIAL_FRAGMENT
        );
        self.run_script_checked(&script, &register_env(request), Some(&request.provider_name))?;
        Ok(())
    }

    fn unregister_source(&self, request: &UnregisterRequest) -> Result<()> {
        let script = format!(
            "{}{}Unregister-PackageSource @params | Out-Null\n",
            UNREGISTER_SCRIPT, CREDENTIAL_FRAGMENT
        );
        self.run_script_checked(&script, &unregister_env(request), Some(&request.provider_name))?;
        Ok(())
    }

    fn update_gallery_source(&self, update: &GalleryUpdate) -> Result<()> {
        let env = vec![
            (ENV_NAME, update.name.clone()),
            (ENV_LOCATION, update.location.clone()),
            (ENV_POLICY, update.trust_policy.installation_policy().to_string()),
        ];
        self.run_script_checked(UPDATE_GALLERY_SCRIPT, &env, None)?;
        Ok(())
    }
}

/// Find the PowerShell executable path.
fn find_powershell() -> Result<PathBuf> {
    // PowerShell 7 first, then Windows PowerShell
    ["pwsh", "powershell"]
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or(Error::PowerShellNotFound)
}

fn flag(value: bool) -> String {
    let value = if value { "1" } else { "0" };
    value.to_string()
}

fn push_credential(env: &mut ScriptEnv, credential: Option<&Credential>) {
    if let Some(cred) = credential {
        env.push((ENV_CRED_USER, cred.user_name().to_string()));
        env.push((ENV_CRED_PASSWORD, cred.expose_password().to_string()));
    }
}

fn query_env(query: &SourceQuery) -> ScriptEnv {
    vec![
        (ENV_NAME, query.name.clone()),
        (ENV_PROVIDER, query.provider_name.clone()),
        (ENV_LOCATION, query.location.clone()),
        (ENV_FORCE_BOOTSTRAP, flag(query.force_bootstrap)),
    ]
}

fn register_env(request: &RegisterRequest) -> ScriptEnv {
    let mut env = vec![
        (ENV_NAME, request.name.clone()),
        (ENV_PROVIDER, request.provider_name.clone()),
        (ENV_TRUSTED, flag(request.trusted)),
        (ENV_FORCE, flag(request.force)),
    ];
    if let Some(location) = &request.location {
        env.push((ENV_LOCATION, location.clone()));
    }
    push_credential(&mut env, request.credential.as_ref());
    env
}

fn unregister_env(request: &UnregisterRequest) -> ScriptEnv {
    let mut env = vec![
        (ENV_NAME, request.name.clone()),
        (ENV_PROVIDER, request.provider_name.clone()),
        (ENV_FORCE, flag(request.force)),
    ];
    if let Some(location) = &request.location {
        env.push((ENV_LOCATION, location.clone()));
    }
    push_credential(&mut env, request.credential.as_ref());
    env
}

/// Parse `ConvertTo-Json` output into source entries.
///
/// Accepts an array, a single object (older PowerShell unwraps one-element
/// arrays) or empty output.
fn parse_sources(stdout: &str) -> Result<Vec<SourceEntry>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let json: serde_json::Value = serde_json::from_str(trimmed)?;
    let entries = match json {
        serde_json::Value::Array(_) => serde_json::from_value(json)?,
        serde_json::Value::Null => Vec::new(),
        _ => vec![serde_json::from_value(json)?],
    };
    Ok(entries)
}
