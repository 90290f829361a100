use anyhow::Result;
use colored::Colorize;
use sourcekit::Backend;

use crate::Context;
use crate::config::Config;
use crate::paths;
use crate::ui;

use super::resource::build_backend;

struct Issue {
    category: &'static str,
    summary: String,
    fix: Option<String>,
}

pub fn run(ctx: &Context) -> Result<()> {
    ui::header("pkgsource Health Check");

    let mut issues: Vec<Issue> = Vec::new();

    check_config(ctx, &mut issues);
    check_backend(&ctx.config, &mut issues);

    println!();
    if issues.is_empty() {
        ui::success("All checks passed");
    } else {
        print_issue_summary(&issues);
    }

    Ok(())
}

fn print_issue_summary(issues: &[Issue]) {
    let count = issues.len();
    let label = if count == 1 { "Issue" } else { "Issues" };
    ui::header(&format!("{count} {label} Found"));

    for (i, issue) in issues.iter().enumerate() {
        println!(
            "  {}  {} {}",
            format!("{}.", i + 1).bold(),
            issue.summary,
            format!("[{}]", issue.category).dimmed()
        );
        if let Some(fix) = &issue.fix {
            println!("      {} {}", "Fix:".cyan(), fix);
        }
    }
}

fn check_config(ctx: &Context, issues: &mut Vec<Issue>) {
    let path = match &ctx.config_path {
        Some(path) => Ok(path.clone()),
        None => paths::config_file(),
    };

    match path {
        Ok(path) if path.exists() => {
            println!("  {} {}", "✓".green(), path.display());
        }
        Ok(path) => {
            println!(
                "  {} {} {}",
                "-".dimmed(),
                path.display(),
                "(not present, using defaults)".dimmed()
            );
        }
        Err(e) => {
            ui::error("Could not determine config directory");
            issues.push(Issue {
                category: "Configuration",
                summary: format!("{e:#}"),
                fix: Some(format!("Set {} or pass --config", paths::ENV_CONFIG_DIR)),
            });
        }
    }

    let table = ctx.config.well_known_sources();
    let names: Vec<&str> = table.names().collect();
    ui::kv("Well-known sources", &names.join(", "));
    ui::kv(
        "Force bootstrap",
        if ctx.config.force_bootstrap { "yes" } else { "no" },
    );
}

fn check_backend(config: &Config, issues: &mut Vec<Issue>) {
    match build_backend(config) {
        Ok(backend) if backend.is_available() => {
            println!(
                "  {} PowerShell registry at {}",
                "✓".green(),
                backend.executable().display()
            );
        }
        Ok(backend) => {
            println!(
                "  {} PowerShell registry at {}",
                "✗".red(),
                backend.executable().display()
            );
            issues.push(Issue {
                category: "Registry",
                summary: "PackageManagement did not respond".into(),
                fix: Some("Run `Get-PackageProvider` in PowerShell to check the module".into()),
            });
        }
        Err(e) => {
            println!("  {} PowerShell registry", "✗".red());
            issues.push(backend_issue(&e));
        }
    }
}

fn backend_issue(err: &anyhow::Error) -> Issue {
    let category = err
        .downcast_ref::<sourcekit::Error>()
        .map(sourcekit::Error::category);
    Issue {
        category: category.map_or("Registry", |c| c.description()),
        summary: format!("{err:#}"),
        fix: category.map(|c| c.advice().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_issue_for_missing_powershell() {
        let config = Config {
            powershell: Some("/definitely/not/here/pwsh".into()),
            ..Config::default()
        };
        let err = build_backend(&config).unwrap_err();

        let issue = backend_issue(&err);
        assert_eq!(issue.category, "PowerShell not installed");
        assert!(issue.summary.contains("/definitely/not/here/pwsh"));
        assert_eq!(
            issue.fix.as_deref(),
            Some(sourcekit::ErrorCategory::PowerShellNotFound.advice())
        );
    }

    #[test]
    fn test_backend_issue_for_other_errors() {
        let issue = backend_issue(&anyhow::anyhow!("boom"));
        assert_eq!(issue.category, "Registry");
        assert!(issue.fix.is_none());
    }
}
