use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pkgsource")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative package source registration", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/pkgsource/config.toml)
    #[arg(long, global = true, env = "PKGSOURCE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Report the current registration of a package source
    Get(InputArgs),

    /// Check whether a package source matches the desired state
    Test(InputArgs),

    /// Register or unregister a package source
    Set(SetArgs),

    /// Check that the registry can be reached
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

/// Where the desired-state document comes from (stdin when neither is given)
#[derive(Args, Debug, Default)]
pub struct InputArgs {
    /// Desired state as inline JSON
    #[arg(short, long, conflicts_with = "file")]
    pub input: Option<String>,

    /// Read desired state from a JSON file
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Report what would change without touching the registry
    #[arg(long)]
    pub what_if: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_get_with_input() {
        let cli = Cli::try_parse_from(["pkgsource", "get", "--input", "{}"]).unwrap();
        match cli.command {
            Command::Get(args) => {
                assert_eq!(args.input.as_deref(), Some("{}"));
                assert!(args.file.is_none());
            }
            _ => panic!("expected get"),
        }
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_set_what_if_with_globals() {
        let cli = Cli::try_parse_from([
            "pkgsource",
            "set",
            "--file",
            "desired.json",
            "--what-if",
            "--format",
            "pretty",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, OutputFormat::Pretty);
        match cli.command {
            Command::Set(args) => {
                assert!(args.what_if);
                assert_eq!(args.input.file, Some(PathBuf::from("desired.json")));
            }
            _ => panic!("expected set"),
        }
    }

    #[test]
    fn test_input_and_file_conflict() {
        let result =
            Cli::try_parse_from(["pkgsource", "test", "--input", "{}", "--file", "x.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_backend_selection() {
        let result = Cli::try_parse_from(["pkgsource", "set", "--backend", "memory"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_what_if_only_on_set() {
        assert!(Cli::try_parse_from(["pkgsource", "test", "--what-if"]).is_err());
    }
}
