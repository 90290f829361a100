mod cli;
mod commands;
mod config;
mod messages;
mod paths;
mod resource;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, OutputFormat};
use commands::resource::Operation;
use config::Config;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub format: OutputFormat,
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "pkgsource", &mut io::stdout());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        format: cli.format,
        config,
        config_path: cli.config,
    };
    log::debug!("verbose={} quiet={}", ctx.verbose, ctx.quiet);

    match cli.command {
        Command::Get(args) => commands::resource::run(&ctx, Operation::Get, &args),
        Command::Test(args) => commands::resource::run(&ctx, Operation::Test, &args),
        Command::Set(args) => commands::resource::run(
            &ctx,
            Operation::Set {
                what_if: args.what_if,
            },
            &args.input,
        ),
        Command::Doctor => commands::doctor::run(&ctx),
        Command::Completions { .. } => Ok(()),
    }
}
