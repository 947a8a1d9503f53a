mod cli;
mod commands;
mod config;
mod paths;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Value of `--config`, if given
    pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
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

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
    };

    log::debug!("tfrun {} (verbosity {})", env!("CARGO_PKG_VERSION"), ctx.verbose);

    match cli.command {
        Command::Plan(args) => commands::plan::run(&ctx, args),
        Command::Apply(args) => commands::apply::run(&ctx, args),
        Command::Doctor(target) => commands::doctor::run(&ctx, target),
        Command::Config(cmd) => commands::config::run(&ctx, cmd),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "tfrun", &mut io::stdout());
            Ok(())
        }
    }
}
