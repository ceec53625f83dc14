//! # Copr submission tool
//!
//! `copr-submit` turns an RPM spec file into a Copr build. The default
//! `submit` flow runs a fixed sequence of stages, each one feeding the next:
//!
//! 1. credential setup for the Copr command-line client ([`login`]),
//! 2. spec file resolution and `Source0` extraction ([`spec_file`]),
//! 3. source archive download or copy into the sources directory ([`sources`]),
//! 4. source RPM generation with `rpmbuild` ([`srpm`]),
//! 5. chroot discovery and project provisioning ([`chroots`], [`provision`]),
//! 6. build submission ([`copr`]).
//!
//! Every external program goes through the [`Runner`] trait, and every stage
//! reports failures as a typed error, aborting the run on the first one.
//!
//! [`login`]: commands::login
//! [`Runner`]: process::Runner

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

use std::env::current_dir;

use clap::Parser;
use commands::{Cli, Commands, Session};
use common::logging;
use indicatif::ProgressBar;

/// Chroot selection rules.
mod chroots;

/// CLI subcommands.
mod commands;

/// Tool configuration and Copr credentials.
mod config;

/// Copr client and project page probe.
mod copr;

/// Interactive prompts.
mod prompt;

/// External program execution.
mod process;

/// Remote project provisioning.
mod provision;

/// Source archive acquisition.
mod sources;

/// Spec file resolution.
mod spec_file;

/// Source RPM generation.
mod srpm;

/// Test doubles for external collaborators.
#[cfg(test)]
mod testing;

/// CLI entrypoint.
fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let config = config::SubmitConfig::new(&cli.config_file)?;

    logging::init(&config.logging);

    let probe = copr::HttpProbe::new()?;

    let session = Session {
        config: &config,
        runner: &process::SystemRunner,
        prompter: &prompt::TerminalPrompter,
        probe: &probe,
        credentials_path: config.credentials_path()?,
        working_dir: current_dir()?,
        spinner: ProgressBar::new_spinner,
    };

    match cli.command.unwrap_or_else(|| Commands::Submit(Default::default())) {
        Commands::Submit(args) => commands::submit(args, &session)?,
        Commands::Login(args) => commands::login(args, &session)?,
        Commands::Chroots => commands::chroots(&session),
    }

    Ok(())
}
