/// `chroots` subcommand.
mod chroots;

/// `login` subcommand.
mod login;

/// `submit` subcommand.
mod submit;

pub(crate) use chroots::chroots;
pub(crate) use login::login;
pub(crate) use submit::submit;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use indicatif::ProgressBar;

use crate::{
    config::SubmitConfig,
    copr::{Copr, ProjectProbe},
    process::Runner,
    prompt::Prompter,
};

/// CLI configuration.
#[derive(Parser)]
#[command(about, version)]
pub(crate) struct Cli {
    /// Configuration file path.
    #[arg(short, long, default_value = "CoprSubmit.toml")]
    pub config_file: PathBuf,

    /// Selected subcommand, `submit` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Supported subcommands.
#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Build a source RPM and submit it to Copr.
    Submit(Submit),

    /// Configure Copr CLI credentials.
    Login(Login),

    /// List the default chroots offered by Copr.
    Chroots,
}

/// `submit` subcommand configuration.
///
/// Values that are not provided are asked for interactively.
#[derive(Args, Default)]
pub struct Submit {
    /// Spec file path, the current directory is searched when omitted.
    #[arg(short, long)]
    spec: Option<String>,

    /// Directory where the source RPM is written.
    #[arg(short = 'o', long)]
    srpm_dir: Option<PathBuf>,

    /// Copr project name.
    #[arg(short, long)]
    project: Option<String>,

    /// Additional chroots enabled on top of the default ones.
    #[arg(short, long = "chroot")]
    chroots: Vec<String>,
}

/// `login` subcommand configuration.
#[derive(Args)]
pub struct Login {
    /// Ask for new credentials even if the current ones work.
    #[arg(short, long)]
    force: bool,
}

/// External collaborators shared by all subcommands.
pub(crate) struct Session<'a> {
    /// Tool configuration.
    pub config: &'a SubmitConfig,

    /// External program runner.
    pub runner: &'a dyn Runner,

    /// Interactive input source.
    pub prompter: &'a dyn Prompter,

    /// Copr project page probe.
    pub probe: &'a dyn ProjectProbe,

    /// Copr client credentials file.
    pub credentials_path: PathBuf,

    /// Directory used to search for spec files and resolve relative paths.
    pub working_dir: PathBuf,

    /// Progress indicator factory.
    pub spinner: fn() -> ProgressBar,
}

impl Session<'_> {
    /// Copr client bound to the session runner and credentials.
    pub fn copr(&self) -> Copr<'_> {
        self.copr_with(self.runner)
    }

    /// Copr client bound to `runner` and the session credentials.
    pub fn copr_with<'r>(&'r self, runner: &'r dyn Runner) -> Copr<'r> {
        Copr::new(runner, &self.config.copr_cli, &self.credentials_path)
    }
}
