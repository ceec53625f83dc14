use std::{io, path::PathBuf, time::Duration};

use derive_more::{Display, Error, From};
use indicatif::ProgressBar;
use tracing::info;

use crate::{
    chroots::with_extras,
    commands::{chroots::discover, login::ensure_credentials, login::LoginError, Session, Submit},
    config::ConfigError,
    copr::{CoprError, ProjectRef},
    process::{CommandOutput, Invocation, ProcessError, Runner},
    provision::{provision, Provisioned},
    sources::{acquire, SourceError, SourceRef},
    spec_file::{self, SpecFileError},
    srpm::{self, SrpmError},
};

/// Spinner redraw period.
const TICK_PERIOD: Duration = Duration::from_millis(150);

/// `submit` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum SubmitError {
    /// Configuration error.
    Config(ConfigError),

    /// Credential setup error.
    Login(LoginError),

    /// Unable to read user input.
    #[display(fmt = "unable to read input: {}", _0)]
    Io(io::Error),

    /// Spec file resolution error.
    SpecFile(SpecFileError),

    /// Source acquisition error.
    Source(SourceError),

    /// Source RPM generation error.
    Srpm(SrpmError),

    /// Copr identity check failed after the source RPM was built.
    #[display(fmt = "Copr CLI is not authenticated ({}), please run: copr-submit login", _0)]
    #[from(ignore)]
    NotAuthenticated(CoprError),

    /// Copr client error.
    Copr(CoprError),

    /// Neither the catalog nor the user provided a chroot.
    #[display(fmt = "no chroots selected")]
    NoChroots,

    /// Empty project name.
    #[display(fmt = "Copr project name must not be empty")]
    EmptyProjectName,
}

/// Artifacts of a finished submission.
#[derive(Debug)]
pub(crate) struct Submission {
    /// Spec file the package was built from.
    pub spec_file: PathBuf,

    /// Source archive placed into the sources directory.
    pub tarball: PathBuf,

    /// Generated source RPM.
    pub srpm: PathBuf,

    /// Target project.
    pub project: ProjectRef,

    /// Provisioning outcome.
    pub provisioned: Provisioned,
}

/// Submit flow entrypoint.
pub(crate) fn submit(args: Submit, session: &Session) -> Result<(), SubmitError> {
    let submission = run(args, session)?;

    info!(
        spec_file = %submission.spec_file.display(),
        tarball = %submission.tarball.display(),
        srpm = %submission.srpm.display(),
        project = %submission.project,
        provisioned = ?submission.provisioned,
        "build submitted"
    );

    Ok(())
}

/// Run every pipeline stage in order.
pub(crate) fn run(
    Submit {
        spec,
        srpm_dir,
        project,
        chroots,
    }: Submit,
    session: &Session,
) -> Result<Submission, SubmitError> {
    let config = session.config;
    let prompter = session.prompter;
    let copr = session.copr();

    ensure_credentials(session, false)?;

    let requested = match spec {
        Some(spec) => spec,
        None => prompter.ask(
            "Path to your spec file (leave empty to search in the current directory)",
            None,
        )?,
    };

    let spec_file = spec_file::resolve(requested.trim(), &session.working_dir)?;
    println!("Using spec file: {}", spec_file.display());

    let source = SourceRef::parse(&spec_file::source0(&spec_file)?);

    let sources_dir = config.sources_dir()?;
    let tarball = with_spinner(
        (session.spinner)(),
        "Fetching source archive...",
        session.runner,
        |runner| {
            acquire(
                &source,
                &session.working_dir,
                &sources_dir,
                runner,
                &config.downloader,
            )
        },
    )?;
    println!("Source archive ready: {}", tarball.display());

    let srpm_dir = match srpm_dir {
        Some(dir) => dir,
        None => PathBuf::from(prompter.ask(
            "Directory to save the SRPM file (leave empty for current directory)",
            Some("."),
        )?),
    };

    let srpm_dir = session.working_dir.join(srpm_dir);
    let srpm = with_spinner(
        (session.spinner)(),
        "Generating source RPM...",
        session.runner,
        |runner| srpm::generate(&spec_file, &srpm_dir, runner, &config.rpmbuild),
    )?;
    println!("SRPM generation complete: {}", srpm.display());

    copr.whoami().map_err(SubmitError::NotAuthenticated)?;

    let defaults = discover(session);
    println!("Detected default chroots: {}", defaults.join(" "));

    let extras = if chroots.is_empty() {
        vec![prompter.ask(
            "Additional chroots (space-separated) or press Enter to continue",
            None,
        )?]
    } else {
        chroots
    };

    let selected = with_extras(defaults, &extras);
    if selected.is_empty() {
        return Err(SubmitError::NoChroots);
    }
    println!("Selected chroots: {}", selected.join(" "));

    let project_name = match project {
        Some(project) => project,
        None => prompter.ask("Copr project name", None)?,
    };
    let project_name = project_name.trim();
    if project_name.is_empty() {
        return Err(SubmitError::EmptyProjectName);
    }

    let (project, provisioned) = provision(
        &copr,
        session.probe,
        config.copr_url(),
        project_name,
        &selected,
    )?;

    with_spinner(
        (session.spinner)(),
        "Submitting build...",
        session.runner,
        |runner| session.copr_with(runner).build(&project.to_string(), &srpm),
    )?;
    println!("Build submitted successfully!");

    Ok(Submission {
        spec_file,
        tarball,
        srpm,
        project,
        provisioned,
    })
}

/// Run `stage` while `progress` ticks with `message`.
///
/// The spinner is cleared whatever the stage outcome.
fn with_spinner<T, E>(
    progress: ProgressBar,
    message: &'static str,
    runner: &dyn Runner,
    stage: impl FnOnce(&dyn Runner) -> Result<T, E>,
) -> Result<T, E> {
    progress.enable_steady_tick(TICK_PERIOD);
    progress.set_message(message);

    let result = stage(&Suspending {
        runner,
        progress: &progress,
    });

    progress.finish_and_clear();
    result
}

/// [`Runner`] hiding a spinner while a program shares the terminal with it.
struct Suspending<'a> {
    /// Wrapped runner.
    runner: &'a dyn Runner,

    /// Spinner to hide.
    progress: &'a ProgressBar,
}

impl Runner for Suspending<'_> {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ProcessError> {
        if invocation.quiet {
            return self.runner.run(invocation);
        }

        self.progress.suspend(|| self.runner.run(invocation))
    }
}
