use std::{fmt, path::Path};

use derive_more::{Display, Error, From};
use reqwest::{blocking::Client, redirect::Policy, StatusCode};
use tracing::{debug, warn};

use crate::process::{Invocation, ProcessError, Runner};

/// Copr client errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum CoprError {
    /// External program error.
    Process(ProcessError),

    /// HTTP client error.
    #[display(fmt = "unable to reach Copr: {}", _0)]
    Http(reqwest::Error),

    /// Identity query returned nothing.
    #[display(fmt = "Copr did not report the current user name")]
    EmptyIdentity,
}

/// Remote project identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ProjectRef {
    /// Project owner.
    pub owner: String,

    /// Project name.
    pub name: String,
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Thin wrapper around the Copr command-line client.
pub(crate) struct Copr<'a> {
    /// Program runner.
    runner: &'a dyn Runner,

    /// Copr client program name.
    program: &'a str,

    /// Credentials file passed to every client call.
    credentials: &'a Path,
}

impl<'a> Copr<'a> {
    /// Create a new client calling `program` through `runner`, authenticated
    /// with the `credentials` file.
    pub fn new(runner: &'a dyn Runner, program: &'a str, credentials: &'a Path) -> Self {
        Self {
            runner,
            program,
            credentials,
        }
    }

    /// Base invocation of the Copr client.
    fn command(&self, subcommand: &str) -> Invocation {
        let credentials = self.credentials.to_string_lossy();

        Invocation::new(self.program).args(["--config", &*credentials, subcommand])
    }

    /// Check whether the client is able to authenticate.
    pub fn is_authenticated(&self) -> Result<bool, CoprError> {
        Ok(self
            .runner
            .run(&self.command("whoami").quiet())?
            .is_success())
    }

    /// Name of the authenticated user.
    pub fn whoami(&self) -> Result<String, CoprError> {
        let output = self.runner.run_checked(&self.command("whoami").quiet())?;
        let user = output.stdout.trim();

        if user.is_empty() {
            return Err(CoprError::EmptyIdentity);
        }

        Ok(user.to_owned())
    }

    /// Raw chroot catalog listing.
    ///
    /// Failures are logged and reported as [`None`].
    pub fn list_chroots(&self) -> Option<String> {
        match self.runner.run_checked(&self.command("list-chroots")) {
            Ok(output) => Some(output.stdout),
            Err(error) => {
                warn!(%error, "unable to list available chroots");
                None
            }
        }
    }

    /// Chroots currently enabled in `project`.
    ///
    /// Failures are logged and reported as an empty list.
    pub fn project_chroots(&self, project: &ProjectRef) -> Vec<String> {
        match self
            .runner
            .run_checked(&self.command("get-chroots").arg(project.to_string()))
        {
            Ok(output) => output.stdout.split_whitespace().map(String::from).collect(),
            Err(error) => {
                warn!(%error, %project, "unable to retrieve existing chroots");
                Vec::new()
            }
        }
    }

    /// Create `project` with the provided chroots.
    pub fn create(&self, project: &ProjectRef, chroots: &[String]) -> Result<(), CoprError> {
        let invocation = with_chroots(self.command("create").arg(project.to_string()), chroots);
        self.runner.run_checked(&invocation)?;
        Ok(())
    }

    /// Replace the chroot set of `project`.
    pub fn modify(&self, project: &ProjectRef, chroots: &[String]) -> Result<(), CoprError> {
        let invocation = with_chroots(self.command("modify").arg(project.to_string()), chroots);
        self.runner.run_checked(&invocation)?;
        Ok(())
    }

    /// Submit `srpm` for a build in `project`.
    pub fn build(&self, project: &str, srpm: &Path) -> Result<(), CoprError> {
        let invocation = self
            .command("build")
            .arg(project)
            .arg(srpm.to_string_lossy());
        self.runner.run_checked(&invocation)?;
        Ok(())
    }
}

/// Append a `--chroot <chroot>` pair per chroot.
fn with_chroots(invocation: Invocation, chroots: &[String]) -> Invocation {
    chroots.iter().fold(invocation, |invocation, chroot| {
        invocation.arg("--chroot").arg(chroot.as_str())
    })
}

/// Public project page on the Copr frontend.
pub(crate) fn project_url(copr_url: &str, project: &ProjectRef) -> String {
    format!("{copr_url}/coprs/{}/{}/", project.owner, project.name)
}

/// Project existence check.
pub(crate) trait ProjectProbe {
    /// Check whether the page at `url` answers with `200 OK`.
    fn exists(&self, url: &str) -> Result<bool, CoprError>;
}

/// [`ProjectProbe`] implementation issuing HTTP requests.
pub(crate) struct HttpProbe {
    /// HTTP client.
    client: Client,
}

impl HttpProbe {
    /// Create new probe. Redirects are not followed, so only the project page
    /// itself can answer `200 OK`.
    pub fn new() -> Result<Self, CoprError> {
        Ok(Self {
            client: Client::builder().redirect(Policy::none()).build()?,
        })
    }
}

impl ProjectProbe for HttpProbe {
    fn exists(&self, url: &str) -> Result<bool, CoprError> {
        let status = self.client.get(url).send()?.status();

        debug!(%url, %status, "probed project page");

        Ok(status == StatusCode::OK)
    }
}
