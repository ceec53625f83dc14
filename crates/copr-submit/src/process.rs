use std::{
    fmt, io,
    process::{Command, Stdio},
};

use derive_more::{Display, Error, From};
use tracing::debug;

/// Errors that may occur while running an external program.
#[derive(Debug, Display, From, Error)]
pub(crate) enum ProcessError {
    /// IO-related error.
    Io(io::Error),

    /// [`which`] crate was unable to determine location of the program binary file.
    #[display(fmt = "unable to locate {}: {}", program, source)]
    #[from(ignore)]
    ToolNotFound {
        /// Program name as it was requested.
        program: String,

        /// Lookup error.
        source: which::Error,
    },

    /// Program finished with a non-zero exit status.
    #[display(fmt = "`{}` failed with {}", command, status)]
    #[from(ignore)]
    Failed {
        /// Rendered command line.
        command: String,

        /// Human-readable exit status.
        status: String,
    },
}

/// A single external program call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Invocation {
    /// Program name, resolved through `PATH`.
    pub program: String,

    /// Arguments passed to the program.
    pub args: Vec<String>,

    /// Discard standard error instead of forwarding it to the terminal.
    pub quiet: bool,
}

impl Invocation {
    /// Create a new invocation without any arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            quiet: false,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Mark the invocation as quiet.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;

        for arg in &self.args {
            write!(f, " {arg}")?;
        }

        Ok(())
    }
}

/// Result of a finished program.
#[derive(Clone, Debug, Default)]
pub(crate) struct CommandOutput {
    /// Exit code, if the program was not terminated by a signal.
    pub code: Option<i32>,

    /// Captured standard output.
    pub stdout: String,
}

impl CommandOutput {
    /// Successful output with the provided standard output.
    #[cfg(test)]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
        }
    }

    /// Failed output with the provided exit code.
    #[cfg(test)]
    pub fn failure(code: i32) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
        }
    }

    /// Check whether the program exited with a zero status.
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit status into [`ProcessError::Failed`].
    pub fn check(self, invocation: &Invocation) -> Result<Self, ProcessError> {
        if self.is_success() {
            return Ok(self);
        }

        let status = match self.code {
            Some(code) => format!("exit status {code}"),
            None => String::from("a signal"),
        };

        Err(ProcessError::Failed {
            command: invocation.to_string(),
            status,
        })
    }
}

/// Executor of external programs.
///
/// Every call blocks until the program exits.
pub(crate) trait Runner {
    /// Run the program and wait for its completion.
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ProcessError>;

    /// Run the program and fail on a non-zero exit status.
    fn run_checked(&self, invocation: &Invocation) -> Result<CommandOutput, ProcessError> {
        self.run(invocation)?.check(invocation)
    }
}

/// [`Runner`] implementation that spawns real processes.
pub(crate) struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ProcessError> {
        let program =
            which::which(&invocation.program).map_err(|source| ProcessError::ToolNotFound {
                program: invocation.program.clone(),
                source,
            })?;

        debug!(command = %invocation, "spawning");

        let output = Command::new(program)
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(if invocation.quiet {
                Stdio::null()
            } else {
                Stdio::inherit()
            })
            .spawn()?
            .wait_with_output()?;

        debug!(command = %invocation, code = ?output.status.code(), "finished");

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandOutput, Invocation, ProcessError};

    #[test]
    fn invocation_renders_as_command_line() {
        let invocation = Invocation::new("copr-cli")
            .arg("modify")
            .args(["user/project", "--chroot", "fedora-39-x86_64"]);

        assert_eq!(
            invocation.to_string(),
            "copr-cli modify user/project --chroot fedora-39-x86_64"
        );
    }

    #[test]
    fn failed_output_reports_command() {
        let invocation = Invocation::new("rpmbuild").arg("-bs");

        let error = CommandOutput::failure(1).check(&invocation).unwrap_err();

        assert!(matches!(error, ProcessError::Failed { .. }));
        assert_eq!(error.to_string(), "`rpmbuild -bs` failed with exit status 1");
    }

    #[test]
    fn signal_termination_is_failure() {
        let output = CommandOutput {
            code: None,
            stdout: String::new(),
        };

        assert!(!output.is_success());
        assert!(output.check(&Invocation::new("wget")).is_err());
    }
}
