use std::io;

use derive_more::{Display, Error, From};
use tracing::info;

use crate::{
    commands::{Login, Session},
    config::{ConfigError, CoprCredentials},
    copr::CoprError,
};

/// `login` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum LoginError {
    /// Configuration error.
    Config(ConfigError),

    /// Copr client error.
    Copr(CoprError),

    /// Unable to read user input.
    #[display(fmt = "unable to read input: {}", _0)]
    Io(io::Error),
}

/// Authentication state after the credential setup.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Authentication {
    /// Existing credentials were accepted by Copr.
    Existing,

    /// New credentials were written.
    Configured {
        /// Whether Copr accepted the new credentials.
        verified: bool,
    },
}

/// Login flow entrypoint.
pub(crate) fn login(Login { force }: Login, session: &Session) -> Result<(), LoginError> {
    ensure_credentials(session, force)?;
    Ok(())
}

/// Make sure the Copr client has credentials, asking for them if needed.
///
/// Credentials are considered working when the credentials file exists and
/// the identity query succeeds. The result of the verification after writing
/// new credentials is only reported.
pub(crate) fn ensure_credentials(
    session: &Session,
    force: bool,
) -> Result<Authentication, LoginError> {
    let path = &session.credentials_path;
    let copr = session.copr();

    if !force && path.is_file() && copr.is_authenticated()? {
        println!("Copr CLI is already authenticated.");
        return Ok(Authentication::Existing);
    }

    let copr_url = session.config.copr_url();

    println!("Copr CLI is not authenticated. Let's set it up.");
    println!("Please visit {copr_url}/api and log in to retrieve your API token.");

    let prompter = session.prompter;

    let credentials = CoprCredentials {
        login: prompter.ask("Copr login (API token name)", None)?,
        username: prompter.ask("Copr username", None)?,
        token: prompter.ask_secret("Copr API token")?,
        copr_url: copr_url.to_owned(),
    };

    credentials.write(path)?;

    info!(path = %path.display(), "credentials written");
    println!("Copr authentication configured. Verifying...");

    let verified = match copr.whoami() {
        Ok(user) => {
            println!("Authenticated as {user}.");
            true
        }
        Err(error) => {
            println!("Copr still rejects the credentials ({error}), check {}.", path.display());
            false
        }
    };

    Ok(Authentication::Configured { verified })
}
