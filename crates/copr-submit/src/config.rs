use std::{
    fs::{self, OpenOptions, Permissions},
    io::{self, Write},
    os::unix::fs::{OpenOptionsExt, PermissionsExt},
    path::{Path, PathBuf},
};

use common::config::Logging;
use derive_more::{Display, Error, From};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// The permission the credentials file should have.
const CREDENTIALS_FILE_MODE: u32 = 0o600;

/// Configuration errors.
#[derive(Debug, Display, From, Error)]
pub enum ConfigError {
    /// Unable to load the configuration using [`figment`].
    Figment(figment::Error),

    /// IO-related error.
    Io(io::Error),

    /// User's home directory cannot be determined.
    #[display(fmt = "unable to find home directory")]
    HomeDirNotFound,
}

/// Chroot catalog filter used to pick the default build targets.
#[derive(Clone, Deserialize)]
pub struct ChrootFilter {
    /// Platform name prefix, including the trailing dash.
    #[serde(default = "default_platform_prefix")]
    pub platform_prefix: String,

    /// CPU architecture suffix, without the leading dash.
    #[serde(default = "default_architecture")]
    pub architecture: String,
}

impl Default for ChrootFilter {
    fn default() -> Self {
        Self {
            platform_prefix: default_platform_prefix(),
            architecture: default_architecture(),
        }
    }
}

/// Tool configuration.
#[derive(Deserialize)]
pub struct SubmitConfig {
    /// Copr frontend URL, without the trailing slash.
    #[serde(default = "default_copr_url")]
    pub copr_url: String,

    /// Copr command-line client.
    #[serde(default = "default_copr_cli")]
    pub copr_cli: String,

    /// Source RPM build tool.
    #[serde(default = "default_rpmbuild")]
    pub rpmbuild: String,

    /// Download tool, called as `<downloader> -O <file> <url>`.
    #[serde(default = "default_downloader")]
    pub downloader: String,

    /// Copr client credentials file.
    ///
    /// Defaults to `~/.config/copr`.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,

    /// Directory where source archives are collected.
    ///
    /// Defaults to `~/rpmbuild/SOURCES`.
    #[serde(default)]
    pub sources_dir: Option<PathBuf>,

    /// Default chroot selection.
    #[serde(default)]
    pub chroots: ChrootFilter,

    /// Logging configuration.
    #[serde(default)]
    pub logging: Logging,
}

fn default_copr_url() -> String {
    String::from("https://copr.fedorainfracloud.org")
}

fn default_copr_cli() -> String {
    String::from("copr-cli")
}

fn default_rpmbuild() -> String {
    String::from("rpmbuild")
}

fn default_downloader() -> String {
    String::from("wget")
}

fn default_platform_prefix() -> String {
    String::from("fedora-")
}

fn default_architecture() -> String {
    String::from("x86_64")
}

impl SubmitConfig {
    /// Create new config using the provided configuration file and environment variables.
    ///
    /// See [`Env`] for more details on how to use environment variables configuration.
    ///
    /// [`Env`]: figment::providers::Env
    pub fn new(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::figment(path).extract()?)
    }

    /// Configuration sources, in the order of increasing priority.
    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("COPR_SUBMIT_").split("__"))
    }

    /// Resolved credentials file path.
    pub fn credentials_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.credentials_path {
            Some(path) => Ok(path.clone()),
            None => home_relative(".config/copr"),
        }
    }

    /// Resolved source archive directory.
    pub fn sources_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.sources_dir {
            Some(path) => Ok(path.clone()),
            None => home_relative("rpmbuild/SOURCES"),
        }
    }

    /// Copr frontend URL with any trailing slashes removed.
    pub fn copr_url(&self) -> &str {
        self.copr_url.trim_end_matches('/')
    }
}

/// Join `path` onto the current user's home directory.
fn home_relative(path: &str) -> Result<PathBuf, ConfigError> {
    let mut home_dir = home::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
    home_dir.push(path);
    Ok(home_dir)
}

/// Copr client credentials, as read by `copr-cli`.
pub struct CoprCredentials {
    /// API token name.
    pub login: String,

    /// Copr account name.
    pub username: String,

    /// API token value.
    pub token: String,

    /// Copr frontend URL.
    pub copr_url: String,
}

impl CoprCredentials {
    /// Render the credentials in the INI format understood by `copr-cli`.
    pub fn to_ini(&self) -> String {
        format!(
            "[copr-cli]\nlogin = {}\nusername = {}\ntoken = {}\ncopr_url = {}\n",
            self.login, self.username, self.token, self.copr_url
        )
    }

    /// Write the credentials to `path`, readable and writable by the owner only.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // An existing file keeps its mode on open, so tighten it first.
        if path.exists() {
            fs::set_permissions(path, Permissions::from_mode(CREDENTIALS_FILE_MODE))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(CREDENTIALS_FILE_MODE)
            .open(path)?;

        file.write_all(self.to_ini().as_bytes())?;

        Ok(())
    }
}
