use std::{
    fs, io,
    path::{Path, PathBuf},
};

use derive_more::{Display, Error, From};
use tempfile::PersistError;
use tracing::info;

use crate::process::{Invocation, ProcessError, Runner};

/// URL schemes that are fetched with the download tool.
const REMOTE_SCHEMES: [&str; 3] = ["http://", "https://", "ftp://"];

/// Source acquisition errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum SourceError {
    /// IO-related error.
    Io(io::Error),

    /// Download tool error.
    Process(ProcessError),

    /// Unable to move the downloaded file onto its final location.
    PersistError(PersistError),

    /// Referenced local file does not exist.
    #[display(fmt = "source file '{}' not found", _0)]
    #[from(ignore)]
    Missing(#[error(ignore)] String),

    /// Unable to derive a file name from the source reference.
    #[display(fmt = "unable to determine file name of source '{}'", _0)]
    #[from(ignore)]
    NoFileName(#[error(ignore)] String),
}

/// Primary source reference of a spec file.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SourceRef {
    /// Archive to be downloaded.
    Remote(String),

    /// Archive on the local filesystem.
    Local(PathBuf),
}

impl SourceRef {
    /// Classify a raw `Source0` value.
    pub fn parse(value: &str) -> Self {
        if REMOTE_SCHEMES.iter().any(|scheme| value.starts_with(scheme)) {
            Self::Remote(value.to_owned())
        } else {
            Self::Local(PathBuf::from(value))
        }
    }
}

/// Last path segment of `url`, without the query and fragment parts.
fn url_file_name(url: &str) -> Option<&str> {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
}

/// Put the referenced archive into `sources_dir`, returning its new path.
///
/// Remote archives are fetched with `downloader` into a temporary file
/// next to their destination. Relative local paths are resolved against
/// `working_dir`.
pub(crate) fn acquire(
    source: &SourceRef,
    working_dir: &Path,
    sources_dir: &Path,
    runner: &dyn Runner,
    downloader: &str,
) -> Result<PathBuf, SourceError> {
    fs::create_dir_all(sources_dir)?;

    match source {
        SourceRef::Remote(url) => {
            let name = url_file_name(url).ok_or_else(|| SourceError::NoFileName(url.clone()))?;
            let destination = sources_dir.join(name);

            info!(%url, "downloading source archive");

            let download = tempfile::Builder::new()
                .prefix(".download-")
                .tempfile_in(sources_dir)?;

            runner.run_checked(
                &Invocation::new(downloader)
                    .arg("-O")
                    .arg(download.path().to_string_lossy())
                    .arg(url.as_str()),
            )?;

            download.persist(&destination)?;

            Ok(destination)
        }
        SourceRef::Local(path) => {
            let path = working_dir.join(path);

            if !path.is_file() {
                return Err(SourceError::Missing(path.display().to_string()));
            }

            let name = path
                .file_name()
                .ok_or_else(|| SourceError::NoFileName(path.display().to_string()))?;
            let destination = sources_dir.join(name);

            if destination.exists() && path.canonicalize()? == destination.canonicalize()? {
                info!(source = %path.display(), "source archive already in place");
                return Ok(destination);
            }

            info!(source = %path.display(), "copying source archive");

            fs::copy(&path, &destination)?;

            Ok(destination)
        }
    }
}
