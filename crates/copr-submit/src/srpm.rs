use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use derive_more::{Display, Error, From};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::process::{Invocation, ProcessError, Runner};

/// Source RPM file name suffix.
const SRPM_SUFFIX: &str = ".src.rpm";

/// Prefix of the lines `rpmbuild` uses to report written packages.
const WROTE_PREFIX: &str = "Wrote:";

/// SRPM generation errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum SrpmError {
    /// IO-related error.
    Io(io::Error),

    /// [`walkdir`]-crate specific error.
    WalkDir(walkdir::Error),

    /// Build tool error.
    #[display(fmt = "SRPM generation failed: {}", _0)]
    Process(ProcessError),

    /// Build tool succeeded, but no source package can be found.
    #[display(fmt = "SRPM generation failed: no source package in {}", _0)]
    NoPackage(#[error(ignore)] String),
}

/// Build a source RPM from `spec_file` into `output_dir`.
///
/// The package path is taken from the build tool's own report. When the
/// report is unusable, the newest source RPM in `output_dir` is picked.
pub(crate) fn generate(
    spec_file: &Path,
    output_dir: &Path,
    runner: &dyn Runner,
    rpmbuild: &str,
) -> Result<PathBuf, SrpmError> {
    fs::create_dir_all(output_dir)?;

    let output_dir = output_dir.canonicalize()?;

    let output = runner.run_checked(
        &Invocation::new(rpmbuild)
            .arg("-bs")
            .arg(spec_file.to_string_lossy())
            .arg("--define")
            .arg(format!("_srcrpmdir {}", output_dir.display())),
    )?;

    if let Some(path) = reported_srpm(&output.stdout).filter(|path| path.is_file()) {
        debug!(path = %path.display(), "build tool reported source package");
        return Ok(path);
    }

    warn!("build tool did not report a source package, picking the newest one");

    newest_srpm(&output_dir)?
        .ok_or_else(|| SrpmError::NoPackage(output_dir.display().to_string()))
}

/// Last source RPM path reported on a `Wrote:` line.
fn reported_srpm(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .filter_map(|line| line.trim().strip_prefix(WROTE_PREFIX))
        .map(str::trim)
        .filter(|path| path.ends_with(SRPM_SUFFIX))
        .last()
        .map(PathBuf::from)
}

/// Most recently modified source RPM directly inside `dir`.
fn newest_srpm(dir: &Path) -> Result<Option<PathBuf>, SrpmError> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;

        let is_srpm = entry
            .file_name()
            .to_str()
            .map_or(false, |name| name.ends_with(SRPM_SUFFIX));

        if !is_srpm || !entry.file_type().is_file() {
            continue;
        }

        let modified = entry.metadata()?.modified()?;

        if newest.as_ref().map_or(true, |(time, _)| modified > *time) {
            newest = Some((modified, entry.into_path()));
        }
    }

    Ok(newest.map(|(_, path)| path))
}
