use std::{
    ffi::OsStr,
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use derive_more::{Display, Error, From};
use walkdir::WalkDir;

/// Extension of RPM spec files.
const SPEC_EXTENSION: &str = "spec";

/// Field label of the primary source archive.
const SOURCE0_LABEL: &str = "Source0:";

/// Spec file resolution errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum SpecFileError {
    /// IO-related error.
    Io(io::Error),

    /// [`walkdir`]-crate specific error.
    WalkDir(walkdir::Error),

    /// Neither the requested path nor the directory scan produced a spec file.
    #[display(fmt = "no valid spec file found")]
    NotFound,

    /// Spec file does not declare a primary source.
    #[display(fmt = "no Source0 found in spec file")]
    MissingSource0,
}

/// Resolve the spec file to build from.
///
/// A non-empty `requested` path is used verbatim (relative to `search_dir`), otherwise `search_dir`
/// is scanned (non-recursively) for `*.spec` files and the first one by
/// file name is picked. The result must be an existing regular file.
pub(crate) fn resolve(requested: &str, search_dir: &Path) -> Result<PathBuf, SpecFileError> {
    let candidate = if requested.is_empty() {
        find_spec_file(search_dir)?
    } else {
        Some(search_dir.join(requested))
    };

    candidate
        .filter(|path| path.is_file())
        .ok_or(SpecFileError::NotFound)
}

/// Find the first spec file in `dir`, ordered by file name.
fn find_spec_file(dir: &Path) -> Result<Option<PathBuf>, SpecFileError> {
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;

        if entry.file_type().is_file()
            && entry.path().extension().and_then(OsStr::to_str) == Some(SPEC_EXTENSION)
        {
            return Ok(Some(entry.into_path()));
        }
    }

    Ok(None)
}

/// Extract the `Source0:` reference from the spec file at `path`.
///
/// Only the first matching line is honored.
pub(crate) fn source0(path: &Path) -> Result<String, SpecFileError> {
    let reader = BufReader::new(File::open(path)?);

    for line in reader.lines() {
        let line = line?;

        if let Some(value) = line.strip_prefix(SOURCE0_LABEL) {
            return value
                .split_whitespace()
                .next()
                .map(String::from)
                .ok_or(SpecFileError::MissingSource0);
        }
    }

    Err(SpecFileError::MissingSource0)
}
