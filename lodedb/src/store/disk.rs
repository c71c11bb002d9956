//! File helpers shared by the document store and the index store.
//!
//! Every helper returns a [LodeResult]; the stores decide whether a failure is
//! logged and swallowed or surfaced.

use crate::errors::LodeResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

/// Serializes `value` as JSON and writes it to `path`, creating parent
/// directories as needed.
///
/// The text goes to a sibling temporary file first and is then renamed over
/// `path`, so a reader never observes a half-written file.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> LodeResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let text = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };

    let tmp = tmp_path(path);
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads and parses a JSON file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> LodeResult<T> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Removes a file; a file that is already gone is not an error.
pub(crate) fn remove_file(path: &Path) -> LodeResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == IoErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Removes a directory tree; a directory that is already gone is not an error.
pub(crate) fn remove_dir_all(path: &Path) -> LodeResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == IoErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Lists the immediate subdirectories of `path`. A missing `path` lists as
/// empty.
pub(crate) fn list_dirs(path: &Path) -> LodeResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(dirs),
        Err(err) => return Err(err.into()),
    };
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

/// Lists the regular files directly inside `path` that carry `extension`.
pub(crate) fn list_files(path: &Path, extension: &str) -> LodeResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_path = entry.path();
        if entry.file_type()?.is_file()
            && file_path.extension().and_then(|e| e.to_str()) == Some(extension)
        {
            files.push(file_path);
        }
    }
    Ok(files)
}

/// Sums the sizes of every file below `path`.
pub(crate) fn dir_size(path: &Path) -> LodeResult<u64> {
    let mut total = 0;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            total += dir_size(&entry.path())?;
        } else if file_type.is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

/// The name of a directory or file, as UTF-8.
pub(crate) fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

/// The name of a file with its extension removed, as UTF-8.
pub(crate) fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
