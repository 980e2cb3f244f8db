/*!
Scoped writes of generated files.
*/

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to create output directory '{}'", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write output file '{}'", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to replace output file '{}'", path.display()))]
    PersistFile {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

/// Writes `contents` to `path` through a temporary file in the same directory.
///
/// Missing parent directories are created. The target is only replaced once
/// the whole contents have been flushed, so a failure keeps any old file.
pub fn write_atomically(path: impl AsRef<Path>, contents: &str) -> Result<(), Error> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&dir).context(CreateDir { path: &dir })?;

    let mut file = NamedTempFile::new_in(&dir).context(WriteFile { path })?;
    file.write_all(contents.as_bytes())
        .and_then(|_| file.as_file().sync_all())
        .context(WriteFile { path })?;
    file.persist(path).context(PersistFile { path })?;

    debug!("Wrote {} bytes to '{}'", contents.len(), path.display());
    Ok(())
}
