//! Tar member extraction
//!
//! The Tatoeba links export ships as a tar archive inside the bz2 layer.
//! Extraction streams the tar entries, copies the requested member into a
//! caller-provided scoped temp directory, and returns the opened file.
//! The temp directory handle is owned by the caller and released on drop
//! regardless of exit path; nothing touches the process working
//! directory.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;

/// Errors from archive extraction
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("archive member not found: {0}")]
    MemberNotFound(String),
}

/// Extract a single named member from a tar stream into `dir`.
///
/// Matches on the member's file name (archives may nest it under a
/// directory). Returns the extracted file opened for reading.
pub fn extract_member<R: Read>(
    reader: R,
    member_name: &str,
    dir: &TempDir,
) -> Result<File, ArchiveError> {
    let mut archive = tar::Archive::new(reader);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let matches = {
            let path = entry.path()?;
            path.file_name()
                .map(|n| n == Path::new(member_name).as_os_str())
                .unwrap_or(false)
        };
        if !matches {
            continue;
        }

        let target = dir.path().join(member_name);
        let mut out = File::create(&target)?;
        let copied = io::copy(&mut entry, &mut out)?;
        debug!("extracted {} ({} bytes)", member_name, copied);
        return Ok(File::open(&target)?);
    }

    Err(ArchiveError::MemberNotFound(member_name.to_string()))
}
