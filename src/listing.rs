use chrono::prelude::*;
use std::{
    fs::Metadata,
    io::{self, ErrorKind},
    path::Path,
    time::SystemTime,
};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::AppError;

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub is_dir: bool,
    /// Bytes. Not meaningful for directories.
    pub size: u64,
    pub mod_time: String,
    /// Path relative to the source root, `/`-separated, no leading `./`.
    pub rel_path: String,
}

/// Enumerates the immediate children of `root/rel`, skipping dot-entries.
///
/// Directories come first, then files; each group is ordered by name.
pub async fn list_dir(root: &Path, rel: &str) -> Result<Vec<FileEntry>, AppError> {
    let full_path = root.join(rel);

    let mut reader = match fs::read_dir(&full_path).await {
        Ok(reader) => reader,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Listing target missing: {}", full_path.display());
            return Err(AppError::NotFound(rel.to_string()));
        }
        Err(e) => return Err(AppError::Io(e)),
    };

    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let name = match entry.file_name().into_string() {
            Ok(n) => n,
            Err(_) => {
                warn!(
                    "Skipping entry with non-UTF8 filename in {}",
                    full_path.display()
                );
                continue;
            }
        };

        if name.starts_with('.') {
            continue;
        }

        let metadata = match skip_vanished(entry.metadata().await)? {
            Some(metadata) => metadata,
            None => {
                debug!("Entry vanished while listing: {}", entry.path().display());
                continue;
            }
        };
        let rel_path = if rel == "." {
            name.clone()
        } else {
            format!("{}/{}", rel.trim_end_matches('/'), name)
        };

        entries.push(FileEntry {
            is_dir: metadata.is_dir(),
            size: metadata.len(),
            mod_time: metadata
                .modified()
                .map(format_mod_time)
                .unwrap_or_default(),
            name,
            rel_path,
        });
    }

    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));

    Ok(entries)
}

/// An entry removed between enumeration and `stat` is skipped, not an error.
fn skip_vanished(result: io::Result<Metadata>) -> Result<Option<Metadata>, AppError> {
    match result {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Io(e)),
    }
}

/// Formats a modification time in local time as `YYYY-MM-DD HH:MM:SS`.
pub fn format_mod_time(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}
