use std::path::{Path, PathBuf};
use tokio::{
    fs::File,
    io::{self, AsyncRead, AsyncWriteExt},
};
use tracing::info;

use crate::{error::AppError, sanitize::sanitize_filename};

#[derive(Debug)]
pub struct StoredUpload {
    /// Sanitized name, relative to the root it was written into.
    pub name: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Writes `reader` to `root/<sanitized name>`, truncating any existing file.
///
/// The copy is not atomic: a stream that fails midway leaves the bytes
/// written so far on disk.
pub async fn store_upload<R>(
    root: &Path,
    raw_name: &str,
    reader: &mut R,
) -> Result<StoredUpload, AppError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let name = sanitize_filename(raw_name);
    if name.is_empty() || name == "." {
        return Err(AppError::BadRequest(format!(
            "Invalid upload filename: {:?}",
            raw_name
        )));
    }

    let path = root.join(&name);
    let mut file = File::create(&path).await?;
    let bytes = io::copy(reader, &mut file).await?;
    file.flush().await?;

    info!("Stored upload {} ({} bytes)", path.display(), bytes);

    Ok(StoredUpload { name, path, bytes })
}
