//! File-backed entry points: reading an upload and saving the download.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::core::{BlobStore, Session, SourceImage};
use crate::utils::{ReducerError, ReducerResult, format_bytes, mime_from_path};

/// Reads `path` and hands it to the session as an upload.
///
/// The MIME type is inferred from the extension, as a file picker would.
pub async fn open_image<'a, S: BlobStore>(
    session: &'a mut Session<S>,
    path: impl AsRef<Path>,
) -> ReducerResult<&'a SourceImage> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .await
        .map_err(|e| ReducerError::IO(format!("Cannot read {}: {}", path.display(), e)))?;
    let mime = mime_from_path(path);

    debug!("Read {} ({}, {})", path.display(), mime, format_bytes(bytes.len() as u64));
    session.select_image(&bytes, mime)
}

/// Writes the displayed result to `destination`.
///
/// When `destination` is a directory the suggested filename is appended.
/// Returns the path written.
pub async fn save_result<S: BlobStore>(
    session: &Session<S>,
    destination: impl AsRef<Path>,
) -> ReducerResult<PathBuf> {
    let result = session.result().ok_or_else(|| {
        ReducerError::invalid_transition(session.view(), "save a result")
    })?;

    let destination = destination.as_ref();
    let path = match fs::metadata(destination).await {
        Ok(meta) if meta.is_dir() => destination.join(&result.filename),
        _ => destination.to_path_buf(),
    };

    let bytes = session.store().fetch(&result.handle)?;
    fs::write(&path, &bytes[..]).await?;

    info!("Saved {} to {}", format_bytes(bytes.len() as u64), path.display());
    Ok(path)
}
