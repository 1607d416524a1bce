//! Command handler for target-size compression.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::{BlobStore, CompressionReport, Session, TargetSize};
use crate::processing::{Encoder, QualitySearch};
use crate::utils::{ReducerError, ReducerResult};

/// Compresses the current upload to fit `target`.
///
/// Validation happens first and leaves the session in Options on failure.
/// The search then runs on tokio's blocking pool while the session sits in
/// Loading; holding `&mut Session` for the whole call keeps a second request
/// from starting. A fatal encoder error returns the session to Upload.
///
/// # Arguments
/// * `session` - Session in the Options view
/// * `encoder` - Encode capability used for every search round
/// * `target` - Target size as entered by the user
///
/// # Returns
/// A report of the result now shown in the Download view.
pub async fn compress<S, E>(
    session: &mut Session<S>,
    encoder: Arc<E>,
    target: &TargetSize,
) -> ReducerResult<CompressionReport>
where
    S: BlobStore,
    E: Encoder + ?Sized + 'static,
{
    let request = session.prepare_request(target).inspect_err(|e| {
        debug!("Compression request rejected: {}", e);
    })?;

    let source = session.begin_compression(request)?;
    let search = QualitySearch::from_config(session.config());

    let outcome = tokio::task::spawn_blocking(move || {
        search.run(encoder.as_ref(), &source.pixels, request.format, request.target_bytes)
    })
    .await
    .map_err(|e| ReducerError::encoding(format!("Search task panicked: {e}")))
    .and_then(|result| result);

    match outcome {
        Ok(encoded) => {
            debug!(
                "Search finished ({:?}, {} rounds)",
                encoded.strategy,
                encoded.steps.len()
            );
            let result = session.complete_compression(encoded)?;
            Ok(result.report())
        }
        Err(e) => {
            warn!("Compression failed: {}", e);
            session.abort_compression()?;
            Err(e)
        }
    }
}
