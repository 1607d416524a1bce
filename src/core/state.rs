//! Session state: the active view plus the resources it owns.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::store::{BlobStore, MemoryStore};
use crate::core::view::{View, ViewEvent, ViewState};
use crate::core::{
    CompressionRequest, CompressionResult, CompressionSummary, ReducerConfig, SourceImage,
    TargetSize,
};
use crate::processing::{EncodedResult, decode_source};
use crate::utils::{
    OutputFormat, ReducerError, ReducerResult, ValidationError, format_bytes, parse_target_size,
    validate_target_budget,
};

/// One user session.
///
/// Owns the current [`ViewState`] and the store that issued the current
/// retrieval handle. Leaving the Download view, by any route, revokes that
/// handle; dropping the session does too.
pub struct Session<S: BlobStore = MemoryStore> {
    state: ViewState,
    store: S,
    config: ReducerConfig,
}

impl Session<MemoryStore> {
    /// Creates a session backed by an in-memory blob store.
    pub fn new(config: ReducerConfig) -> Self {
        Self::with_store(config, MemoryStore::new())
    }
}

impl Default for Session<MemoryStore> {
    fn default() -> Self {
        Self::new(ReducerConfig::default())
    }
}

impl<S: BlobStore> Session<S> {
    pub fn with_store(config: ReducerConfig, store: S) -> Self {
        Self {
            state: ViewState::default(),
            store,
            config,
        }
    }

    pub fn view(&self) -> View {
        self.state.view()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The image being worked on, while in Options or Loading.
    pub fn source(&self) -> Option<&Arc<SourceImage>> {
        match &self.state {
            ViewState::Options(options) => Some(&options.source),
            ViewState::Loading(loading) => Some(&loading.source),
            _ => None,
        }
    }

    /// The displayed result, while in Download.
    pub fn result(&self) -> Option<&CompressionResult> {
        match &self.state {
            ViewState::Download(result) => Some(&**result),
            _ => None,
        }
    }

    /// Accepts an upload: validates the MIME type, decodes, and moves to Options.
    ///
    /// Unsupported or undecodable input leaves the session in Upload.
    pub fn select_image(&mut self, bytes: &[u8], mime: &str) -> ReducerResult<&SourceImage> {
        if self.view() != View::Upload {
            return Err(ReducerError::invalid_transition(self.view(), "accept an image"));
        }

        let source = decode_source(bytes, mime).inspect_err(|e| {
            warn!("Rejected upload ({}): {}", mime, e);
        })?;

        info!(
            "Accepted {} image {}x{} ({})",
            source.mime_type,
            source.width(),
            source.height(),
            format_bytes(source.original_size)
        );

        self.dispatch(ViewEvent::ImageAccepted(Arc::new(source)))?;
        self.source()
            .map(|s| s.as_ref())
            .ok_or_else(|| ReducerError::invalid_transition(self.view(), "accept an image"))
    }

    /// Changes the output format chosen on the Options screen.
    pub fn set_output_format(&mut self, format: OutputFormat) -> ReducerResult<()> {
        match &mut self.state {
            ViewState::Options(options) => {
                debug!("Output format {} -> {}", options.output_format, format);
                options.output_format = format;
                Ok(())
            }
            other => Err(ReducerError::invalid_transition(
                other.view(),
                "change the output format",
            )),
        }
    }

    /// Output format currently selected on the Options screen.
    pub fn output_format(&self) -> Option<OutputFormat> {
        match &self.state {
            ViewState::Options(options) => Some(options.output_format),
            ViewState::Loading(loading) => Some(loading.request.format),
            ViewState::Download(result) => Some(result.format),
            _ => None,
        }
    }

    /// Validates the target size against the current upload.
    ///
    /// Never changes state: on error the session stays in Options.
    pub fn prepare_request(&self, target: &TargetSize) -> ReducerResult<CompressionRequest> {
        let ViewState::Options(options) = &self.state else {
            return Err(ReducerError::invalid_transition(self.view(), "start compression"));
        };

        let target_bytes = parse_target_size(target)?;
        let request = CompressionRequest::new(target_bytes, options.output_format, &options.source)?;
        Ok(request)
    }

    /// Options → Loading. Returns the source for the search to encode.
    ///
    /// The request is checked against the current upload and the selected
    /// format; a mismatch leaves the session in Options.
    pub fn begin_compression(&mut self, request: CompressionRequest) -> ReducerResult<Arc<SourceImage>> {
        if let ViewState::Options(options) = &self.state {
            validate_target_budget(request.target_bytes(), options.source.original_size)?;
            if request.format() != options.output_format {
                return Err(ValidationError::settings(format!(
                    "Requested format {} does not match the selected format {}",
                    request.format(),
                    options.output_format
                ))
                .into());
            }
        }

        self.dispatch(ViewEvent::CompressionRequested(request))?;
        match &self.state {
            ViewState::Loading(loading) => {
                info!(
                    "Compressing to {} as {}",
                    format_bytes(request.target_bytes),
                    request.format
                );
                Ok(Arc::clone(&loading.source))
            }
            other => Err(ReducerError::invalid_transition(other.view(), "start compression")),
        }
    }

    /// Loading → Download. Publishes the bytes and installs the new handle.
    pub fn complete_compression(&mut self, encoded: EncodedResult) -> ReducerResult<&CompressionResult> {
        let (original_size, format) = match &self.state {
            ViewState::Loading(loading) => (loading.source.original_size, loading.request.format),
            other => {
                return Err(ReducerError::invalid_transition(other.view(), "show a result"));
            }
        };

        let filename = format.suggested_filename();
        let bytes: Arc<[u8]> = Arc::from(encoded.bytes);
        let handle = match self.store.publish(Arc::clone(&bytes), &filename) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Could not publish result: {}", e);
                self.dispatch(ViewEvent::SearchFailed)?;
                return Err(e);
            }
        };

        let summary = CompressionSummary::new(original_size, bytes.len() as u64);
        for advisory in &encoded.advisories {
            warn!("{}", advisory);
        }
        info!(
            "{} → {} ({} saved)",
            summary.original_text(),
            summary.compressed_text(),
            summary.savings_text()
        );

        let result = CompressionResult {
            bytes,
            handle,
            filename,
            format,
            quality: encoded.quality,
            strategy: encoded.strategy,
            advisories: encoded.advisories,
            summary,
        };

        self.dispatch(ViewEvent::SearchCompleted(result))?;
        self.result()
            .ok_or_else(|| ReducerError::invalid_transition(self.view(), "show a result"))
    }

    /// Loading → Upload after a fatal encoding error.
    pub fn abort_compression(&mut self) -> ReducerResult<()> {
        self.dispatch(ViewEvent::SearchFailed)
    }

    /// Download → Upload ("start over" / "compress another").
    pub fn start_over(&mut self) -> ReducerResult<()> {
        self.dispatch(ViewEvent::StartOver)
    }

    /// Any view → Contact.
    pub fn open_contact(&mut self) -> ReducerResult<()> {
        self.dispatch(ViewEvent::ContactRequested)
    }

    /// Contact → Upload.
    pub fn back(&mut self) -> ReducerResult<()> {
        self.dispatch(ViewEvent::Back)
    }

    /// Any view → Upload, discarding the upload and any result.
    pub fn home(&mut self) -> ReducerResult<()> {
        self.dispatch(ViewEvent::Home)
    }

    fn dispatch(&mut self, event: ViewEvent) -> ReducerResult<()> {
        let from = self.view();
        let evicted = self.state.apply(event)?;
        debug!("View {} -> {}", from, self.view());

        if let Some(result) = evicted {
            self.release(result);
        }
        Ok(())
    }

    fn release(&mut self, result: CompressionResult) {
        let uri = result.handle.uri().to_string();
        match self.store.revoke(result.handle) {
            Ok(()) => debug!("Released {}", uri),
            Err(e) => warn!("Failed to release {}: {}", uri, e),
        }
    }
}

impl<S: BlobStore> Drop for Session<S> {
    fn drop(&mut self) {
        if let Some(result) = std::mem::take(&mut self.state).into_result() {
            self.release(result);
        }
    }
}
