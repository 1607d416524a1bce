//! The screen state machine.
//!
//! Exactly one [`ViewState`] is active. Each variant carries the data its
//! screen needs, so e.g. a Download view cannot exist without its result.

use std::fmt;
use std::sync::Arc;
use serde::Serialize;

use crate::core::{CompressionRequest, CompressionResult, SourceImage};
use crate::utils::{OutputFormat, ReducerError, ReducerResult};

/// Which screen is shown, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum View {
    Upload,
    Options,
    Loading,
    Download,
    Contact,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Upload => "Upload",
            Self::Options => "Options",
            Self::Loading => "Loading",
            Self::Download => "Download",
            Self::Contact => "Contact",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct OptionsState {
    pub source: Arc<SourceImage>,
    pub output_format: OutputFormat,
}

#[derive(Debug)]
pub struct LoadingState {
    pub source: Arc<SourceImage>,
    pub request: CompressionRequest,
}

#[derive(Debug, Default)]
pub enum ViewState {
    #[default]
    Upload,
    Options(OptionsState),
    Loading(LoadingState),
    Download(Box<CompressionResult>),
    Contact,
}

/// Inputs that move the state machine.
#[derive(Debug)]
pub enum ViewEvent {
    ImageAccepted(Arc<SourceImage>),
    CompressionRequested(CompressionRequest),
    SearchCompleted(CompressionResult),
    SearchFailed,
    StartOver,
    ContactRequested,
    Back,
    Home,
}

impl ViewEvent {
    fn action(&self) -> &'static str {
        match self {
            Self::ImageAccepted(_) => "accept an image",
            Self::CompressionRequested(_) => "start compression",
            Self::SearchCompleted(_) => "show a result",
            Self::SearchFailed => "abort compression",
            Self::StartOver => "start over",
            Self::ContactRequested => "open contact",
            Self::Back => "go back",
            Self::Home => "go home",
        }
    }
}

impl ViewState {
    pub fn view(&self) -> View {
        match self {
            Self::Upload => View::Upload,
            Self::Options(_) => View::Options,
            Self::Loading(_) => View::Loading,
            Self::Download(_) => View::Download,
            Self::Contact => View::Contact,
        }
    }

    /// Applies `event`, returning the result evicted from a Download view.
    ///
    /// The caller owns the evicted result and must release its handle.
    /// An event the current view does not accept leaves the state untouched.
    pub fn apply(&mut self, event: ViewEvent) -> ReducerResult<Option<CompressionResult>> {
        let current = std::mem::take(self);

        let (next, evicted) = match (current, event) {
            (Self::Upload, ViewEvent::ImageAccepted(source)) => {
                let output_format = source.format;
                (
                    Self::Options(OptionsState {
                        source,
                        output_format,
                    }),
                    None,
                )
            }
            (Self::Options(options), ViewEvent::CompressionRequested(request)) => (
                Self::Loading(LoadingState {
                    source: options.source,
                    request,
                }),
                None,
            ),
            (Self::Loading(_), ViewEvent::SearchCompleted(result)) => {
                (Self::Download(Box::new(result)), None)
            }
            (Self::Loading(_), ViewEvent::SearchFailed) => (Self::Upload, None),
            (Self::Download(result), ViewEvent::StartOver) => (Self::Upload, Some(*result)),
            (Self::Contact, ViewEvent::Back) => (Self::Upload, None),
            (state, ViewEvent::ContactRequested) => (Self::Contact, state.into_result()),
            (state, ViewEvent::Home) => (Self::Upload, state.into_result()),
            (state, event) => {
                let err = ReducerError::invalid_transition(state.view(), event.action());
                *self = state;
                return Err(err);
            }
        };

        *self = next;
        Ok(evicted)
    }

    pub(crate) fn into_result(self) -> Option<CompressionResult> {
        match self {
            Self::Download(result) => Some(*result),
            _ => None,
        }
    }
}
