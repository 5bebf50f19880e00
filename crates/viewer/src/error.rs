use crate::generator::GeneratorError;

/// A graphics-backend call that reported an error.
#[derive(Debug, thiserror::Error)]
#[error("graphics call `{call}` failed: {message}")]
pub struct BackendError {
    /// Name of the backend operation, e.g. `upload_rgb`.
    pub call: &'static str,
    pub message: String,
}

impl BackendError {
    pub fn new(call: &'static str, message: impl Into<String>) -> Self {
        Self {
            call,
            message: message.into(),
        }
    }
}

/// Failures surfaced by the viewer.
///
/// Only the lifecycle variants ever reach the caller of
/// [`Viewer::initialize`](crate::Viewer::initialize) or
/// [`Viewer::open`](crate::Viewer::open); everything raised while the loop is
/// running is logged and contained to the frame or callback that produced it.
///
/// There is no "not initialised", "null generator" or "allocation failed"
/// case: a [`Viewer`](crate::Viewer) only exists after a successful
/// `initialize`, it holds a `&mut` borrow of the generator, and its state is
/// an ordinary owned value.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("a viewer is already live in this process")]
    AlreadyInitialized,
    #[error("monotonic clock could not be sampled")]
    ClockUnavailable,
    #[error("viewer dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error(transparent)]
    BackendCallFailure(#[from] BackendError),
    #[error("generator handler `{name}` failed")]
    GeneratorHandlerFailure {
        name: String,
        #[source]
        source: GeneratorError,
    },
    #[error(transparent)]
    Platform(#[from] anyhow::Error),
}

/// Renders an error and its sources as `outer: inner: root`.
pub(crate) fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
