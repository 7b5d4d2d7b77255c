use super::{CancelCause, Deadline, HandlerContext};
use crate::headers::HeaderList;

/// The transport's side of a call.
///
/// Only the controller can fire the cancellation signal and freeze the
/// response metadata; the handler never sees it.
#[derive(Debug, Clone)]
pub struct CallController {
    context: HandlerContext,
}

impl CallController {
    pub(crate) fn new(context: HandlerContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &HandlerContext {
        &self.context
    }

    pub fn deadline(&self) -> Deadline {
        self.context.deadline()
    }

    /// Fires the call's cancellation signal.
    ///
    /// Returns `false` when the signal had already fired; the first cause
    /// sticks.
    pub fn cancel(&self, cause: CancelCause) -> bool {
        let fired = self.context.inner.signal.fire(cause);
        if fired {
            tracing::debug!(
                "Call {} ({}) cancelled: {:?}",
                self.context.call_id(),
                self.context.method().path(),
                cause
            );
        }
        fired
    }

    pub fn is_cancelled(&self) -> bool {
        self.context.is_cancelled()
    }

    /// The cause the signal fired with, regardless of the cancellation mode.
    pub fn cause(&self) -> Option<CancelCause> {
        self.context.inner.signal.cause()
    }

    /// Freezes the outbound headers and returns them.
    ///
    /// Calling this again returns the same snapshot.
    pub fn freeze_headers(&self) -> HeaderList {
        let mut response = self.context.lock_response();
        response.headers_frozen = true;
        response.headers.clone()
    }

    pub fn headers_frozen(&self) -> bool {
        self.context.headers_sent()
    }

    /// Freezes the outbound trailers and returns them.
    ///
    /// This ends the call: `on_cancel` callbacks that have not run are
    /// dropped.
    pub fn freeze_trailers(&self) -> HeaderList {
        self.context.inner.signal.release();
        let mut response = self.context.lock_response();
        response.headers_frozen = true;
        response.trailers_frozen = true;
        response.trailers.clone()
    }
}
