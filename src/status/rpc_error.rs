use super::Code;
use crate::headers::HeaderList;
use std::fmt;
use std::io;

/// The failure a handler reports for a call.
///
/// An `RpcError` becomes the call's terminal status. Any `metadata` attached
/// to it is merged into the response trailers when the call ends.
#[derive(Debug, Clone)]
pub struct RpcError {
    pub code: Code,
    pub message: String,
    pub metadata: HeaderList,
}

impl RpcError {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            metadata: HeaderList::new(),
        }
    }

    pub fn canceled() -> Self {
        Self::new(Code::Canceled, "call canceled")
    }

    pub fn deadline_exceeded() -> Self {
        Self::new(Code::DeadlineExceeded, "deadline exceeded")
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(Code::Unimplemented, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    /// A request message could not be decoded.
    pub fn from_decode(err: io::Error) -> Self {
        Self::invalid_argument(format!("failed to decode request: {err}"))
    }

    /// A response message could not be encoded.
    pub fn from_encode(err: io::Error) -> Self {
        Self::internal(format!("failed to encode response: {err}"))
    }

    /// Attaches a metadata entry that is delivered with the trailers.
    ///
    /// Invalid names or values are dropped.
    pub fn with_metadata(mut self, name: &str, value: &str) -> Self {
        if let Err(err) = self.metadata.append(name, value) {
            tracing::warn!("Dropping error metadata `{}`: {}", name, err);
        }
        self
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "[{}]", self.code)
        } else {
            write!(f, "[{}] {}", self.code, self.message)
        }
    }
}

impl std::error::Error for RpcError {}

impl From<Code> for RpcError {
    fn from(code: Code) -> Self {
        RpcError::new(code, String::new())
    }
}
