use crate::status::Code;
use std::fmt;

/// A schema could not be turned into descriptors.
///
/// These are configuration failures raised while the dispatch table is being
/// built, never while a call is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    UnknownMethodKind { method: String, tag: u8 },
    UnknownIdempotency { method: String, tag: u8 },
    DuplicateMethod(String),
}

impl DescriptorError {
    pub fn code(&self) -> Code {
        Code::Unimplemented
    }
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::UnknownMethodKind { method, tag } => {
                write!(f, "method {} has unknown call shape tag {}", method, tag)
            }
            DescriptorError::UnknownIdempotency { method, tag } => {
                write!(f, "method {} has unknown idempotency tag {}", method, tag)
            }
            DescriptorError::DuplicateMethod(method) => {
                write!(f, "method {} is declared more than once", method)
            }
        }
    }
}

impl std::error::Error for DescriptorError {}
