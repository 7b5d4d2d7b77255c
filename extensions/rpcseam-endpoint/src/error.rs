use rpcseam::{Code, DescriptorError, MethodKind};
use std::fmt;

/// A handler could not be bound to a method.
///
/// Every variant is a configuration failure detected while the dispatch table
/// is assembled, before any call reaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The schema itself was rejected (e.g. an unknown call-shape tag).
    Descriptor(DescriptorError),

    /// The service descriptor has no method with this name.
    UnknownMethod { service: String, method: String },

    /// The handler's call shape differs from the one the descriptor declares.
    ShapeMismatch {
        procedure: String,
        declared: MethodKind,
        handler: MethodKind,
    },

    /// A typed method belongs to a different service than the descriptor.
    ServiceMismatch { expected: String, found: String },

    /// A typed method's message type differs from the descriptor's.
    TypeMismatch {
        procedure: String,
        expected: String,
        found: String,
    },

    /// A typed method's `METHOD_ID` is not the hash of its procedure path.
    MethodIdMismatch { procedure: String },

    /// The procedure already has a handler.
    AlreadyBound(String),
}

impl BindError {
    pub fn code(&self) -> Code {
        Code::Unimplemented
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::Descriptor(err) => write!(f, "invalid service schema: {}", err),
            BindError::UnknownMethod { service, method } => {
                write!(f, "service {} has no method {}", service, method)
            }
            BindError::ShapeMismatch {
                procedure,
                declared,
                handler,
            } => write!(
                f,
                "{} is declared {} but the handler is {}",
                procedure, declared, handler
            ),
            BindError::ServiceMismatch { expected, found } => {
                write!(f, "method belongs to {} but was bound against {}", found, expected)
            }
            BindError::TypeMismatch {
                procedure,
                expected,
                found,
            } => write!(
                f,
                "{} expects message type {} but the handler uses {}",
                procedure, expected, found
            ),
            BindError::MethodIdMismatch { procedure } => {
                write!(f, "METHOD_ID of {} does not match its path", procedure)
            }
            BindError::AlreadyBound(procedure) => {
                write!(f, "a handler for {} is already registered", procedure)
            }
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindError::Descriptor(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DescriptorError> for BindError {
    fn from(err: DescriptorError) -> Self {
        BindError::Descriptor(err)
    }
}
