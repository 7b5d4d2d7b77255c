use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// The call shape of a method: how many messages flow in each direction.
///
/// This is a closed set. Every bound handler matches exactly one variant.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum MethodKind {
    Unary = 0,
    ServerStreaming = 1,
    ClientStreaming = 2,
    BiDiStreaming = 3,
}

impl MethodKind {
    pub fn has_streaming_input(self) -> bool {
        matches!(self, MethodKind::ClientStreaming | MethodKind::BiDiStreaming)
    }

    pub fn has_streaming_output(self) -> bool {
        matches!(self, MethodKind::ServerStreaming | MethodKind::BiDiStreaming)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MethodKind::Unary => "unary",
            MethodKind::ServerStreaming => "server_streaming",
            MethodKind::ClientStreaming => "client_streaming",
            MethodKind::BiDiStreaming => "bidi_streaming",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side-effect hint declared in the schema.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum MethodIdempotency {
    #[default]
    Unknown = 0,
    NoSideEffects = 1,
    Idempotent = 2,
}
