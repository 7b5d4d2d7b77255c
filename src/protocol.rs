use std::fmt;

/// The wire protocol that carried a call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Protocol {
    #[default]
    Connect,
    Grpc,
    GrpcWeb,
}

impl Protocol {
    pub const ALL: [Protocol; 3] = [Protocol::Connect, Protocol::Grpc, Protocol::GrpcWeb];

    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Connect => "connect",
            Protocol::Grpc => "grpc",
            Protocol::GrpcWeb => "grpc-web",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
