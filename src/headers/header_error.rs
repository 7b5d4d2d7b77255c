use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// The header name is not a valid HTTP field name.
    InvalidName(String),

    /// The header value contains bytes HTTP does not allow.
    InvalidValue(String),

    /// The container was already handed to the transport and can no longer change.
    Frozen,
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::InvalidName(name) => write!(f, "invalid header name: {:?}", name),
            HeaderError::InvalidValue(name) => {
                write!(f, "invalid value for header {:?}", name)
            }
            HeaderError::Frozen => write!(f, "headers were already sent"),
        }
    }
}

impl std::error::Error for HeaderError {}
