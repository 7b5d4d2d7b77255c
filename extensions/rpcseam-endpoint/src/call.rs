use crate::MessageStream;
use futures::stream::{self, StreamExt};
use rpcseam::http::{Extensions, HeaderMap, Method};
use rpcseam::{Code, HeaderList, Protocol, RpcError};
use std::fmt;
use std::time::Duration;

/// The request side of a call as a transport hands it to the endpoint.
#[derive(Debug)]
pub struct InboundCall {
    /// Procedure path, `/{service}/{method}`.
    pub procedure: String,
    pub protocol: Protocol,
    pub http_method: Method,
    pub request_headers: HeaderMap,
    /// Timeout the client asked for, if any.
    pub timeout: Option<Duration>,
    pub extensions: Extensions,
    pub body: RequestBody,
}

impl InboundCall {
    pub fn new(procedure: impl Into<String>, body: RequestBody) -> Self {
        Self {
            procedure: procedure.into(),
            protocol: Protocol::default(),
            http_method: Method::POST,
            request_headers: HeaderMap::new(),
            timeout: None,
            extensions: Extensions::new(),
            body,
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_http_method(mut self, http_method: Method) -> Self {
        self.http_method = http_method;
        self
    }

    pub fn with_request_headers(mut self, headers: HeaderMap) -> Self {
        self.request_headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }
}

/// Encoded request messages.
pub enum RequestBody {
    /// Exactly one message, already buffered.
    Unary(Vec<u8>),

    /// Messages as the transport reads them off the wire.
    Streaming(MessageStream),
}

impl RequestBody {
    pub fn streaming<S>(messages: S) -> Self
    where
        S: futures::Stream<Item = Result<Vec<u8>, RpcError>> + Send + 'static,
    {
        RequestBody::Streaming(messages.boxed())
    }

    /// A streaming body over messages that are already in memory.
    pub fn from_messages<I>(messages: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
        I::IntoIter: Send + 'static,
    {
        RequestBody::Streaming(stream::iter(messages.into_iter().map(Ok)).boxed())
    }

    /// Presents the body as a stream; a unary body yields one element.
    pub fn into_stream(self) -> MessageStream {
        match self {
            RequestBody::Unary(bytes) => stream::once(async move { Ok(bytes) }).boxed(),
            RequestBody::Streaming(messages) => messages,
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Unary(bytes) => f.debug_tuple("Unary").field(&bytes.len()).finish(),
            RequestBody::Streaming(_) => f.write_str("Streaming(..)"),
        }
    }
}

/// What the endpoint emits for a call, in order.
///
/// `Headers` comes exactly once and before any `Message`; `End` comes last.
#[derive(Debug, Clone)]
pub enum ResponseEvent {
    Headers(HeaderList),
    Message(Vec<u8>),
    End(CallOutcome),
}

/// The terminal status of a call.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub status: Result<(), RpcError>,
    pub trailers: HeaderList,
    pub messages_sent: usize,
}

impl CallOutcome {
    /// `None` on success.
    pub fn code(&self) -> Option<Code> {
        self.status.as_ref().err().map(|err| err.code)
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// Every event of a finished call, gathered.
#[derive(Debug, Clone)]
pub struct CollectedResponse {
    pub headers: HeaderList,
    pub messages: Vec<Vec<u8>>,
    pub outcome: CallOutcome,
}

impl CollectedResponse {
    pub(crate) fn from_events(events: Vec<ResponseEvent>) -> Self {
        let mut headers = HeaderList::new();
        let mut messages = Vec::new();
        let mut outcome = None;

        for event in events {
            match event {
                ResponseEvent::Headers(sent) => headers = sent,
                ResponseEvent::Message(bytes) => messages.push(bytes),
                ResponseEvent::End(end) => outcome = Some(end),
            }
        }

        let messages_sent = messages.len();
        Self {
            headers,
            messages,
            outcome: outcome.unwrap_or_else(|| CallOutcome {
                status: Err(RpcError::new(Code::Unknown, "call ended without a status")),
                trailers: HeaderList::new(),
                messages_sent,
            }),
        }
    }
}
