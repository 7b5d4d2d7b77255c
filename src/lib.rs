//! Handler-invocation core for RPC servers.
//!
//! This crate holds the vocabulary shared by transports and handlers: the
//! per-call [`HandlerContext`], service and method descriptors, response
//! header containers, the cancellation signal and deadline, and the status
//! codes a call terminates with. Dispatching calls to handlers lives in
//! `rpcseam-endpoint`.

pub mod context;
pub mod descriptor;
pub mod headers;
pub mod protocol;
pub mod status;
pub mod utils;

pub use context::{
    CallController, CancelCause, CancellationMode, CancellationSignal, Deadline, HandlerContext,
    HandlerContextBuilder,
};
pub use descriptor::{
    DescriptorError, MethodDescriptor, MethodIdempotency, MethodKind, MethodSchema,
    ServiceDescriptor, ServiceSchema,
};
pub use headers::{HeaderError, HeaderList};
pub use protocol::Protocol;
pub use status::{Code, RpcError};

pub use http;
