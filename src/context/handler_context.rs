use super::{CallController, CancelCause, CancellationMode, CancellationSignal, Deadline};
use crate::descriptor::{MethodDescriptor, ServiceDescriptor};
use crate::headers::{HeaderError, HeaderList};
use crate::protocol::Protocol;
use crate::utils::increment_u32_id;
use http::{Extensions, HeaderMap, Method};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Default)]
pub(crate) struct ResponseMetadata {
    pub(crate) headers: HeaderList,
    pub(crate) trailers: HeaderList,
    pub(crate) headers_frozen: bool,
    pub(crate) trailers_frozen: bool,
}

pub(crate) struct ContextInner {
    call_id: u32,
    service: Arc<ServiceDescriptor>,
    method: Arc<MethodDescriptor>,
    protocol: Protocol,
    http_method: Method,
    request_headers: HeaderMap,
    extensions: Extensions,
    deadline: Deadline,
    cancellation_mode: CancellationMode,
    pub(crate) signal: CancellationSignal,
    pub(crate) response: Mutex<ResponseMetadata>,
}

/// Per-call view handed to a handler.
///
/// One `HandlerContext` exists per inbound call. Cloning it yields another
/// handle to the same call (e.g. for sub-tasks the handler spawns), never a
/// new call.
#[derive(Clone)]
pub struct HandlerContext {
    pub(crate) inner: Arc<ContextInner>,
}

impl HandlerContext {
    /// Starts building the context for a new call to `method` of `service`.
    pub fn builder(
        service: Arc<ServiceDescriptor>,
        method: Arc<MethodDescriptor>,
    ) -> HandlerContextBuilder {
        HandlerContextBuilder {
            service,
            method,
            protocol: Protocol::default(),
            http_method: Method::POST,
            request_headers: HeaderMap::new(),
            extensions: Extensions::new(),
            deadline: Deadline::none(),
            cancellation_mode: CancellationMode::default(),
        }
    }

    /// Process-unique id of this call, for log correlation.
    pub fn call_id(&self) -> u32 {
        self.inner.call_id
    }

    pub fn service(&self) -> &Arc<ServiceDescriptor> {
        &self.inner.service
    }

    pub fn method(&self) -> &Arc<MethodDescriptor> {
        &self.inner.method
    }

    pub fn protocol(&self) -> Protocol {
        self.inner.protocol
    }

    /// The HTTP verb of the inbound request.
    pub fn http_method(&self) -> &Method {
        &self.inner.http_method
    }

    pub fn request_headers(&self) -> &HeaderMap {
        &self.inner.request_headers
    }

    /// Values the transport attached to the call (peer address, principal, ...).
    pub fn extensions(&self) -> &Extensions {
        &self.inner.extensions
    }

    pub fn signal(&self) -> &CancellationSignal {
        &self.inner.signal
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.signal.is_cancelled()
    }

    pub fn cancelled(&self) -> impl Future<Output = ()> + Send + 'static {
        self.inner.signal.cancelled()
    }

    /// Why the call was cancelled, when the endpoint exposes it.
    ///
    /// Always `None` under [`CancellationMode::Unified`].
    pub fn cancel_cause(&self) -> Option<CancelCause> {
        match self.inner.cancellation_mode {
            CancellationMode::Unified => None,
            CancellationMode::Distinguished => self.inner.signal.cause(),
        }
    }

    pub fn deadline(&self) -> Deadline {
        self.inner.deadline
    }

    /// Time left before the deadline; `None` if the call has no deadline.
    pub fn timeout(&self) -> Option<Duration> {
        self.inner.deadline.remaining()
    }

    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout()
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    /// Runs `f` against the outbound headers.
    ///
    /// Fails with [`HeaderError::Frozen`] once the headers were handed to the
    /// transport, which happens before the first response message.
    pub fn with_response_headers<F, R>(&self, f: F) -> Result<R, HeaderError>
    where
        F: FnOnce(&mut HeaderList) -> R,
    {
        let mut response = self.lock_response();
        if response.headers_frozen {
            tracing::warn!(
                "Call {} tried to modify response headers after they were sent",
                self.inner.call_id
            );
            return Err(HeaderError::Frozen);
        }
        Ok(f(&mut response.headers))
    }

    /// Runs `f` against the outbound trailers.
    ///
    /// Fails with [`HeaderError::Frozen`] once the call has finished.
    pub fn with_response_trailers<F, R>(&self, f: F) -> Result<R, HeaderError>
    where
        F: FnOnce(&mut HeaderList) -> R,
    {
        let mut response = self.lock_response();
        if response.trailers_frozen {
            tracing::warn!(
                "Call {} tried to modify response trailers after the call finished",
                self.inner.call_id
            );
            return Err(HeaderError::Frozen);
        }
        Ok(f(&mut response.trailers))
    }

    pub fn append_response_header(&self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.with_response_headers(|headers| headers.append(name, value))?
    }

    pub fn set_response_header(&self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.with_response_headers(|headers| headers.set(name, value))?
    }

    pub fn append_response_trailer(&self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.with_response_trailers(|trailers| trailers.append(name, value))?
    }

    pub fn set_response_trailer(&self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.with_response_trailers(|trailers| trailers.set(name, value))?
    }

    /// Whether the outbound headers were already sent.
    pub fn headers_sent(&self) -> bool {
        self.lock_response().headers_frozen
    }

    pub(crate) fn lock_response(&self) -> MutexGuard<'_, ResponseMetadata> {
        self.inner
            .response
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("call_id", &self.inner.call_id)
            .field("procedure", &self.inner.method.path())
            .field("protocol", &self.inner.protocol)
            .field("http_method", &self.inner.http_method)
            .field("deadline", &self.inner.deadline)
            .field("signal", &self.inner.signal)
            .finish()
    }
}

/// Collects the call metadata a transport knows before invoking a handler.
pub struct HandlerContextBuilder {
    service: Arc<ServiceDescriptor>,
    method: Arc<MethodDescriptor>,
    protocol: Protocol,
    http_method: Method,
    request_headers: HeaderMap,
    extensions: Extensions,
    deadline: Deadline,
    cancellation_mode: CancellationMode,
}

impl HandlerContextBuilder {
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn http_method(mut self, http_method: Method) -> Self {
        self.http_method = http_method;
        self
    }

    pub fn request_headers(mut self, headers: HeaderMap) -> Self {
        self.request_headers = headers;
        self
    }

    pub fn extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn cancellation_mode(mut self, mode: CancellationMode) -> Self {
        self.cancellation_mode = mode;
        self
    }

    /// Creates the context together with the controller the transport keeps
    /// to cancel the call and collect its response metadata.
    pub fn build(self) -> (HandlerContext, CallController) {
        let context = HandlerContext {
            inner: Arc::new(ContextInner {
                call_id: increment_u32_id(),
                service: self.service,
                method: self.method,
                protocol: self.protocol,
                http_method: self.http_method,
                request_headers: self.request_headers,
                extensions: self.extensions,
                deadline: self.deadline,
                cancellation_mode: self.cancellation_mode,
                signal: CancellationSignal::new(),
                response: Mutex::new(ResponseMetadata::default()),
            }),
        };
        let controller = CallController::new(context.clone());
        (context, controller)
    }
}
