use super::{
    BoundMethod, CallOutcome, CollectedResponse, EndpointConfig, InboundCall, MessageStream,
    MethodHandler, RequestBody, ResponseEvent,
};
use futures::channel::mpsc;
use futures::future::{self, BoxFuture, Either, FutureExt};
use futures::{SinkExt, StreamExt};
use rpcseam::{
    CallController, CancelCause, Deadline, HandlerContext, HeaderList, RpcError,
};
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

/// A routed call, ready to be driven.
///
/// The driver future runs the handler and pushes [`ResponseEvent`]s into the
/// receiver. Dropping the receiver before the call ends counts as a client
/// disconnect and cancels the call.
pub struct Dispatch {
    controller: Option<CallController>,
    events: mpsc::Receiver<ResponseEvent>,
    driver: BoxFuture<'static, ()>,
}

impl Dispatch {
    pub(crate) fn start(bound: BoundMethod, call: InboundCall, config: &EndpointConfig) -> Self {
        let InboundCall {
            procedure: _,
            protocol,
            http_method,
            request_headers,
            timeout,
            extensions,
            body,
        } = call;

        let deadline = Deadline::from_timeouts(timeout, config.max_timeout);
        let (context, controller) = HandlerContext::builder(bound.service, bound.method)
            .protocol(protocol)
            .http_method(http_method)
            .request_headers(request_headers)
            .extensions(extensions)
            .deadline(deadline)
            .cancellation_mode(config.cancellation_mode)
            .build();

        tracing::debug!(
            "Dispatching call {} to {} over {} (timeout: {:?})",
            context.call_id(),
            context.method().path(),
            context.protocol(),
            context.timeout()
        );

        if deadline.is_expired() {
            controller.cancel(CancelCause::DeadlineExceeded);
        }

        let (tx, rx) = mpsc::channel(config.response_buffer_size);
        let driver = CallDriver {
            controller: controller.clone(),
            context,
            handler: bound.handler,
            events: tx,
            headers_sent: false,
            messages_sent: 0,
        };

        Self {
            controller: Some(controller),
            events: rx,
            driver: driver.run(body).boxed(),
        }
    }

    /// A call that ends with `error` without reaching any handler.
    pub(crate) fn rejected(procedure: &str, error: RpcError, config: &EndpointConfig) -> Self {
        tracing::debug!("Rejecting call to {}: {}", procedure, error);

        let (mut tx, rx) = mpsc::channel(config.response_buffer_size);
        let driver = async move {
            let outcome = CallOutcome {
                trailers: error.metadata.clone(),
                status: Err(error),
                messages_sent: 0,
            };
            if tx.send(ResponseEvent::Headers(HeaderList::new())).await.is_ok() {
                let _ = tx.send(ResponseEvent::End(outcome)).await;
            }
        };

        Self {
            controller: None,
            events: rx,
            driver: driver.boxed(),
        }
    }

    /// The transport's handle on the call; `None` when the call was rejected
    /// before a context existed.
    pub fn controller(&self) -> Option<&CallController> {
        self.controller.as_ref()
    }

    /// Splits the dispatch for a transport that drives the call itself.
    ///
    /// The driver does not enforce the deadline; the transport fires
    /// `CancelCause::DeadlineExceeded` on the controller when it lapses.
    pub fn into_parts(
        self,
    ) -> (
        Option<CallController>,
        mpsc::Receiver<ResponseEvent>,
        BoxFuture<'static, ()>,
    ) {
        (self.controller, self.events, self.driver)
    }

    /// Drives the call on the current task and gathers every event.
    pub async fn collect(self) -> CollectedResponse {
        let (_, events, driver) = self.into_parts();
        let ((), events) = future::join(driver, events.collect::<Vec<_>>()).await;
        CollectedResponse::from_events(events)
    }

    /// Runs the call on its own tokio task, cancelling it with
    /// `DeadlineExceeded` once its deadline lapses.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[cfg(feature = "tokio_support")]
    pub fn spawn(self) -> (Option<CallController>, mpsc::Receiver<ResponseEvent>) {
        let (controller, events, mut driver) = self.into_parts();
        let timer = controller
            .clone()
            .and_then(|controller| controller.deadline().instant().map(|at| (controller, at)));

        tokio::spawn(async move {
            if let Some((controller, at)) = timer {
                tokio::select! {
                    biased;
                    _ = &mut driver => return,
                    _ = tokio::time::sleep_until(tokio::time::Instant::from_std(at)) => {
                        controller.cancel(CancelCause::DeadlineExceeded);
                    }
                }
            }
            driver.await;
        });

        (controller, events)
    }
}

impl CollectedResponse {
    /// Drains a call's events until the driver drops its end of the channel.
    pub async fn gather(events: mpsc::Receiver<ResponseEvent>) -> Self {
        Self::from_events(events.collect().await)
    }
}

struct CallDriver {
    controller: CallController,
    context: HandlerContext,
    handler: MethodHandler,
    events: mpsc::Sender<ResponseEvent>,
    headers_sent: bool,
    messages_sent: usize,
}

impl CallDriver {
    async fn run(mut self, body: RequestBody) {
        let status = if self.controller.is_cancelled() {
            tracing::debug!(
                "Call {} ({}) cancelled before the handler was invoked",
                self.context.call_id(),
                self.context.method().path()
            );
            Err(cancel_error(&self.controller))
        } else {
            self.invoke(body).await
        };
        self.finish(status).await;
    }

    async fn invoke(&mut self, body: RequestBody) -> Result<(), RpcError> {
        let ctx = self.context.clone();
        match self.handler.clone() {
            MethodHandler::Unary(handler) => {
                let input = self.single_input(body).await?;
                let reply = self.call_handler(|| handler(ctx, input))?;
                let output = self.await_reply(reply).await?;
                self.send_message(output).await
            }
            MethodHandler::ServerStreaming(handler) => {
                let input = self.single_input(body).await?;
                let outputs = self.call_handler(|| handler(ctx, input))?;
                self.pump(outputs).await
            }
            MethodHandler::ClientStreaming(handler) => {
                let inputs = body.into_stream();
                let reply = self.call_handler(|| handler(ctx, inputs))?;
                let output = self.await_reply(reply).await?;
                self.send_message(output).await
            }
            MethodHandler::BiDiStreaming(handler) => {
                let inputs = body.into_stream();
                let outputs = self.call_handler(|| handler(ctx, inputs))?;
                self.pump(outputs).await
            }
        }
    }

    /// Reads the one message a single-input method takes.
    async fn single_input(&self, body: RequestBody) -> Result<Vec<u8>, RpcError> {
        let mut messages = match body {
            RequestBody::Unary(bytes) => return Ok(bytes),
            RequestBody::Streaming(messages) => messages,
        };

        let read = async move {
            let first = messages.next().await.ok_or_else(|| {
                RpcError::invalid_argument("expected exactly one request message, got none")
            })??;
            match messages.next().await {
                None => Ok(first),
                Some(Err(err)) => Err(err),
                Some(Ok(_)) => Err(RpcError::invalid_argument(
                    "expected exactly one request message, got more",
                )),
            }
        };
        until_cancelled(&self.controller, read).await
    }

    fn call_handler<T>(&self, invoke: impl FnOnce() -> T) -> Result<T, RpcError> {
        panic::catch_unwind(AssertUnwindSafe(invoke)).map_err(|payload| self.panicked(payload))
    }

    async fn await_reply(
        &self,
        reply: BoxFuture<'static, Result<Vec<u8>, RpcError>>,
    ) -> Result<Vec<u8>, RpcError> {
        let reply = AssertUnwindSafe(reply).catch_unwind().map(|result| match result {
            Ok(reply) => reply,
            Err(payload) => Err(self.panicked(payload)),
        });
        until_cancelled(&self.controller, reply).await
    }

    /// Forwards a handler's output stream until it ends, fails, or the call is
    /// cancelled. The stream is dropped on return so nothing more is produced.
    async fn pump(&mut self, outputs: MessageStream) -> Result<(), RpcError> {
        let mut outputs = AssertUnwindSafe(outputs).catch_unwind();
        loop {
            let next = until_cancelled(&self.controller, async {
                Ok(outputs.next().await)
            })
            .await?;

            match next {
                None => return Ok(()),
                Some(Err(payload)) => return Err(self.panicked(payload)),
                Some(Ok(Err(err))) => return Err(err),
                Some(Ok(Ok(bytes))) => self.send_message(bytes).await?,
            }
        }
    }

    async fn send_message(&mut self, bytes: Vec<u8>) -> Result<(), RpcError> {
        if !self.headers_sent {
            let headers = self.controller.freeze_headers();
            until_cancelled(
                &self.controller,
                emit(&self.controller, &mut self.events, ResponseEvent::Headers(headers)),
            )
            .await?;
            self.headers_sent = true;
        }

        tracing::trace!(
            "Call {} ({}): forwarding message {} ({} bytes)",
            self.context.call_id(),
            self.context.method().path(),
            self.messages_sent + 1,
            bytes.len()
        );
        until_cancelled(
            &self.controller,
            emit(&self.controller, &mut self.events, ResponseEvent::Message(bytes)),
        )
        .await?;
        self.messages_sent += 1;
        Ok(())
    }

    async fn finish(mut self, status: Result<(), RpcError>) {
        // Headers go out even when the call failed before producing output.
        if !self.headers_sent {
            let headers = self.controller.freeze_headers();
            if self.events.send(ResponseEvent::Headers(headers)).await.is_err() {
                disconnected(&self.controller);
            }
        }

        let mut trailers = self.controller.freeze_trailers();
        if let Err(err) = &status {
            trailers.extend_from(&err.metadata);
        }

        match &status {
            Ok(()) => tracing::debug!(
                "Call {} ({}) ended: ok, {} message(s)",
                self.context.call_id(),
                self.context.method().path(),
                self.messages_sent
            ),
            Err(err) => tracing::debug!(
                "Call {} ({}) ended: {}, {} message(s)",
                self.context.call_id(),
                self.context.method().path(),
                err,
                self.messages_sent
            ),
        }

        let outcome = CallOutcome {
            status,
            trailers,
            messages_sent: self.messages_sent,
        };
        let _ = self.events.send(ResponseEvent::End(outcome)).await;
    }

    fn panicked(&self, payload: Box<dyn Any + Send>) -> RpcError {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|reason| reason.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());

        tracing::error!(
            "Handler for call {} ({}) panicked: {}",
            self.context.call_id(),
            self.context.method().path(),
            reason
        );
        RpcError::internal("handler panicked")
    }
}

/// Pushes one event to the transport. A dropped receiver cancels the call.
async fn emit(
    controller: &CallController,
    events: &mut mpsc::Sender<ResponseEvent>,
    event: ResponseEvent,
) -> Result<(), RpcError> {
    if events.send(event).await.is_ok() {
        return Ok(());
    }

    disconnected(controller);
    Err(cancel_error(controller))
}

fn disconnected(controller: &CallController) {
    if controller.cancel(CancelCause::Canceled) {
        let context = controller.context();
        tracing::warn!(
            "Client disconnected from call {} ({})",
            context.call_id(),
            context.method().path()
        );
    }
}

/// Runs `work` unless the call is cancelled first. Cancellation wins when
/// both are ready.
async fn until_cancelled<T, F>(controller: &CallController, work: F) -> Result<T, RpcError>
where
    F: Future<Output = Result<T, RpcError>>,
{
    let cancelled = controller.context().cancelled();
    futures::pin_mut!(cancelled);
    futures::pin_mut!(work);

    match future::select(cancelled, work).await {
        Either::Left(((), _)) => Err(cancel_error(controller)),
        Either::Right((result, _)) => result,
    }
}

fn cancel_error(controller: &CallController) -> RpcError {
    controller
        .cause()
        .map(CancelCause::into_error)
        .unwrap_or_else(RpcError::canceled)
}
