use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use rpcseam::{HandlerContext, MethodKind, RpcError};
use rpcseam_service::{Reply, RpcMethod};
use std::future::Future;
use std::sync::Arc;

/// A lazy, finite, non-restartable sequence of encoded messages.
pub type MessageStream = BoxStream<'static, Result<Vec<u8>, RpcError>>;

/// The decoded request sequence a streaming-input handler consumes.
///
/// Items that fail to decode arrive as `InvalidArgument` errors.
pub type RequestStream<T> = BoxStream<'static, Result<T, RpcError>>;

pub type UnaryFn =
    Arc<dyn Fn(HandlerContext, Vec<u8>) -> BoxFuture<'static, Result<Vec<u8>, RpcError>> + Send + Sync>;

pub type ServerStreamingFn = Arc<dyn Fn(HandlerContext, Vec<u8>) -> MessageStream + Send + Sync>;

pub type ClientStreamingFn = Arc<
    dyn Fn(HandlerContext, MessageStream) -> BoxFuture<'static, Result<Vec<u8>, RpcError>>
        + Send
        + Sync,
>;

pub type BiDiStreamingFn = Arc<dyn Fn(HandlerContext, MessageStream) -> MessageStream + Send + Sync>;

/// A handler for one method, tagged with its call shape.
///
/// The four variants are the complete set of signatures a method can have;
/// the endpoint only accepts a handler whose variant equals the
/// [`MethodKind`] of the method it is bound to.
#[derive(Clone)]
pub enum MethodHandler {
    /// One request in, one response out.
    Unary(UnaryFn),

    /// One request in, zero or more responses out.
    ServerStreaming(ServerStreamingFn),

    /// Zero or more requests in, one response out.
    ClientStreaming(ClientStreamingFn),

    /// Requests and responses flow independently.
    BiDiStreaming(BiDiStreamingFn),
}

impl MethodHandler {
    pub fn kind(&self) -> MethodKind {
        match self {
            MethodHandler::Unary(_) => MethodKind::Unary,
            MethodHandler::ServerStreaming(_) => MethodKind::ServerStreaming,
            MethodHandler::ClientStreaming(_) => MethodKind::ClientStreaming,
            MethodHandler::BiDiStreaming(_) => MethodKind::BiDiStreaming,
        }
    }

    // --- Byte-level constructors ---

    pub fn unary<F, Fut>(handler: F) -> Self
    where
        F: Fn(HandlerContext, Vec<u8>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>, RpcError>> + Send + 'static,
    {
        MethodHandler::Unary(Arc::new(move |ctx: HandlerContext, bytes: Vec<u8>| {
            handler(ctx, bytes).boxed()
        }))
    }

    pub fn server_streaming<F, S>(handler: F) -> Self
    where
        F: Fn(HandlerContext, Vec<u8>) -> S + Send + Sync + 'static,
        S: Stream<Item = Result<Vec<u8>, RpcError>> + Send + 'static,
    {
        MethodHandler::ServerStreaming(Arc::new(move |ctx: HandlerContext, bytes: Vec<u8>| {
            handler(ctx, bytes).boxed()
        }))
    }

    pub fn client_streaming<F, Fut>(handler: F) -> Self
    where
        F: Fn(HandlerContext, MessageStream) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>, RpcError>> + Send + 'static,
    {
        MethodHandler::ClientStreaming(Arc::new(
            move |ctx: HandlerContext, requests: MessageStream| handler(ctx, requests).boxed(),
        ))
    }

    pub fn bidi_streaming<F, S>(handler: F) -> Self
    where
        F: Fn(HandlerContext, MessageStream) -> S + Send + Sync + 'static,
        S: Stream<Item = Result<Vec<u8>, RpcError>> + Send + 'static,
    {
        MethodHandler::BiDiStreaming(Arc::new(
            move |ctx: HandlerContext, requests: MessageStream| handler(ctx, requests).boxed(),
        ))
    }

    // --- Typed constructors ---
    //
    // These wrap a handler written against `M::Input` / `M::Output`: requests
    // are decoded before the handler runs, replies are completed with
    // defaults and then encoded.

    pub fn typed_unary<M, F, Fut, R>(handler: F) -> Self
    where
        M: RpcMethod + 'static,
        F: Fn(HandlerContext, M::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RpcError>> + Send + 'static,
        R: Into<Reply<M::Output>> + Send + 'static,
    {
        MethodHandler::Unary(Arc::new(move |ctx: HandlerContext, bytes: Vec<u8>| {
            match M::decode_request(&bytes) {
                Ok(input) => {
                    let reply = handler(ctx, input);
                    async move { encode_reply::<M, R>(reply.await) }.boxed()
                }
                Err(err) => future::ready(Err(RpcError::from_decode(err))).boxed(),
            }
        }))
    }

    pub fn typed_server_streaming<M, F, S, R>(handler: F) -> Self
    where
        M: RpcMethod + 'static,
        F: Fn(HandlerContext, M::Input) -> S + Send + Sync + 'static,
        S: Stream<Item = Result<R, RpcError>> + Send + 'static,
        R: Into<Reply<M::Output>> + Send + 'static,
    {
        MethodHandler::ServerStreaming(Arc::new(
            move |ctx: HandlerContext, bytes: Vec<u8>| -> MessageStream {
                match M::decode_request(&bytes) {
                    Ok(input) => handler(ctx, input).map(encode_reply::<M, R>).boxed(),
                    Err(err) => stream::once(future::ready(Err(RpcError::from_decode(err)))).boxed(),
                }
            },
        ))
    }

    pub fn typed_client_streaming<M, F, Fut, R>(handler: F) -> Self
    where
        M: RpcMethod + 'static,
        F: Fn(HandlerContext, RequestStream<M::Input>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RpcError>> + Send + 'static,
        R: Into<Reply<M::Output>> + Send + 'static,
    {
        MethodHandler::ClientStreaming(Arc::new(
            move |ctx: HandlerContext, requests: MessageStream| {
                let reply = handler(ctx, decode_requests::<M>(requests));
                async move { encode_reply::<M, R>(reply.await) }.boxed()
            },
        ))
    }

    pub fn typed_bidi_streaming<M, F, S, R>(handler: F) -> Self
    where
        M: RpcMethod + 'static,
        F: Fn(HandlerContext, RequestStream<M::Input>) -> S + Send + Sync + 'static,
        S: Stream<Item = Result<R, RpcError>> + Send + 'static,
        R: Into<Reply<M::Output>> + Send + 'static,
    {
        MethodHandler::BiDiStreaming(Arc::new(
            move |ctx: HandlerContext, requests: MessageStream| -> MessageStream {
                handler(ctx, decode_requests::<M>(requests))
                    .map(encode_reply::<M, R>)
                    .boxed()
            },
        ))
    }
}

fn decode_requests<M>(requests: MessageStream) -> RequestStream<M::Input>
where
    M: RpcMethod + 'static,
{
    requests
        .map(|item| item.and_then(|bytes| M::decode_request(&bytes).map_err(RpcError::from_decode)))
        .boxed()
}

fn encode_reply<M, R>(reply: Result<R, RpcError>) -> Result<Vec<u8>, RpcError>
where
    M: RpcMethod,
    R: Into<Reply<M::Output>>,
{
    let reply: Reply<M::Output> = reply?.into();
    M::encode_response(reply.into_message()).map_err(RpcError::from_encode)
}
