use super::{
    BoundMethod, Dispatch, EndpointConfig, InboundCall, MethodHandler, RequestStream,
    error::BindError, with_handlers_trait::WithHandlers,
};
use futures::Stream;
use rpcseam::{HandlerContext, RpcError, ServiceDescriptor, ServiceSchema};
use rpcseam_service::{Reply, RpcMessage, RpcMethod, method_id_hash};
use std::{collections::hash_map::Entry, future::Future, marker::Send, sync::Arc};

#[async_trait::async_trait]
pub trait RpcServiceEndpointInterface: Send + Sync {
    type HandlersLock: WithHandlers;

    fn get_handlers(&self) -> Arc<Self::HandlersLock>;

    fn config(&self) -> &EndpointConfig;

    /// Builds a service descriptor from a static schema, rejecting unknown
    /// call-shape or idempotency tags.
    fn register_service(
        &self,
        schema: &ServiceSchema,
    ) -> Result<Arc<ServiceDescriptor>, BindError> {
        Ok(ServiceDescriptor::from_schema(schema)?)
    }

    /// Binds a byte-level handler to `method_name` of `service`.
    ///
    /// The handler's shape must equal the one the descriptor declares, and a
    /// procedure can only be bound once. Returns the method ID calls are
    /// routed by.
    async fn bind(
        &self,
        service: &Arc<ServiceDescriptor>,
        method_name: &str,
        handler: MethodHandler,
    ) -> Result<u64, BindError> {
        let method = service
            .method(method_name)
            .cloned()
            .ok_or_else(|| BindError::UnknownMethod {
                service: service.type_name().to_string(),
                method: method_name.to_string(),
            })?;

        if method.kind() != handler.kind() {
            return Err(BindError::ShapeMismatch {
                procedure: method.path().to_string(),
                declared: method.kind(),
                handler: handler.kind(),
            });
        }

        let method_id = method_id_hash(method.path());
        let bound = BoundMethod {
            service: service.clone(),
            method,
            handler,
        };

        self.get_handlers()
            .with_handlers(|handlers| match handlers.entry(method_id) {
                Entry::Occupied(existing) => Err(BindError::AlreadyBound(
                    existing.get().method.path().to_string(),
                )),
                Entry::Vacant(entry) => {
                    tracing::debug!("Bound {} ({})", bound.method.path(), bound.method.kind());
                    entry.insert(bound);
                    Ok(method_id)
                }
            })
            .await
    }

    async fn bind_unary<M, F, Fut, R>(
        &self,
        service: &Arc<ServiceDescriptor>,
        handler: F,
    ) -> Result<u64, BindError>
    where
        M: RpcMethod + 'static,
        F: Fn(HandlerContext, M::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RpcError>> + Send + 'static,
        R: Into<Reply<M::Output>> + Send + 'static,
    {
        check_typed_method::<M>(service)?;
        self.bind(service, M::NAME, MethodHandler::typed_unary::<M, F, Fut, R>(handler))
            .await
    }

    async fn bind_server_streaming<M, F, S, R>(
        &self,
        service: &Arc<ServiceDescriptor>,
        handler: F,
    ) -> Result<u64, BindError>
    where
        M: RpcMethod + 'static,
        F: Fn(HandlerContext, M::Input) -> S + Send + Sync + 'static,
        S: Stream<Item = Result<R, RpcError>> + Send + 'static,
        R: Into<Reply<M::Output>> + Send + 'static,
    {
        check_typed_method::<M>(service)?;
        self.bind(
            service,
            M::NAME,
            MethodHandler::typed_server_streaming::<M, F, S, R>(handler),
        )
        .await
    }

    async fn bind_client_streaming<M, F, Fut, R>(
        &self,
        service: &Arc<ServiceDescriptor>,
        handler: F,
    ) -> Result<u64, BindError>
    where
        M: RpcMethod + 'static,
        F: Fn(HandlerContext, RequestStream<M::Input>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RpcError>> + Send + 'static,
        R: Into<Reply<M::Output>> + Send + 'static,
    {
        check_typed_method::<M>(service)?;
        self.bind(
            service,
            M::NAME,
            MethodHandler::typed_client_streaming::<M, F, Fut, R>(handler),
        )
        .await
    }

    async fn bind_bidi_streaming<M, F, S, R>(
        &self,
        service: &Arc<ServiceDescriptor>,
        handler: F,
    ) -> Result<u64, BindError>
    where
        M: RpcMethod + 'static,
        F: Fn(HandlerContext, RequestStream<M::Input>) -> S + Send + Sync + 'static,
        S: Stream<Item = Result<R, RpcError>> + Send + 'static,
        R: Into<Reply<M::Output>> + Send + 'static,
    {
        check_typed_method::<M>(service)?;
        self.bind(
            service,
            M::NAME,
            MethodHandler::typed_bidi_streaming::<M, F, S, R>(handler),
        )
        .await
    }

    /// Routes an inbound call to its bound method and prepares the call.
    ///
    /// Nothing runs until the returned [`Dispatch`] is driven. A procedure
    /// without a handler yields a dispatch that ends with `Unimplemented`.
    async fn dispatch(&self, call: InboundCall) -> Dispatch {
        let method_id = method_id_hash(&call.procedure);
        let bound = self
            .get_handlers()
            .with_handlers(|handlers| handlers.get(&method_id).cloned())
            .await;

        match bound {
            // A hash collision must not route to the wrong method.
            Some(bound) if bound.method.path() == call.procedure => {
                Dispatch::start(bound, call, self.config())
            }
            _ => Dispatch::rejected(
                &call.procedure,
                RpcError::unimplemented(format!("{} is not implemented", call.procedure)),
                self.config(),
            ),
        }
    }
}

fn check_typed_method<M>(service: &ServiceDescriptor) -> Result<(), BindError>
where
    M: RpcMethod,
{
    if M::SERVICE != service.type_name() {
        return Err(BindError::ServiceMismatch {
            expected: service.type_name().to_string(),
            found: M::SERVICE.to_string(),
        });
    }

    let method = service
        .method(M::NAME)
        .ok_or_else(|| BindError::UnknownMethod {
            service: service.type_name().to_string(),
            method: M::NAME.to_string(),
        })?;

    if M::METHOD_ID != method_id_hash(method.path()) {
        return Err(BindError::MethodIdMismatch {
            procedure: method.path().to_string(),
        });
    }

    let checks = [
        (method.input_type(), <M::Input as RpcMessage>::TYPE_NAME),
        (method.output_type(), <M::Output as RpcMessage>::TYPE_NAME),
    ];
    for (expected, found) in checks {
        if expected != found {
            return Err(BindError::TypeMismatch {
                procedure: method.path().to_string(),
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
    }

    Ok(())
}
