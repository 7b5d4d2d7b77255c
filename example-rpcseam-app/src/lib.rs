//! An in-memory user directory served through `rpcseam-endpoint`.

use example_rpcseam_service_definition::{
    Chat, CountUsers, Echo, GetUser, ListUsers,
    echo_service::echo_service,
    user_service::{
        ChatMessage, GetUserRequest, ListUsersRequest, User, UserCount, UserPartial, user_service,
    },
};
use futures::{TryStreamExt, stream};
use rpcseam::{Code, HandlerContext, RpcError};
use rpcseam_endpoint::{
    CollectedResponse, EndpointConfig, InboundCall, RequestBody, RequestStream,
    RpcServiceEndpoint, RpcServiceEndpointInterface, error::BindError,
};
use rpcseam_service::{Reply, RpcMethod};
use std::io;
use std::sync::Arc;

/// The users the example serves.
#[derive(Debug, Clone)]
pub struct Directory {
    users: Arc<Vec<User>>,
}

impl Directory {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(users),
        }
    }

    pub fn sample() -> Self {
        Self::new(
            [
                (1, "Ada", "ada@example.com"),
                (2, "Grace", ""),
                (3, "Edsger", "ewd@example.com"),
            ]
            .into_iter()
            .map(|(id, name, email)| User {
                id,
                name: name.into(),
                email: email.into(),
            })
            .collect(),
        )
    }

    fn find(&self, id: u32) -> Option<User> {
        self.users.iter().find(|user| user.id == id).cloned()
    }

    fn first(&self, limit: u32) -> Vec<User> {
        let limit = match limit {
            0 => self.users.len(),
            n => n as usize,
        };
        self.users.iter().take(limit).cloned().collect()
    }
}

async fn get_user(
    ctx: HandlerContext,
    found: Option<User>,
    req: GetUserRequest,
) -> Result<Reply<User>, RpcError> {
    let user = found
        .ok_or_else(|| RpcError::new(Code::NotFound, format!("no user with id {}", req.id)))?;
    ctx.set_response_header("x-user-id", &user.id.to_string())
        .map_err(|err| RpcError::internal(err.to_string()))?;

    // Users without an email are only partially known.
    if user.email.is_empty() {
        return Ok(Reply::partial(UserPartial {
            id: Some(user.id),
            name: Some(user.name),
            email: None,
        }));
    }
    Ok(Reply::from(user))
}

async fn count_users(incoming: RequestStream<User>) -> Result<UserCount, RpcError> {
    let count = incoming
        .try_fold(0u32, |count, _| async move { Ok(count + 1) })
        .await?;
    Ok(UserCount { count })
}

/// Builds an endpoint with every example method bound.
pub async fn build_endpoint(
    directory: Directory,
    config: EndpointConfig,
) -> Result<RpcServiceEndpoint, BindError> {
    let endpoint = RpcServiceEndpoint::with_config(config);
    let users = user_service()?;
    let echo = echo_service()?;

    let lookup = directory.clone();
    endpoint
        .bind_unary::<GetUser, _, _, _>(&users, move |ctx, req: GetUserRequest| {
            get_user(ctx, lookup.find(req.id), req)
        })
        .await?;

    endpoint
        .bind_server_streaming::<ListUsers, _, _, _>(&users, move |_ctx, req: ListUsersRequest| {
            stream::iter(directory.first(req.limit).into_iter().map(Ok::<User, RpcError>))
        })
        .await?;

    endpoint
        .bind_client_streaming::<CountUsers, _, _, _>(&users, |_ctx, incoming| {
            count_users(incoming)
        })
        .await?;

    endpoint
        .bind_bidi_streaming::<Chat, _, _, _>(&users, |ctx, incoming: RequestStream<ChatMessage>| {
            incoming.map_ok(move |msg| ChatMessage {
                text: format!("[call {}] {}", ctx.call_id(), msg.text),
            })
        })
        .await?;

    endpoint
        .bind_unary::<Echo, _, _, _>(&echo, |_ctx, bytes: Vec<u8>| async move {
            Ok::<_, RpcError>(bytes)
        })
        .await?;

    Ok(endpoint)
}

/// Dispatches a unary call in-process and decodes its single reply.
pub async fn call_unary<M>(
    endpoint: &RpcServiceEndpoint,
    input: M::Input,
) -> Result<(CollectedResponse, M::Output), RpcError>
where
    M: RpcMethod,
{
    let body = M::encode_request(input).map_err(encode_error)?;
    let response = endpoint
        .dispatch(InboundCall::new(M::path(), RequestBody::Unary(body)))
        .await
        .collect()
        .await;
    response.outcome.status.clone()?;

    let bytes = response
        .messages
        .first()
        .ok_or_else(|| RpcError::internal("call ended without a reply"))?;
    let output = M::decode_response(bytes).map_err(decode_error)?;
    Ok((response, output))
}

/// Dispatches a call with a streamed request on its own task and decodes
/// every reply.
pub async fn call_streaming<M, I>(
    endpoint: &RpcServiceEndpoint,
    inputs: I,
) -> Result<Vec<M::Output>, RpcError>
where
    M: RpcMethod,
    I: IntoIterator<Item = M::Input>,
{
    let messages = inputs
        .into_iter()
        .map(M::encode_request)
        .collect::<Result<Vec<_>, io::Error>>()
        .map_err(encode_error)?;

    let (_controller, events) = endpoint
        .dispatch(InboundCall::new(
            M::path(),
            RequestBody::from_messages(messages),
        ))
        .await
        .spawn();
    let response = CollectedResponse::gather(events).await;
    response.outcome.status?;

    response
        .messages
        .iter()
        .map(|bytes| M::decode_response(bytes).map_err(decode_error))
        .collect()
}

fn encode_error(err: io::Error) -> RpcError {
    RpcError::internal(format!("failed to encode request: {err}"))
}

fn decode_error(err: io::Error) -> RpcError {
    RpcError::new(Code::DataLoss, format!("failed to decode response: {err}"))
}
