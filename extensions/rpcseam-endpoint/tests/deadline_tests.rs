use example_rpcseam_service_definition::{
    GetUser,
    user_service::{GetUserRequest, User, user_service},
};
use futures::future;
use rand::Rng;
use rpcseam::{CancelCause, CancellationMode, Code, RpcError};
use rpcseam_endpoint::{
    CollectedResponse, EndpointConfig, InboundCall, RequestBody, RpcServiceEndpoint,
    RpcServiceEndpointInterface,
};
use rpcseam_service::RpcMethod;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

fn get_user_call(id: u32) -> InboundCall {
    InboundCall::new(
        GetUser::path(),
        RequestBody::Unary(GetUser::encode_request(GetUserRequest { id }).unwrap()),
    )
}

/// Binds a `GetUser` handler that never answers, recording the cause it
/// observes when its call is cancelled.
async fn stalled_endpoint(
    config: EndpointConfig,
) -> (RpcServiceEndpoint, Arc<Mutex<Vec<Option<CancelCause>>>>) {
    let endpoint = RpcServiceEndpoint::with_config(config);
    let service = user_service().unwrap();
    let observed = Arc::new(Mutex::new(Vec::new()));
    let recorder = observed.clone();

    endpoint
        .bind_unary::<GetUser, _, _, _>(&service, move |ctx, _req| {
            let recorder = recorder.clone();
            let observer = ctx.clone();
            ctx.signal().on_cancel(move || {
                recorder.lock().unwrap().push(observer.cancel_cause());
            });
            async move {
                future::pending::<()>().await;
                Ok::<_, RpcError>(User::default())
            }
        })
        .await
        .unwrap();

    (endpoint, observed)
}

#[tokio::test]
async fn client_timeout_ends_call_with_deadline_exceeded() {
    let (endpoint, observed) = stalled_endpoint(EndpointConfig::default()).await;

    let (_controller, events) = endpoint
        .dispatch(get_user_call(1).with_timeout(Duration::from_millis(20)))
        .await
        .spawn();
    let response = CollectedResponse::gather(events).await;

    assert_eq!(response.outcome.code(), Some(Code::DeadlineExceeded));
    assert!(response.messages.is_empty());
    // Unified mode hides the cause from the handler.
    assert_eq!(*observed.lock().unwrap(), vec![None]);
}

#[tokio::test]
async fn distinguished_mode_exposes_the_cause() {
    let config = EndpointConfig {
        cancellation_mode: CancellationMode::Distinguished,
        ..EndpointConfig::default()
    };
    let (endpoint, observed) = stalled_endpoint(config).await;

    let (_controller, events) = endpoint
        .dispatch(get_user_call(1).with_timeout(Duration::from_millis(20)))
        .await
        .spawn();
    let response = CollectedResponse::gather(events).await;
    assert_eq!(response.outcome.code(), Some(Code::DeadlineExceeded));

    let (controller, events) = endpoint.dispatch(get_user_call(2)).await.spawn();
    tokio::time::sleep(Duration::from_millis(10)).await;
    controller.unwrap().cancel(CancelCause::Canceled);
    let response = CollectedResponse::gather(events).await;
    assert_eq!(response.outcome.code(), Some(Code::Canceled));

    assert_eq!(
        *observed.lock().unwrap(),
        vec![
            Some(CancelCause::DeadlineExceeded),
            Some(CancelCause::Canceled)
        ]
    );
}

#[tokio::test]
async fn server_max_timeout_bounds_calls_without_a_client_timeout() {
    let config = EndpointConfig {
        max_timeout: Some(Duration::from_millis(20)),
        ..EndpointConfig::default()
    };
    let (endpoint, _observed) = stalled_endpoint(config).await;

    let dispatch = endpoint.dispatch(get_user_call(1)).await;
    let remaining = dispatch
        .controller()
        .and_then(|controller| controller.context().timeout())
        .unwrap();
    assert!(remaining <= Duration::from_millis(20));

    let (_controller, events) = dispatch.spawn();
    let response = CollectedResponse::gather(events).await;
    assert_eq!(response.outcome.code(), Some(Code::DeadlineExceeded));
}

#[tokio::test]
async fn expired_deadline_skips_the_handler() {
    let endpoint = RpcServiceEndpoint::new();
    let service = user_service().unwrap();
    let invocations = Arc::new(AtomicUsize::new(0));
    let counter = invocations.clone();

    endpoint
        .bind_unary::<GetUser, _, _, _>(&service, move |_ctx, _req| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, RpcError>(User::default()) }
        })
        .await
        .unwrap();

    let response = endpoint
        .dispatch(get_user_call(1).with_timeout(Duration::ZERO))
        .await
        .collect()
        .await;

    assert_eq!(response.outcome.code(), Some(Code::DeadlineExceeded));
    assert_eq!(invocations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unrepresentable_client_timeout_means_no_deadline() {
    let endpoint = RpcServiceEndpoint::new();
    let service = user_service().unwrap();

    endpoint
        .bind_unary::<GetUser, _, _, _>(&service, |ctx, req: GetUserRequest| async move {
            assert_eq!(ctx.timeout(), None);
            Ok::<_, RpcError>(User {
                id: req.id,
                ..Default::default()
            })
        })
        .await
        .unwrap();

    let response = endpoint
        .dispatch(get_user_call(3).with_timeout(Duration::MAX))
        .await
        .collect()
        .await;

    assert!(response.outcome.is_ok());
    assert_eq!(GetUser::decode_response(&response.messages[0]).unwrap().id, 3);
}

#[tokio::test]
async fn panicking_cancel_callback_still_ends_the_call() {
    let endpoint = RpcServiceEndpoint::new();
    let service = user_service().unwrap();
    let later_ran = Arc::new(AtomicUsize::new(0));
    let counter = later_ran.clone();

    endpoint
        .bind_unary::<GetUser, _, _, _>(&service, move |ctx, _req| {
            let counter = counter.clone();
            ctx.signal().on_cancel(|| panic!("cleanup failed"));
            ctx.signal().on_cancel(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            async move {
                future::pending::<()>().await;
                Ok::<_, RpcError>(User::default())
            }
        })
        .await
        .unwrap();

    let (_controller, events) = endpoint
        .dispatch(get_user_call(1).with_timeout(Duration::from_millis(20)))
        .await
        .spawn();
    let response = CollectedResponse::gather(events).await;

    assert_eq!(response.outcome.code(), Some(Code::DeadlineExceeded));
    assert_eq!(later_ran.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn finished_call_releases_its_cancel_callbacks() {
    let endpoint = RpcServiceEndpoint::new();
    let service = user_service().unwrap();
    let held: Arc<Mutex<Option<Weak<()>>>> = Arc::new(Mutex::new(None));
    let slot = held.clone();

    endpoint
        .bind_unary::<GetUser, _, _, _>(&service, move |ctx, req: GetUserRequest| {
            let marker = Arc::new(());
            *slot.lock().unwrap() = Some(Arc::downgrade(&marker));
            let observer = ctx.clone();
            ctx.signal().on_cancel(move || {
                let _ = (observer.call_id(), &marker);
            });
            async move {
                Ok::<_, RpcError>(User {
                    id: req.id,
                    ..Default::default()
                })
            }
        })
        .await
        .unwrap();

    let response = endpoint.dispatch(get_user_call(5)).await.collect().await;
    assert!(response.outcome.is_ok());

    let marker = held.lock().unwrap().clone().unwrap();
    assert!(marker.upgrade().is_none());
}

#[tokio::test]
async fn handler_sees_a_shrinking_timeout() {
    let endpoint = RpcServiceEndpoint::new();
    let service = user_service().unwrap();

    endpoint
        .bind_unary::<GetUser, _, _, _>(&service, |ctx, _req| async move {
            let first = ctx.timeout().unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
            let second = ctx.timeout().unwrap();
            assert!(second < first);
            Ok::<_, RpcError>(User {
                id: u32::try_from(ctx.timeout_ms().unwrap_or(0)).unwrap_or(u32::MAX),
                ..Default::default()
            })
        })
        .await
        .unwrap();

    let (_controller, events) = endpoint
        .dispatch(get_user_call(1).with_timeout(Duration::from_secs(10)))
        .await
        .spawn();
    let response = CollectedResponse::gather(events).await;

    assert!(response.outcome.is_ok());
    let user = GetUser::decode_response(&response.messages[0]).unwrap();
    assert!(user.id > 0 && user.id < 10_000);
}

#[tokio::test]
async fn concurrent_calls_never_share_context() {
    let endpoint = Arc::new(RpcServiceEndpoint::new());
    let service = user_service().unwrap();

    endpoint
        .bind_unary::<GetUser, _, _, _>(&service, |ctx, req: GetUserRequest| async move {
            let delay = rand::rng().random_range(0..5);
            ctx.set_response_header("x-user-id", &req.id.to_string())
                .unwrap();
            tokio::time::sleep(Duration::from_millis(delay)).await;
            ctx.set_response_header("x-call-id", &ctx.call_id().to_string())
                .unwrap();
            Ok::<_, RpcError>(User {
                id: req.id,
                ..Default::default()
            })
        })
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for id in 0..32u32 {
        let endpoint = endpoint.clone();
        tasks.push(tokio::spawn(async move {
            let (_controller, events) = endpoint.dispatch(get_user_call(id)).await.spawn();
            (id, CollectedResponse::gather(events).await)
        }));
    }

    let mut call_ids = HashSet::new();
    for task in tasks {
        let (id, response) = task.await.unwrap();
        assert!(response.outcome.is_ok());

        let expected_id = id.to_string();
        assert_eq!(response.headers.get("x-user-id"), Some(expected_id.as_str()));
        assert_eq!(response.headers.get_all("x-user-id").count(), 1);
        assert!(call_ids.insert(response.headers.get("x-call-id").unwrap().to_string()));

        let user = GetUser::decode_response(&response.messages[0]).unwrap();
        assert_eq!(user.id, id);
    }
    assert_eq!(call_ids.len(), 32);
}
