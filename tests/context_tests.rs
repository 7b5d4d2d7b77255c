use rpcseam::http::{HeaderMap, HeaderValue, Method};
use rpcseam::{
    CancelCause, CancellationMode, Deadline, HandlerContext, HeaderError, MethodDescriptor,
    MethodKind, Protocol, ServiceDescriptor,
};
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn test_context() -> HandlerContext {
    let (ctx, _controller) = builder().build();
    ctx
}

fn builder() -> rpcseam::HandlerContextBuilder {
    let service = ServiceDescriptor::new(
        "test.v1.Echo",
        vec![MethodDescriptor::new(
            "test.v1.Echo",
            "Say",
            MethodKind::Unary,
            "test.v1.SayRequest",
            "test.v1.SayResponse",
        )],
    )
    .unwrap();
    let method = service.method("Say").unwrap().clone();
    HandlerContext::builder(service, method)
}

#[test]
fn exposes_call_metadata() {
    let mut headers = HeaderMap::new();
    headers.insert("x-client", HeaderValue::from_static("tests"));

    let mut extensions = rpcseam::http::Extensions::new();
    extensions.insert(42u16);

    let (ctx, _controller) = builder()
        .protocol(Protocol::Grpc)
        .http_method(Method::GET)
        .request_headers(headers)
        .extensions(extensions)
        .build();

    assert_eq!(ctx.protocol(), Protocol::Grpc);
    assert_eq!(*ctx.http_method(), Method::GET);
    assert_eq!(ctx.service().type_name(), "test.v1.Echo");
    assert_eq!(ctx.method().name(), "Say");
    assert_eq!(ctx.method().path(), "/test.v1.Echo/Say");
    assert_eq!(
        ctx.request_headers().get("X-Client").unwrap().to_str().unwrap(),
        "tests"
    );
    assert_eq!(ctx.extensions().get::<u16>(), Some(&42));
}

#[test]
fn no_deadline_reports_none() {
    let ctx = test_context();
    assert_eq!(ctx.timeout(), None);
    assert_eq!(ctx.timeout_ms(), None);
    assert!(!ctx.deadline().is_expired());
}

#[test]
fn timeout_is_recomputed_and_non_increasing() {
    let (ctx, _controller) = builder()
        .deadline(Deadline::after(Duration::from_millis(200)))
        .build();

    let first = ctx.timeout().unwrap();
    std::thread::sleep(Duration::from_millis(20));
    let second = ctx.timeout().unwrap();

    assert!(first <= Duration::from_millis(200));
    assert!(second < first, "{:?} should be below {:?}", second, first);
}

#[test]
fn timeout_saturates_at_zero_after_expiry() {
    let (ctx, _controller) = builder()
        .deadline(Deadline::after(Duration::from_millis(5)))
        .build();

    std::thread::sleep(Duration::from_millis(15));
    assert_eq!(ctx.timeout(), Some(Duration::ZERO));
    assert_eq!(ctx.timeout_ms(), Some(0));
    assert!(ctx.deadline().is_expired());

    std::thread::sleep(Duration::from_millis(5));
    assert_eq!(ctx.timeout(), Some(Duration::ZERO));
}

#[test]
fn deadline_from_timeouts_takes_the_shorter() {
    let d = Deadline::from_timeouts(Some(Duration::from_secs(60)), Some(Duration::from_millis(50)));
    assert!(d.remaining().unwrap() <= Duration::from_millis(50));

    let d = Deadline::from_timeouts(None, Some(Duration::from_secs(1)));
    assert!(d.remaining().unwrap() <= Duration::from_secs(1));

    assert_eq!(Deadline::from_timeouts(None, None), Deadline::none());
}

#[test]
fn unrepresentable_timeout_is_no_deadline() {
    assert_eq!(Deadline::after(Duration::MAX), Deadline::none());
    assert_eq!(Deadline::from_timeouts(Some(Duration::MAX), None), Deadline::none());

    // The server limit still applies.
    let d = Deadline::from_timeouts(Some(Duration::MAX), Some(Duration::from_millis(50)));
    assert!(d.remaining().unwrap() <= Duration::from_millis(50));
}

#[test]
fn cancellation_fires_once_and_stays_fired() {
    let (ctx, controller) = builder().build();
    assert!(!ctx.is_cancelled());

    assert!(controller.cancel(CancelCause::Canceled));
    assert!(ctx.is_cancelled());

    assert!(!controller.cancel(CancelCause::DeadlineExceeded));
    assert!(ctx.is_cancelled());
    assert_eq!(controller.cause(), Some(CancelCause::Canceled));
}

#[test]
fn on_cancel_callbacks_run_exactly_once() {
    let (ctx, controller) = builder().build();
    let runs = Arc::new(AtomicUsize::new(0));

    {
        let runs = runs.clone();
        ctx.signal().on_cancel(move || {
            runs.fetch_add(1, Ordering::SeqCst);
        });
    }

    controller.cancel(CancelCause::DeadlineExceeded);
    controller.cancel(CancelCause::Canceled);
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // Registered after the fact: runs immediately.
    {
        let runs = runs.clone();
        ctx.signal().on_cancel(move || {
            runs.fetch_add(10, Ordering::SeqCst);
        });
    }
    assert_eq!(runs.load(Ordering::SeqCst), 11);
}

#[test]
fn panicking_callback_does_not_stop_the_others() {
    let (ctx, controller) = builder().build();
    let runs = Arc::new(AtomicUsize::new(0));

    ctx.signal().on_cancel(|| panic!("cleanup failed"));
    {
        let runs = runs.clone();
        ctx.signal().on_cancel(move || {
            runs.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert!(controller.cancel(CancelCause::Canceled));
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // Registered after the fact and panicking: contained as well.
    ctx.signal().on_cancel(|| panic!("late cleanup failed"));
    assert!(ctx.is_cancelled());
}

#[test]
fn freezing_trailers_drops_pending_callbacks() {
    let (ctx, controller) = builder().build();
    let marker = Arc::new(());
    let weak: Weak<()> = Arc::downgrade(&marker);

    let observer = ctx.clone();
    ctx.signal().on_cancel(move || {
        let _ = (observer.call_id(), &marker);
    });
    assert!(weak.upgrade().is_some());

    controller.freeze_trailers();
    assert!(weak.upgrade().is_none());

    // The call is over; new callbacks are not retained either.
    let marker = Arc::new(());
    let weak = Arc::downgrade(&marker);
    ctx.signal().on_cancel(move || drop(marker));
    assert!(weak.upgrade().is_none());
}

#[tokio::test]
async fn cancelled_future_resolves_after_fire() {
    let (ctx, controller) = builder().build();

    let waiter = tokio::spawn(ctx.cancelled());
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!waiter.is_finished());

    controller.cancel(CancelCause::Canceled);
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("cancelled() did not resolve")
        .unwrap();

    // Already fired: resolves immediately.
    tokio::time::timeout(Duration::from_millis(50), ctx.cancelled())
        .await
        .unwrap();
}

#[tokio::test]
async fn cancelled_future_does_not_resolve_when_context_dropped() {
    let (ctx, controller) = builder().build();
    let pending = ctx.cancelled();
    drop(ctx);
    drop(controller);

    let result = tokio::time::timeout(Duration::from_millis(30), pending).await;
    assert!(result.is_err());
}

#[test]
fn unified_mode_hides_cause() {
    let (ctx, controller) = builder().build();
    controller.cancel(CancelCause::DeadlineExceeded);

    assert!(ctx.is_cancelled());
    assert_eq!(ctx.cancel_cause(), None);
    assert_eq!(controller.cause(), Some(CancelCause::DeadlineExceeded));
}

#[test]
fn distinguished_mode_exposes_cause() {
    let (ctx, controller) = builder()
        .cancellation_mode(CancellationMode::Distinguished)
        .build();
    assert_eq!(ctx.cancel_cause(), None);

    controller.cancel(CancelCause::DeadlineExceeded);
    assert_eq!(ctx.cancel_cause(), Some(CancelCause::DeadlineExceeded));
}

#[test]
fn response_headers_freeze() {
    let (ctx, controller) = builder().build();

    ctx.append_response_header("X-One", "1").unwrap();
    ctx.append_response_header("x-one", "2").unwrap();
    assert!(!ctx.headers_sent());

    let sent = controller.freeze_headers();
    assert_eq!(sent.get_all("x-one").count(), 2);
    assert!(ctx.headers_sent());

    assert_eq!(
        ctx.append_response_header("x-late", "3"),
        Err(HeaderError::Frozen)
    );
    assert_eq!(
        ctx.with_response_headers(|h| h.len()),
        Err(HeaderError::Frozen)
    );

    // A second freeze returns the same snapshot.
    assert_eq!(controller.freeze_headers(), sent);
}

#[test]
fn trailers_stay_mutable_until_finished() {
    let (ctx, controller) = builder().build();

    controller.freeze_headers();
    ctx.set_response_trailer("x-total", "1").unwrap();
    ctx.set_response_trailer("X-Total", "2").unwrap();

    let trailers = controller.freeze_trailers();
    assert_eq!(trailers.get("x-total"), Some("2"));
    assert_eq!(trailers.len(), 1);

    assert_eq!(
        ctx.append_response_trailer("x-late", "v"),
        Err(HeaderError::Frozen)
    );
}

#[test]
fn calls_get_distinct_contexts() {
    let (a, _ca) = builder().build();
    let (b, cb) = builder().build();

    assert_ne!(a.call_id(), b.call_id());

    a.append_response_header("x-owner", "a").unwrap();
    assert_eq!(cb.freeze_headers().get("x-owner"), None);

    cb.cancel(CancelCause::Canceled);
    assert!(b.is_cancelled());
    assert!(!a.is_cancelled());
}

#[test]
fn cloned_context_is_the_same_call() {
    let (ctx, controller) = builder().build();
    let clone = ctx.clone();

    clone.append_response_header("x-from-clone", "1").unwrap();
    assert_eq!(controller.freeze_headers().get("x-from-clone"), Some("1"));
    assert_eq!(clone.call_id(), ctx.call_id());
}
