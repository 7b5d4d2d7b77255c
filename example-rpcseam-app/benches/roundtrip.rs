use criterion::{Criterion, criterion_group, criterion_main};
use example_rpcseam_app::{Directory, build_endpoint, call_unary};
use example_rpcseam_service_definition::{Echo, GetUser, user_service::GetUserRequest};
use futures::{StreamExt, stream::FuturesUnordered};
use rpcseam_endpoint::EndpointConfig;
use std::hint::black_box;
use tokio::runtime::Runtime;

fn bench_roundtrip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    // Bind every handler once
    let endpoint = rt
        .block_on(build_endpoint(Directory::sample(), EndpointConfig::default()))
        .unwrap();

    c.bench_function("get_user_dispatch_futures_unordered_batch_10", |b| {
        b.to_async(&rt).iter(|| async {
            let mut tasks = FuturesUnordered::new();

            // These futures are submitted all at once and polled concurrently.
            for id in 0..10 {
                tasks.push(call_unary::<GetUser>(&endpoint, GetUserRequest { id: id % 3 + 1 }));
            }

            let mut results = Vec::with_capacity(10);
            while let Some(res) = tasks.next().await {
                results.push(res.unwrap());
            }

            // Prevent compiler from optimizing away the result
            black_box(results);
        });
    });

    c.bench_function("echo_dispatch_singles", |b| {
        b.to_async(&rt).iter(|| async {
            let res = call_unary::<Echo>(&endpoint, vec![1, 2, 3, 4]).await;
            black_box(res.unwrap());
        });
    });
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
