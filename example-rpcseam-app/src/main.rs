use example_rpcseam_app::{Directory, build_endpoint, call_streaming, call_unary};
use example_rpcseam_service_definition::{
    Chat, CountUsers, Echo, GetUser, ListUsers,
    user_service::{ChatMessage, GetUserRequest, ListUsersRequest, User},
};
use rpcseam_endpoint::EndpointConfig;
use std::time::Duration;
use tokio::join;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = EndpointConfig {
        max_timeout: Some(Duration::from_secs(5)),
        ..EndpointConfig::default()
    };
    let endpoint = match build_endpoint(Directory::sample(), config).await {
        Ok(endpoint) => endpoint,
        Err(err) => {
            tracing::error!("Failed to bind handlers: {}", err);
            std::process::exit(1);
        }
    };

    // `join!` will await all responses before proceeding
    let (ada, grace, nobody, echo) = join!(
        call_unary::<GetUser>(&endpoint, GetUserRequest { id: 1 }),
        call_unary::<GetUser>(&endpoint, GetUserRequest { id: 2 }),
        call_unary::<GetUser>(&endpoint, GetUserRequest { id: 99 }),
        call_unary::<Echo>(&endpoint, b"ping".to_vec()),
    );

    match ada {
        Ok((response, user)) => println!(
            "GetUser(1): {:?} (x-user-id: {:?})",
            user,
            response.headers.get("x-user-id")
        ),
        Err(err) => println!("GetUser(1) failed: {}", err),
    }
    println!("GetUser(2): {:?}", grace.map(|(_, user)| user));
    println!("GetUser(99): {:?}", nobody.map(|(_, user)| user));
    println!("Echo: {:?}", echo.map(|(_, bytes)| String::from_utf8_lossy(&bytes).into_owned()));

    let (listed, counted, chatted) = join!(
        call_streaming::<ListUsers, _>(&endpoint, [ListUsersRequest { limit: 2 }]),
        call_streaming::<CountUsers, _>(&endpoint, vec![User::default(); 4]),
        call_streaming::<Chat, _>(
            &endpoint,
            ["hello", "world"].map(|text| ChatMessage { text: text.into() }),
        ),
    );

    println!("ListUsers(limit 2): {:?}", listed);
    println!("CountUsers(4 users): {:?}", counted);
    println!("Chat: {:?}", chatted);
}
