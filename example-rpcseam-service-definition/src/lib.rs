mod codec;

pub mod echo_service;
pub mod user_service;

pub use echo_service::Echo;
pub use user_service::{Chat, CountUsers, GetUser, ListUsers};
