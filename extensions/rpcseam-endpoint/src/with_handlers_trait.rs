use crate::endpoint::BoundMethod;
use std::collections::HashMap;

/// Lends the endpoint's method table, keyed by `method_id_hash` of each
/// procedure path, to a closure.
///
/// Binding and dispatch only touch the table through this trait, so the
/// endpoint works the same whether `tokio_support` picks the async mutex or
/// the blocking one.
#[async_trait::async_trait]
pub trait WithHandlers: Send + Sync {
    /// Runs `f` while holding the table lock. `f` must not await.
    async fn with_handlers<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut HashMap<u64, BoundMethod>) -> R + Send,
        R: Send;
}

#[cfg(feature = "tokio_support")]
#[async_trait::async_trait]
impl WithHandlers for tokio::sync::Mutex<HashMap<u64, BoundMethod>> {
    async fn with_handlers<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut HashMap<u64, BoundMethod>) -> R + Send,
        R: Send,
    {
        let mut guard = self.lock().await;
        f(&mut guard)
    }
}

/// Blocking variant for transports that drive calls without tokio. The lock
/// is held only for a map lookup or insert.
#[async_trait::async_trait]
impl WithHandlers for std::sync::Mutex<HashMap<u64, BoundMethod>> {
    async fn with_handlers<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut HashMap<u64, BoundMethod>) -> R + Send,
        R: Send,
    {
        // The table is only ever inserted into, so a poisoned guard still
        // holds a consistent map.
        let mut guard = self.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}
