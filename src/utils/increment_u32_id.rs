use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};

/// A simple counter which is initialized at 1.
static GLOBAL_ID_COUNTER: Lazy<AtomicU64> = Lazy::new(|| AtomicU64::new(1));

/// Returns the next process-wide call id. Wraps after `u32::MAX` calls.
#[inline]
pub fn increment_u32_id() -> u32 {
    GLOBAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed) as u32
}
