use xxhash_rust::const_xxh3::xxh3_64 as const_xxh3_64;

/// Hashes a procedure path (`/pkg.Service/Method`) into a method ID.
///
/// Usable both in `const` contexts and at runtime, so IDs derived from
/// schema-built descriptors match the ones computed by [`rpc_method_id!`].
pub const fn method_id_hash(name: &str) -> u64 {
    const_xxh3_64(name.as_bytes())
}

/// Compile-time RPC method ID generator using xxHash3.
///
/// This macro computes a deterministic `u64` identifier from a procedure path
/// at **compile time** using the xxh3-64 hash function. The hash is:
///
/// - **Fast** (no runtime cost)
/// - **Deterministic** (same on all platforms, including WASM)
/// - **Statically embeddable** (usable in `const` contexts)
///
/// ## Example
///
/// ```rust
/// use rpcseam_service::{method_id_hash, rpc_method_id};
/// let id_1 = rpc_method_id!("/math.v1.Calculator/Add");
/// let id_2 = rpc_method_id!("/math.v1.Calculator/Mult");
/// assert_ne!(id_1, id_2);
/// assert_eq!(id_1, method_id_hash("/math.v1.Calculator/Add"));
/// ```
#[macro_export]
macro_rules! rpc_method_id {
    ($name:literal) => {{
        const ID: u64 = $crate::method_id_hash($name);
        ID
    }};
}
