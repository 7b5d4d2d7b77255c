use super::{MethodHandler, RpcServiceEndpointInterface};
use rpcseam::{CancellationMode, MethodDescriptor, ServiceDescriptor};
use rpcseam_service::constants::DEFAULT_RPC_STREAM_CHANNEL_BUFFER_SIZE;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

// --- Conditionally Alias the Mutex Implementation ---
#[cfg(not(feature = "tokio_support"))]
use std::sync::Mutex;
#[cfg(feature = "tokio_support")]
use tokio::sync::Mutex;

/// A handler together with the descriptors it was bound against.
#[derive(Clone)]
pub struct BoundMethod {
    pub service: Arc<ServiceDescriptor>,
    pub method: Arc<MethodDescriptor>,
    pub handler: MethodHandler,
}

/// Endpoint-wide settings applied to every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Upper bound for any call's deadline. A client timeout larger than
    /// this (or no client timeout at all) is clamped to it.
    pub max_timeout: Option<Duration>,

    /// What handlers learn about why their call was cancelled.
    pub cancellation_mode: CancellationMode,

    /// Capacity of each call's response event channel.
    pub response_buffer_size: usize,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            max_timeout: None,
            cancellation_mode: CancellationMode::default(),
            response_buffer_size: DEFAULT_RPC_STREAM_CHANNEL_BUFFER_SIZE,
        }
    }
}

/// A concrete dispatch table of bound methods.
pub struct RpcServiceEndpoint {
    handlers: Arc<Mutex<HashMap<u64, BoundMethod>>>,
    config: EndpointConfig,
}

impl Default for RpcServiceEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcServiceEndpoint {
    /// Creates an endpoint with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EndpointConfig::default())
    }

    pub fn with_config(config: EndpointConfig) -> Self {
        Self {
            handlers: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }
}

#[async_trait::async_trait]
impl RpcServiceEndpointInterface for RpcServiceEndpoint {
    type HandlersLock = Mutex<HashMap<u64, BoundMethod>>;

    fn get_handlers(&self) -> Arc<Self::HandlersLock> {
        self.handlers.clone()
    }

    fn config(&self) -> &EndpointConfig {
        &self.config
    }
}
