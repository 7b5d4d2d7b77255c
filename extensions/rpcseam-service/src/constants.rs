/// The default buffer size for the channel carrying a call's response events
/// from the call driver to the transport.
///
/// This value represents the number of *events* (headers, messages, end) the
/// channel can hold before applying backpressure to the handler, not the total
/// size in bytes.
///
/// A small buffer prioritizes low memory usage and responsive backpressure,
/// while a larger buffer can increase throughput by absorbing network jitter
/// at the cost of higher potential memory consumption.
pub const DEFAULT_RPC_STREAM_CHANNEL_BUFFER_SIZE: usize = 8;
