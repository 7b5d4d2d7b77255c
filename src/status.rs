mod code;
mod rpc_error;

pub use code::Code;
pub use rpc_error::RpcError;
