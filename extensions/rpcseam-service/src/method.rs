use crate::RpcMessage;
use std::io;

// A typed method definition couples a method's identity with the codec for
// its messages in one place. The endpoint uses it to turn byte-level calls
// into typed handler invocations; the call shape itself is not declared here
// but taken from the service descriptor the method is bound against, and the
// endpoint checks the two agree before any call is dispatched.

pub trait RpcMethod {
    /// Fully-qualified name of the owning service (e.g. `example.v1.UserService`).
    const SERVICE: &'static str;

    /// Method name as declared in the schema (e.g. `GetUser`).
    const NAME: &'static str;

    /// Stable identifier for routing; normally
    /// `rpc_method_id!("/{SERVICE}/{NAME}")`.
    const METHOD_ID: u64;

    /// The request message type.
    type Input: RpcMessage;

    /// The response message type.
    type Output: RpcMessage;

    /// Encodes the request into a byte array.
    fn encode_request(input: Self::Input) -> Result<Vec<u8>, io::Error>;

    /// Decodes raw request bytes into a typed request struct.
    ///
    /// # Arguments
    /// * `bytes` - Serialized request payload.
    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error>;

    /// Encodes the response value into a byte array.
    fn encode_response(output: Self::Output) -> Result<Vec<u8>, io::Error>;

    /// Decodes raw response bytes into a typed response struct or value.
    ///
    /// # Arguments
    /// * `bytes` - Serialized response payload.
    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error>;

    /// The procedure path, `/{SERVICE}/{NAME}`.
    fn path() -> String {
        format!("/{}/{}", Self::SERVICE, Self::NAME)
    }
}
