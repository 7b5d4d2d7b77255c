use rpcseam::{
    DescriptorError, MethodIdempotency, MethodKind, MethodSchema, ServiceDescriptor,
    ServiceSchema,
};
use rpcseam_service::{RpcMethod, rpc_method_id};
use std::io;
use std::sync::Arc;

pub const ECHO_SERVICE: ServiceSchema = ServiceSchema {
    type_name: "example.v1.EchoService",
    methods: &[MethodSchema {
        name: "Echo",
        kind: MethodKind::Unary as u8,
        input_type: "bytes",
        output_type: "bytes",
        idempotency: MethodIdempotency::NoSideEffects as u8,
    }],
};

pub fn echo_service() -> Result<Arc<ServiceDescriptor>, DescriptorError> {
    ServiceDescriptor::from_schema(&ECHO_SERVICE)
}

pub struct Echo;

impl RpcMethod for Echo {
    const SERVICE: &'static str = "example.v1.EchoService";
    const NAME: &'static str = "Echo";
    const METHOD_ID: u64 = rpc_method_id!("/example.v1.EchoService/Echo");

    type Input = Vec<u8>;
    type Output = Vec<u8>;

    fn encode_request(input: Self::Input) -> Result<Vec<u8>, io::Error> {
        Ok(input)
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error> {
        Ok(bytes.to_vec())
    }

    fn encode_response(output: Self::Output) -> Result<Vec<u8>, io::Error> {
        Ok(output)
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        Ok(bytes.to_vec())
    }
}
