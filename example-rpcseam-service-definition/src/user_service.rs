//! `example.v1.UserService`: one method per call shape.

mod messages;
mod methods;

pub use messages::*;
pub use methods::*;

use rpcseam::{
    DescriptorError, MethodIdempotency, MethodKind, MethodSchema, ServiceDescriptor,
    ServiceSchema,
};
use std::sync::Arc;

pub const USER_SERVICE: ServiceSchema = ServiceSchema {
    type_name: "example.v1.UserService",
    methods: &[
        MethodSchema {
            name: "GetUser",
            kind: MethodKind::Unary as u8,
            input_type: "example.v1.GetUserRequest",
            output_type: "example.v1.User",
            idempotency: MethodIdempotency::NoSideEffects as u8,
        },
        MethodSchema {
            name: "ListUsers",
            kind: MethodKind::ServerStreaming as u8,
            input_type: "example.v1.ListUsersRequest",
            output_type: "example.v1.User",
            idempotency: MethodIdempotency::NoSideEffects as u8,
        },
        MethodSchema {
            name: "CountUsers",
            kind: MethodKind::ClientStreaming as u8,
            input_type: "example.v1.User",
            output_type: "example.v1.UserCount",
            idempotency: MethodIdempotency::Unknown as u8,
        },
        MethodSchema {
            name: "Chat",
            kind: MethodKind::BiDiStreaming as u8,
            input_type: "example.v1.ChatMessage",
            output_type: "example.v1.ChatMessage",
            idempotency: MethodIdempotency::Unknown as u8,
        },
    ],
};

pub fn user_service() -> Result<Arc<ServiceDescriptor>, DescriptorError> {
    ServiceDescriptor::from_schema(&USER_SERVICE)
}
