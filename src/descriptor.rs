mod descriptor_error;
mod method_descriptor;
mod method_kind;
mod service_descriptor;

pub use descriptor_error::DescriptorError;
pub use method_descriptor::MethodDescriptor;
pub use method_kind::{MethodIdempotency, MethodKind};
pub use service_descriptor::{MethodSchema, ServiceDescriptor, ServiceSchema};
