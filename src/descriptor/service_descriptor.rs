use super::{DescriptorError, MethodDescriptor, MethodIdempotency, MethodKind};
use std::sync::Arc;

/// Raw method entry as emitted by a schema compiler.
///
/// The call shape and idempotency are untyped tags here; they are validated
/// by [`ServiceDescriptor::from_schema`].
#[derive(Debug, Clone, Copy)]
pub struct MethodSchema {
    pub name: &'static str,
    pub kind: u8,
    pub input_type: &'static str,
    pub output_type: &'static str,
    pub idempotency: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct ServiceSchema {
    pub type_name: &'static str,
    pub methods: &'static [MethodSchema],
}

/// Identifies a logical RPC service and owns its method descriptors.
#[derive(Debug, PartialEq, Eq)]
pub struct ServiceDescriptor {
    type_name: String,
    methods: Vec<Arc<MethodDescriptor>>,
}

impl ServiceDescriptor {
    /// Builds a descriptor from already-typed methods.
    ///
    /// Methods whose `service()` differs from `type_name` are re-homed under
    /// this service.
    pub fn new(
        type_name: impl Into<String>,
        methods: Vec<MethodDescriptor>,
    ) -> Result<Arc<Self>, DescriptorError> {
        let type_name = type_name.into();
        let mut out: Vec<Arc<MethodDescriptor>> = Vec::with_capacity(methods.len());

        for method in methods {
            if out.iter().any(|m| m.name() == method.name()) {
                return Err(DescriptorError::DuplicateMethod(method.name().to_string()));
            }

            let method = if method.service() == type_name {
                method
            } else {
                MethodDescriptor::new(
                    type_name.clone(),
                    method.name(),
                    method.kind(),
                    method.input_type(),
                    method.output_type(),
                )
                .with_idempotency(method.idempotency())
            };
            out.push(Arc::new(method));
        }

        Ok(Arc::new(Self {
            type_name,
            methods: out,
        }))
    }

    /// Validates a raw schema, rejecting tags outside the known variant sets.
    pub fn from_schema(schema: &ServiceSchema) -> Result<Arc<Self>, DescriptorError> {
        let mut methods = Vec::with_capacity(schema.methods.len());

        for raw in schema.methods {
            let kind = MethodKind::try_from(raw.kind).map_err(|_| {
                DescriptorError::UnknownMethodKind {
                    method: raw.name.to_string(),
                    tag: raw.kind,
                }
            })?;
            let idempotency = MethodIdempotency::try_from(raw.idempotency).map_err(|_| {
                DescriptorError::UnknownIdempotency {
                    method: raw.name.to_string(),
                    tag: raw.idempotency,
                }
            })?;

            methods.push(
                MethodDescriptor::new(
                    schema.type_name,
                    raw.name,
                    kind,
                    raw.input_type,
                    raw.output_type,
                )
                .with_idempotency(idempotency),
            );
        }

        Self::new(schema.type_name, methods)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn methods(&self) -> &[Arc<MethodDescriptor>] {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&Arc<MethodDescriptor>> {
        self.methods.iter().find(|m| m.name() == name)
    }
}
