use super::{MethodIdempotency, MethodKind};

/// Describes one method of a service.
///
/// Immutable once built; shared between the dispatch table and every
/// [`HandlerContext`](crate::HandlerContext) of a call to this method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    service: String,
    name: String,
    kind: MethodKind,
    input_type: String,
    output_type: String,
    idempotency: MethodIdempotency,
    path: String,
}

impl MethodDescriptor {
    pub fn new(
        service: impl Into<String>,
        name: impl Into<String>,
        kind: MethodKind,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Self {
        let service = service.into();
        let name = name.into();
        let path = format!("/{}/{}", service, name);
        Self {
            service,
            name,
            kind,
            input_type: input_type.into(),
            output_type: output_type.into(),
            idempotency: MethodIdempotency::Unknown,
            path,
        }
    }

    pub fn with_idempotency(mut self, idempotency: MethodIdempotency) -> Self {
        self.idempotency = idempotency;
        self
    }

    /// Fully-qualified name of the owning service.
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn input_type(&self) -> &str {
        &self.input_type
    }

    pub fn output_type(&self) -> &str {
        &self.output_type
    }

    pub fn idempotency(&self) -> MethodIdempotency {
        self.idempotency
    }

    /// The procedure path, `/{service}/{method}`.
    pub fn path(&self) -> &str {
        &self.path
    }
}
