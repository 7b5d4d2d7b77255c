/// A message type that can appear as a method's input or output.
///
/// Every message declares a `Partial` form: the same fields, all optional.
/// Handlers may reply with a partial message and leave it to the runtime to
/// fill the unset fields with the type's declared defaults via
/// [`RpcMessage::complete`] before the reply is encoded.
pub trait RpcMessage: Sized + Send + 'static {
    /// Fully-qualified schema name, matched against method descriptors at
    /// bind time.
    const TYPE_NAME: &'static str;

    type Partial: Default + Send + 'static;

    /// Fills every field missing from `partial` with its declared default.
    fn complete(partial: Self::Partial) -> Self;
}

/// What a handler returns for a single-message reply.
pub enum Reply<M: RpcMessage> {
    Complete(M),
    Partial(M::Partial),
}

impl<M: RpcMessage> Reply<M> {
    pub fn partial(partial: M::Partial) -> Self {
        Reply::Partial(partial)
    }

    /// Resolves the reply into a full message, completing partials with
    /// defaults.
    pub fn into_message(self) -> M {
        match self {
            Reply::Complete(message) => message,
            Reply::Partial(partial) => M::complete(partial),
        }
    }
}

impl<M: RpcMessage> From<M> for Reply<M> {
    fn from(message: M) -> Self {
        Reply::Complete(message)
    }
}

impl RpcMessage for Vec<u8> {
    const TYPE_NAME: &'static str = "bytes";
    type Partial = Vec<u8>;

    fn complete(partial: Self::Partial) -> Self {
        partial
    }
}

impl RpcMessage for String {
    const TYPE_NAME: &'static str = "string";
    type Partial = String;

    fn complete(partial: Self::Partial) -> Self {
        partial
    }
}

impl RpcMessage for () {
    const TYPE_NAME: &'static str = "google.protobuf.Empty";
    type Partial = ();

    fn complete(_partial: Self::Partial) -> Self {}
}
