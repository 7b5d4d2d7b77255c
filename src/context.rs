mod call_controller;
mod cancellation;
mod deadline;
mod handler_context;

pub use call_controller::CallController;
pub use cancellation::{CancelCause, CancellationMode, CancellationSignal};
pub use deadline::Deadline;
pub use handler_context::{HandlerContext, HandlerContextBuilder};
