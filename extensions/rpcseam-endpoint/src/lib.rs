mod call;
pub use call::*;

mod dispatch;
pub use dispatch::*;

mod endpoint;
pub use endpoint::*;

mod endpoint_interface;
pub use endpoint_interface::*;

pub mod error;

mod handler;
pub use handler::*;

mod with_handlers_trait;
pub use with_handlers_trait::*;
