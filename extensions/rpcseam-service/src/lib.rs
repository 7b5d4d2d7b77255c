pub mod constants;
pub use constants::*;
mod macros;
pub use macros::*;
mod message;
pub use message::*;
mod method;
pub use method::*;
