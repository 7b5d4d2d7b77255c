mod header_error;
mod header_list;

pub use header_error::HeaderError;
pub use header_list::HeaderList;
