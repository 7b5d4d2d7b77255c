mod increment_u32_id;
pub use increment_u32_id::increment_u32_id;
