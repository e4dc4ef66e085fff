pub mod error;
pub mod facts;
pub mod time_value;
pub mod types;
pub mod underwriting;

pub use error::UnderwriteError;
pub use types::*;

/// Standard result type for all underwriting operations
pub type UnderwriteResult<T> = Result<T, UnderwriteError>;
