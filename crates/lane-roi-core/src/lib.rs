pub mod error;
pub mod types;

#[cfg(feature = "roi")]
pub mod roi;

pub use error::RoiError;
pub use types::*;

/// Standard result type for the validation boundary
pub type RoiCoreResult<T> = Result<T, RoiError>;
