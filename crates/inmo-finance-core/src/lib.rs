pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "roi")]
pub mod roi;

#[cfg(feature = "uva")]
pub mod uva;

#[cfg(feature = "market")]
pub mod market;

pub use error::InmoFinanceError;
pub use types::*;

/// Standard result type for all inmo-finance operations
pub type InmoResult<T> = Result<T, InmoFinanceError>;
