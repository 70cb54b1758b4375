//! Utility modules

pub mod error;
pub mod logger;
pub mod pagination;

pub use error::{AppError, AppResponse, AppResult, ok, ok_with_message};
pub use pagination::{PageQuery, Paginated};
