pub mod format;
pub mod response;

pub use response::{ApiResponse, ApiResult};
