pub mod client;
pub mod error;
pub mod types;

pub use client::{ApiClient, BlocklistApi};
pub use error::{ApiError, RedirectReason};
pub use types::{BlockedRecord, EndDate};
