//! Guild block-list: ordering, search, validation and cache-aware loading.

pub mod notice;
pub mod records;
mod service;
mod throttle;

pub use notice::NoticeSink;
pub use service::{BlocklistService, Fetch, FetchOutcome, LoadingFlags, Mutation};
pub use throttle::RefreshThrottle;
