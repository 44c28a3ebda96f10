// Cache module for upstream API responses.
// A read-through cache with per-entry TTL avoids refetching expensive,
// rate-limited GitHub API calls.

pub mod response;
pub mod store;

pub use response::{CachePolicy, DEFAULT_TTL, ResponseCache};
pub use store::{CacheEntry, CacheStore};
