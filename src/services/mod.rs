// Service exports
pub mod cache;
pub mod postgres;
pub mod rest;
pub mod store;

pub use cache::{CacheManager, CacheKey, CacheError, CacheStats};
pub use postgres::{PostgresClient, PostgresError};
pub use rest::{RestClient, RestError};
pub use store::{PropertyStore, StoreError};
