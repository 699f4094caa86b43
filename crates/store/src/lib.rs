//! Basket service and benchmark harness clients.
//!
//! - [`HttpStoreClient`]: the remote basket of one task
//! - [`HttpBenchmark`]: sessions and task lifecycle on the harness
//! - [`InMemoryStore`]: a local basket for tests and offline runs

mod client;
pub mod harness;
pub mod http;
pub mod in_memory;

pub use harness::HttpBenchmark;
pub use http::HttpStoreClient;
pub use in_memory::{CouponRule, Discount, InMemoryStore};
