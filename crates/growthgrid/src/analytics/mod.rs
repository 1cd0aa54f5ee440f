//! Analytics engine wiring: the cache-aside service in front of the store.

mod service;

pub use service::AnalyticsService;
