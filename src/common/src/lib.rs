pub mod config;
pub mod defaults;
pub mod error;
pub mod query;

pub use query::funnel;
