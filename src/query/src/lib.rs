pub mod context;
pub mod error;
pub mod funnel;
pub mod timings;

pub use context::LimitContext;
pub use context::QueryContext;
pub use context::QueryModifiers;
pub use context::Team;
pub use error::QueryError;
pub use error::Result;
pub use funnel::FunnelQueryContext;
pub use timings::Timings;
