//! Crate includes reusable utils shared by the sweeper crates and the services embedding them,
//! such as initializing the tracing framework.

pub mod logging;

// Re-export tracing crate for convenience.
pub use tracing;
