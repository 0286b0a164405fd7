//! Database module for PostgreSQL persistence.

mod pool;
mod query;
mod trips;

pub use pool::*;
pub use trips::*;
