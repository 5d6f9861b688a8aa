//! cf-core: stable foundation for cellflow.
//!
//! Contains:
//! - units (uom SI types for charge, temperature and time + constructors/conversions)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
