//! Transient charge simulation for a single cell.
//!
//! Provides:
//! - `TransientModel` trait for pluggable dynamic systems
//! - Fixed-step RK4 and forward Euler integrators
//! - The cell derivative model (integrated vs derived state split)
//! - The charge driver with sampling and termination rules

pub mod cell_model;
pub mod error;
pub mod integrator;
pub mod model;
pub mod sim;
pub mod trajectory;

// Re-exports for public API
pub use cell_model::{CellModel, DerivedState, Evaluation, IntegratedState};
pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, RK4};
pub use model::TransientModel;
pub use sim::{
    ChargeRun, IntegratorType, SimOptions, SimProgress, run_charge, run_charge_with_progress,
};
pub use trajectory::{SimStatus, Trajectory};
