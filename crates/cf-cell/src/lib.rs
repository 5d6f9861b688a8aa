//! cf-cell: lithium-ion cell physics for charge simulation.
//!
//! Provides the pieces the derivative function is assembled from:
//! - Open-circuit voltage curve (piecewise linear in SOC)
//! - Charge policies mapping (time, state) to a commanded source voltage
//! - Thermal balance (Joule heating + Newtonian cooling)
//! - SEI growth (Arrhenius rate times a stress multiplier)
//! - RC polarization branch
//! - Internal resistance models
//!
//! Every function here is a pure, deterministic map of its inputs. Integration
//! and time stepping live in `cf-sim`.

pub mod error;
pub mod ocv;
pub mod params;
pub mod policy;
pub mod rc;
pub mod resistance;
pub mod sei;
pub mod thermal;

// Re-exports
pub use error::{CellError, CellResult};
pub use ocv::{LFP_OCV_TABLE, OcvCurve};
pub use params::{CellParams, InitialConditions};
pub use policy::{ChargePolicy, PolicyId, PolicyInput, PolicySettings};
pub use rc::RcBranch;
pub use resistance::ResistanceModel;
pub use sei::{FullStress, SeiModel, SeiParams};
pub use thermal::{ThermalInput, ThermalParams};
