//! # Plant Simulation Module
//!
//! Arithmetic model of a green-hydrogen electrolyzer plant.
//!
//! ## Components
//!
//! - **Plant**: derives production, temperature, efficiency, cost and storage
//!   from the control inputs
//! - **Noise**: injectable randomness, seeded or silenced
//! - **Policy**: mode-dependent autonomous drift of the power input
//! - **Scenario**: named operating presets
//!
//! ## Usage
//!
//! ```rust
//! use h2_twin::domain::{ControlInputs, PlantOutputs, DEFAULT_MAX_STORAGE_KG};
//! use h2_twin::simulation::{PlantModel, ZeroNoise};
//!
//! let model = PlantModel::default();
//! let controls = ControlInputs::default();
//! let mut outputs = PlantOutputs::initial(DEFAULT_MAX_STORAGE_KG);
//!
//! model.recompute(&controls, &mut outputs, &mut ZeroNoise);
//! assert!(outputs.h2_production_kg_h > 0.0);
//! ```

pub mod noise;
pub mod plant;
pub mod policy;
pub mod scenario;

pub use noise::{noise_source, NoiseSource, SeededNoise, ZeroNoise};
pub use plant::{PlantModel, PlantParams};
pub use policy::{apply_mode_policy, PolicyAction};
pub use scenario::{find_scenario, Scenario, SCENARIOS};
