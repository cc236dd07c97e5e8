//! Mode-dependent drift of the control inputs.
//!
//! Applied once per tick, after the clock advanced and before the plant
//! model recomputes. Writes go through the control range so an input never
//! leaves the range an operator could set.

use super::noise::NoiseSource;
use crate::domain::{ControlInputs, ControlLimits, Mode};

/// Seconds between the discrete events of the optimized and carbon modes
pub const MODE_EVENT_PERIOD_S: u64 = 60;
/// Half-width of the per-second power jitter in variable mode (MW)
pub const VARIABLE_JITTER_MW: f64 = 10.0;
pub const OPTIMIZED_SHED_PROBABILITY: f64 = 0.3;
pub const OPTIMIZED_SHED_FACTOR: f64 = 0.8;
pub const CARBON_RAMP_PROBABILITY: f64 = 0.5;
pub const CARBON_RAMP_FACTOR: f64 = 1.1;
/// Power input ceiling during a carbon ramp-up (MW)
pub const CARBON_RAMP_CEILING_MW: f64 = 200.0;

/// What the policy did on a tick, with the power input it left behind (MW)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolicyAction {
    Jitter(f64),
    LoadShed(f64),
    RampUp(f64),
}

/// Apply the drift of `controls.mode` for simulated second `time`.
pub fn apply_mode_policy(
    controls: &mut ControlInputs,
    time: u64,
    limits: &ControlLimits,
    noise: &mut dyn NoiseSource,
) -> Option<PolicyAction> {
    let on_event_boundary = time % MODE_EVENT_PERIOD_S == 0;
    let power = controls.power_input;

    let (action, requested): (fn(f64) -> PolicyAction, f64) = match controls.mode {
        Mode::Steady => return None,
        Mode::Variable => {
            let jitter = noise.uniform(-VARIABLE_JITTER_MW, VARIABLE_JITTER_MW);
            (PolicyAction::Jitter, power + jitter)
        }
        Mode::Optimized => {
            if !on_event_boundary || !noise.chance(OPTIMIZED_SHED_PROBABILITY) {
                return None;
            }
            (PolicyAction::LoadShed, power * OPTIMIZED_SHED_FACTOR)
        }
        Mode::Carbon => {
            if !on_event_boundary || !noise.chance(CARBON_RAMP_PROBABILITY) {
                return None;
            }
            (
                PolicyAction::RampUp,
                (power * CARBON_RAMP_FACTOR).min(CARBON_RAMP_CEILING_MW),
            )
        }
    };

    let applied = limits.power_input.clamp(requested).unwrap_or(power);
    controls.power_input = applied;
    Some(action(applied))
}
