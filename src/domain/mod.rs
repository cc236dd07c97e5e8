pub mod events;
pub mod history;
pub mod state;
pub mod types;

pub use events::*;
pub use history::*;
pub use state::*;
pub use types::*;

use thiserror::Error;

/// Errors raised by twin commands.
///
/// Out-of-range control values are clamped rather than rejected, so only
/// names that cannot be resolved end up here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TwinError {
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
    #[error("Unknown operating mode: {0}")]
    UnknownMode(String),
}
