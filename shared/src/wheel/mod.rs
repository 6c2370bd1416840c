use serde::{Serialize, Deserialize};

use crate::participant::Winner;

pub mod segments;
pub mod draw;
pub mod machine;

pub use segments::{build, WheelLayout};
pub use draw::{draw, DrawOutcome};
pub use machine::{WheelMachine, Phase, SpinPlan, Tick};

/// Total spin animation length in milliseconds.
pub const SPIN_DURATION_MS: f64 = 5000.0;
/// Pause between the wheel stopping and the winner being announced.
pub const SETTLE_DELAY_MS: f64 = 300.0;
/// Extra full rotations added for drama, drawn uniformly from this range.
pub const MIN_SPINS: u32 = 8;
pub const MAX_SPINS: u32 = 15;
/// The pointer sits at the top of the wheel; segment 0 starts there.
pub const POINTER_OFFSET_DEG: f64 = -90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelError {
    /// Empty participant list or all-zero ticket counts. Cannot spin.
    NoSegments,
    /// A spin is already in flight; the request is refused, not queued.
    SpinInProgress,
}

impl std::fmt::Display for WheelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSegments => write!(f, "no segments to spin"),
            Self::SpinInProgress => write!(f, "a spin is already in progress"),
        }
    }
}

impl std::error::Error for WheelError {}

// === API Types ===

/// Read-only view of a wheel instance, served while clients render or
/// poll an animation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WheelSnapshot {
    pub rotation: f64,
    pub phase: String,
    pub segment_labels: Vec<String>,
    pub winner: Option<Winner>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpinResponse {
    pub accepted: bool,
    pub duration_ms: Option<f64>,
    pub message: Option<String>,
}
