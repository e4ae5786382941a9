//! Recoil state and the host-facing seams
//!
//! `RecoilState` is everything one weapon instance mutates per frame. It is
//! plain data; the frame logic lives in `tick`.

use serde::{Deserialize, Serialize};

use super::rotation::Rotation;
use crate::consts::{NEARLY_ZERO, RECOVERY_FLUSH_EPSILON};

/// The orientation the engine perturbs (a player controller, a camera rig)
pub trait OrientationTarget {
    /// Current pitch/yaw in degrees
    fn orientation(&self) -> Rotation;

    /// Overwrite pitch/yaw; the engine has already clamped and wrapped it
    fn set_orientation(&mut self, orientation: Rotation);

    /// Apply a delta-space rotation (see [`Rotation::applied_to`])
    fn apply_delta(&mut self, delta: Rotation) {
        let next = self.orientation().applied_to(delta);
        self.set_orientation(next);
    }
}

/// A bare orientation is its own target
impl OrientationTarget for Rotation {
    fn orientation(&self) -> Rotation {
        *self
    }

    fn set_orientation(&mut self, orientation: Rotation) {
        *self = orientation;
    }
}

/// Interception points run before each delta reaches the target
///
/// Hooks may edit the delta in place. Returning `false` drops it for this
/// frame; the engine then leaves its bookkeeping untouched.
pub trait RecoilHooks {
    /// Uplift delta about to be applied
    fn process_delta_recoil(&mut self, _delta: &mut Rotation) -> bool {
        true
    }

    /// Recovery delta about to be applied
    fn process_delta_recovery(&mut self, _delta: &mut Rotation) -> bool {
        true
    }
}

/// Accept every delta unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl RecoilHooks for NoHooks {}

/// Phase derived from the state fields; never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoilPhase {
    /// Nothing left to apply or recover
    Idle,
    /// Kick still being applied
    Uplifting,
    /// Kick done, waiting out the recovery delay
    RecoveryPending,
    /// Returning toward the pre-shot orientation
    Recovering,
}

/// Per-weapon mutable recoil state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoilState {
    /// Next shot to consume from the pattern
    pub shot_index: i32,

    /// Uplift still to apply (delta space)
    pub recoil_to_apply: Rotation,
    pub current_recoil_speed: f32,
    pub current_uplift_deceleration: f32,

    /// Applied uplift still owed back to the player (delta space)
    pub recoil_to_recover: Rotation,
    pub current_recovery_speed: f32,
    pub last_fire_time: f64,

    /// Aim-away detection during the recovery delay
    pub tracking_input_during_fire: bool,
    pub accumulated_input_during_fire: Rotation,
    /// Set once aim-away cancelled recovery; cleared by the next sequence
    pub recovery_cancelled: bool,

    /// Orientation change the engine itself caused last frame
    pub last_generated_input: Rotation,
    /// Target orientation seen last frame; `None` until the next tick seeds it
    pub cached_controller_rotation: Option<Rotation>,

    /// Whether `advance` has work to do (mirrors an enabled tick)
    pub active: bool,
}

impl RecoilState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_uplifting(&self) -> bool {
        !self.recoil_to_apply.is_nearly_zero(NEARLY_ZERO)
    }

    pub fn has_recovery_debt(&self) -> bool {
        !self.recoil_to_recover.is_nearly_zero(RECOVERY_FLUSH_EPSILON)
    }

    pub fn is_idle(&self) -> bool {
        !self.is_uplifting() && !self.has_recovery_debt()
    }

    /// Phase at time `now` given the pattern's recovery delay
    pub fn phase(&self, now: f64, recovery_delay: f32) -> RecoilPhase {
        if self.is_uplifting() {
            RecoilPhase::Uplifting
        } else if !self.has_recovery_debt() || self.recovery_cancelled {
            RecoilPhase::Idle
        } else if now < self.last_fire_time + recovery_delay as f64 {
            RecoilPhase::RecoveryPending
        } else {
            RecoilPhase::Recovering
        }
    }
}
