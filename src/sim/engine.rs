//! Recoil engine: one weapon instance's recoil
//!
//! Owns the per-weapon state, RNG and hooks, and shares a read-only
//! pattern. The host drives it:
//! `start_sequence` on trigger press, `apply_shot` per round fired,
//! `advance` once per frame with the orientation to perturb.

use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::state::{NoHooks, OrientationTarget, RecoilHooks, RecoilPhase, RecoilState};
use super::tick::{TickInput, TickOutput, tick, uplift_duration, uplift_kinematics};
use super::rotation::Rotation;
use crate::pattern::RecoilPattern;

/// Recoil for one weapon instance
///
/// Kicks come from a shared [`RecoilPattern`]; everything that changes per
/// frame lives in [`RecoilState`]. Hooks see every delta before it reaches
/// the target.
pub struct RecoilEngine<H: RecoilHooks = NoHooks> {
    pattern: Option<Arc<RecoilPattern>>,
    state: RecoilState,
    /// Multiplier on every kick (0 = no recoil)
    strength: f32,
    rng: Pcg32,
    hooks: H,
}

impl RecoilEngine<NoHooks> {
    /// Engine with no pattern and an RNG seeded from the thread RNG
    pub fn new() -> Self {
        Self::with_hooks(NoHooks)
    }

    /// Engine for `pattern` with reproducible random tails
    pub fn with_seed(pattern: Arc<RecoilPattern>, seed: u64) -> Self {
        let mut engine = Self::with_hooks_and_seed(NoHooks, seed);
        engine.set_pattern(pattern);
        engine
    }
}

impl Default for RecoilEngine<NoHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: RecoilHooks> RecoilEngine<H> {
    pub fn with_hooks(hooks: H) -> Self {
        Self::from_parts(hooks, Pcg32::from_rng(&mut rand::rng()))
    }

    pub fn with_hooks_and_seed(hooks: H, seed: u64) -> Self {
        Self::from_parts(hooks, Pcg32::seed_from_u64(seed))
    }

    fn from_parts(hooks: H, rng: Pcg32) -> Self {
        Self {
            pattern: None,
            state: RecoilState::new(),
            strength: 1.0,
            rng,
            hooks,
        }
    }

    // === Configuration ===

    pub fn set_pattern(&mut self, pattern: Arc<RecoilPattern>) {
        self.pattern = Some(pattern);
    }

    pub fn clear_pattern(&mut self) {
        self.pattern = None;
    }

    pub fn pattern(&self) -> Option<&RecoilPattern> {
        self.pattern.as_deref()
    }

    /// Scale all kicks; negative values clamp to 0
    pub fn set_recoil_strength(&mut self, strength: f32) {
        self.strength = strength.max(0.0);
    }

    pub fn recoil_strength(&self) -> f32 {
        self.strength
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    // === State queries ===

    pub fn state(&self) -> &RecoilState {
        &self.state
    }

    pub fn shot_index(&self) -> i32 {
        self.state.shot_index
    }

    pub fn last_fire_time(&self) -> f64 {
        self.state.last_fire_time
    }

    /// Whether `advance` still has work (uplift, pending or running recovery)
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn phase(&self, now: f64) -> RecoilPhase {
        let delay = self.pattern().map(|p| p.recovery_delay).unwrap_or(0.0);
        self.state.phase(now, delay)
    }

    // === Host calls ===

    /// Reset for a new burst
    pub fn start_sequence(&mut self) {
        let Some(pattern) = self.pattern.as_deref() else {
            log::warn!("start_sequence ignored: no recoil pattern assigned");
            return;
        };

        self.state.shot_index = 0;
        self.state.accumulated_input_during_fire = Rotation::ZERO;
        self.state.tracking_input_during_fire = pattern.tracks_input_during_fire();
        self.state.recovery_cancelled = false;
        self.activate();
        log::debug!(
            "Recoil sequence started (tracking aim-away: {})",
            self.state.tracking_input_during_fire
        );
    }

    /// Consume the next pattern shot and start its uplift
    ///
    /// Returns the scaled kick (x = yaw, y = pitch up), zero without a pattern.
    pub fn apply_shot(&mut self, now: f64) -> Vec2 {
        let Some(pattern) = self.pattern.as_deref() else {
            log::warn!("apply_shot ignored: no recoil pattern assigned");
            return Vec2::ZERO;
        };

        let kick = pattern.consume_shot(&mut self.state.shot_index, &mut self.rng) * self.strength;
        let duration = uplift_duration(pattern.uplift_speed);
        let (speed, deceleration) = uplift_kinematics(kick.length(), duration);

        self.state.current_recoil_speed = speed;
        self.state.current_uplift_deceleration = deceleration;
        self.state.recoil_to_apply = Rotation::from_kick(kick);
        self.state.current_recovery_speed = pattern.initial_recovery_speed;
        self.state.last_fire_time = now;
        self.activate();

        log::debug!(
            "Shot {} kick ({:.3}, {:.3}) over {:.3}s",
            self.state.shot_index,
            kick.x,
            kick.y,
            duration
        );
        kick
    }

    /// Mark the engine active; coming out of idle the orientation cache is
    /// stale, so the next tick reseeds it from the target
    fn activate(&mut self) {
        if !self.state.active {
            self.state.cached_controller_rotation = None;
            self.state.last_generated_input = Rotation::ZERO;
            self.state.active = true;
        }
    }

    /// Advance one frame, perturbing `target`
    pub fn advance(&mut self, dt: f32, now: f64, target: &mut dyn OrientationTarget) -> TickOutput {
        let Some(pattern) = self.pattern.as_deref() else {
            return TickOutput::default();
        };
        tick(
            &mut self.state,
            pattern,
            &TickInput::new(dt, now),
            target,
            &mut self.hooks,
        )
    }
}
