//! Per-frame recoil state machine
//!
//! One call to [`tick`] advances a weapon's recoil by `dt`:
//! 1. isolate player input from last frame's self-generated motion
//! 2. integrate the uplift kick
//! 3. shrink recovery debt by player compensation
//! 4. track aim movement during the recovery delay
//! 5. recover (or cancel recovery if the player aimed away)
//! 6. remember what this frame generated

use super::rotation::Rotation;
use super::state::{OrientationTarget, RecoilHooks, RecoilState};
use crate::consts::*;
use crate::pattern::RecoilPattern;
use crate::{interp_constant_to, sign};

/// Timing for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Frame duration in seconds
    pub dt: f32,
    /// Monotonic clock in seconds
    pub now: f64,
}

impl TickInput {
    pub fn new(dt: f32, now: f64) -> Self {
        Self { dt, now }
    }
}

/// What a tick did to the target
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutput {
    /// Uplift delta applied this frame (delta space)
    pub recoil_delta: Rotation,
    /// Recovery delta applied this frame (delta space)
    pub recovery_delta: Rotation,
    /// Player input isolated this frame (orientation space)
    pub player_input: Rotation,
    /// Recovery was cancelled this frame
    pub cancelled: bool,
}

/// Kick duration for `uplift_speed` in [0, 1]
///
/// Interpolates in rate space (1/T) so sharpness feels linear: 0.0 gives
/// 0.5 s, 1.0 gives 25 ms.
pub fn uplift_duration(uplift_speed: f32) -> f32 {
    let s = if uplift_speed.is_finite() {
        uplift_speed.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let min_rate = 1.0 / MAX_UPLIFT_DURATION;
    let max_rate = 1.0 / MIN_UPLIFT_DURATION;
    1.0 / (min_rate + (max_rate - min_rate) * s)
}

/// Initial speed and constant deceleration covering `distance` in `duration`
///
/// `v0 = 2d/T`, `a = 2d/T^2`: velocity reaches zero exactly at the target.
pub fn uplift_kinematics(distance: f32, duration: f32) -> (f32, f32) {
    let duration = duration.max(MIN_UPLIFT_DURATION);
    let speed = 2.0 * distance / duration;
    let deceleration = 2.0 * distance / (duration * duration);
    (speed, deceleration)
}

/// Reduce recovery debt on axes where the player already moves the same way
///
/// Never crosses zero: a correction that would flip the sign lands on 0.
pub fn compensate_recovery(recover: &mut Rotation, input: Rotation) {
    compensate_axis(&mut recover.pitch, input.pitch);
    compensate_axis(&mut recover.yaw, input.yaw);
}

fn compensate_axis(recover: &mut f32, input: f32) {
    if input.abs() > COMPENSATION_INPUT_THRESHOLD && sign(input) == sign(*recover) {
        let reduced = *recover - input;
        *recover = if sign(reduced) == sign(*recover) { reduced } else { 0.0 };
    }
}

/// Advance one weapon's recoil by one frame
pub fn tick(
    state: &mut RecoilState,
    pattern: &RecoilPattern,
    input: &TickInput,
    target: &mut dyn OrientationTarget,
    hooks: &mut dyn RecoilHooks,
) -> TickOutput {
    let dt = input.dt;
    let now = input.now;
    let current = target.orientation();

    if !state.active {
        // Stay in sync so reactivation does not see stale motion as input
        state.cached_controller_rotation = Some(current);
        state.last_generated_input = Rotation::ZERO;
        return TickOutput::default();
    }

    // --- PLAYER INPUT ---
    // A stale cache (fresh or just reactivated) reads as no input
    let cached = state.cached_controller_rotation.unwrap_or(current);
    let rotation_delta = (current - cached).normalized();
    let player_input = (rotation_delta - state.last_generated_input).normalized();
    state.cached_controller_rotation = Some(current);

    let mut output = TickOutput {
        player_input,
        ..Default::default()
    };

    // --- UPLIFT ---
    if state.is_uplifting() {
        state.current_recoil_speed =
            (state.current_recoil_speed - state.current_uplift_deceleration * dt).max(0.0);

        let delta_move = state.current_recoil_speed * dt;
        let remaining = state.recoil_to_apply.length();

        let mut delta = if delta_move >= remaining || state.current_recoil_speed <= SPEED_EPSILON {
            state.recoil_to_apply
        } else {
            state.recoil_to_apply * (delta_move / remaining)
        };

        if hooks.process_delta_recoil(&mut delta) {
            target.apply_delta(delta);
            state.recoil_to_apply -= delta;
            if !state.recovery_cancelled {
                state.recoil_to_recover += delta;
            }
            output.recoil_delta = delta;
        }
    }

    // --- COMPENSATION ---
    if state.has_recovery_debt() {
        compensate_recovery(&mut state.recoil_to_recover, player_input);
    }

    let uplift_done = !state.is_uplifting();
    let recovery_start = state.last_fire_time + pattern.recovery_delay as f64;

    // --- AIM-AWAY TRACKING ---
    if state.tracking_input_during_fire && uplift_done && now <= recovery_start {
        state.accumulated_input_during_fire += player_input;
    }

    // --- RECOVERY ---
    if uplift_done && !state.recovery_cancelled && state.has_recovery_debt() && now >= recovery_start {
        if state.tracking_input_during_fire && pattern.recovery_cancel_threshold > 0.0 {
            state.tracking_input_during_fire = false;

            let accumulated = state.accumulated_input_during_fire;
            let threshold = pattern.recovery_cancel_threshold;
            if accumulated.pitch.abs() > threshold || accumulated.yaw.abs() > threshold {
                log::debug!(
                    "Recovery cancelled: aim moved ({:.2}, {:.2}) during delay",
                    accumulated.pitch,
                    accumulated.yaw
                );
                state.recoil_to_recover = Rotation::ZERO;
                state.recovery_cancelled = true;
                state.active = false;
                state.last_generated_input = output.recoil_delta.as_orientation_change();
                output.cancelled = true;
                return output;
            }
        }

        state.current_recovery_speed = interp_constant_to(
            state.current_recovery_speed,
            pattern.max_recovery_speed,
            dt,
            pattern.recovery_acceleration,
        );

        let step = Rotation::ZERO.interp_to(state.recoil_to_recover, dt, state.current_recovery_speed);
        let mut delta = -step;

        if hooks.process_delta_recovery(&mut delta) {
            target.apply_delta(delta);
            state.recoil_to_recover += delta;
            output.recovery_delta = delta;
        }

        // Flush the tail so recovery terminates
        if !state.has_recovery_debt() {
            state.recoil_to_recover = Rotation::ZERO;
            log::debug!("Recovery complete");
        }
    }

    if state.is_idle() {
        state.active = false;
    }

    // Pitch is inverted on application, so record it negated to cancel
    // against next frame's observed rotation change
    state.last_generated_input = (output.recoil_delta + output.recovery_delta).as_orientation_change();

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternScale;
    use crate::sim::state::NoHooks;
    use glam::Vec2;

    fn pattern() -> RecoilPattern {
        RecoilPattern::from_positions([Vec2::new(0.0, 2.0)], PatternScale::Degree)
    }

    /// Start a 2 degree vertical kick at t = 0
    fn kicked_state(pattern: &RecoilPattern) -> RecoilState {
        let duration = uplift_duration(pattern.uplift_speed);
        let (speed, decel) = uplift_kinematics(2.0, duration);
        RecoilState {
            recoil_to_apply: Rotation::from_kick(Vec2::new(0.0, 2.0)),
            current_recoil_speed: speed,
            current_uplift_deceleration: decel,
            current_recovery_speed: pattern.initial_recovery_speed,
            active: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_uplift_duration_bounds() {
        assert!((uplift_duration(0.0) - 0.5).abs() < 1e-6);
        assert!((uplift_duration(1.0) - 0.025).abs() < 1e-6);
        assert!((uplift_duration(-3.0) - 0.5).abs() < 1e-6);
        assert!((uplift_duration(f32::NAN) - 0.5).abs() < 1e-6);
        assert!(uplift_duration(0.75) < uplift_duration(0.25));
    }

    #[test]
    fn test_uplift_kinematics_zero_distance() {
        assert_eq!(uplift_kinematics(0.0, 0.1), (0.0, 0.0));
        let (v, a) = uplift_kinematics(1.0, 0.0);
        assert!(v.is_finite() && a.is_finite());
    }

    #[test]
    fn test_compensation_clamps_at_zero() {
        let mut recover = Rotation::new(-1.0, 0.5);
        compensate_recovery(&mut recover, Rotation::new(-0.4, 0.2));
        assert!((recover.pitch - (-0.6)).abs() < 1e-6);
        assert!((recover.yaw - 0.3).abs() < 1e-6);

        compensate_recovery(&mut recover, Rotation::new(-5.0, 5.0));
        assert_eq!(recover, Rotation::ZERO);
    }

    #[test]
    fn test_compensation_ignores_noise_and_opposing_input() {
        let mut recover = Rotation::new(-1.0, 0.5);
        compensate_recovery(&mut recover, Rotation::new(-0.005, -0.3));
        assert_eq!(recover, Rotation::new(-1.0, 0.5));
    }

    #[test]
    fn test_uplift_moves_target_and_accrues_debt() {
        let pattern = pattern();
        let mut state = kicked_state(&pattern);
        let mut target = Rotation::ZERO;

        let out = tick(&mut state, &pattern, &TickInput::new(SIM_DT, 0.0), &mut target, &mut NoHooks);
        assert!(out.recoil_delta.pitch < 0.0);
        assert!(target.pitch > 0.0);
        assert_eq!(state.recoil_to_recover, out.recoil_delta);
        assert!(state.is_uplifting());
    }

    #[test]
    fn test_self_motion_is_not_player_input() {
        let pattern = pattern();
        let mut state = kicked_state(&pattern);
        let mut target = Rotation::ZERO;

        let mut now = 0.0;
        for _ in 0..240 {
            let out = tick(&mut state, &pattern, &TickInput::new(SIM_DT, now), &mut target, &mut NoHooks);
            assert!(out.player_input.is_nearly_zero(1e-4), "phantom input {:?}", out.player_input);
            now += SIM_DT as f64;
        }
    }

    #[test]
    fn test_recovery_waits_for_delay() {
        let mut pattern = pattern();
        pattern.recovery_delay = 0.5;
        let mut state = kicked_state(&pattern);
        let mut target = Rotation::ZERO;

        let mut now = 0.0;
        while now < 0.45 {
            let out = tick(&mut state, &pattern, &TickInput::new(SIM_DT, now), &mut target, &mut NoHooks);
            assert_eq!(out.recovery_delta, Rotation::ZERO);
            now += SIM_DT as f64;
        }
        assert!(!state.is_uplifting());
        assert!((target.pitch - 2.0).abs() < 1e-3);

        let out = tick(&mut state, &pattern, &TickInput::new(SIM_DT, 0.6), &mut target, &mut NoHooks);
        assert!(out.recovery_delta.pitch > 0.0);
        assert!(target.pitch < 2.0);
    }

    #[test]
    fn test_recovery_speed_ramps_to_max() {
        let mut pattern = pattern();
        pattern.recovery_delay = 0.0;
        pattern.initial_recovery_speed = 1.0;
        pattern.max_recovery_speed = 3.0;
        pattern.recovery_acceleration = 10.0;
        let mut state = kicked_state(&pattern);
        state.recoil_to_apply = Rotation::ZERO;
        state.recoil_to_recover = Rotation::new(-10.0, 0.0);
        let mut target = Rotation::new(10.0, 0.0);

        tick(&mut state, &pattern, &TickInput::new(0.1, 1.0), &mut target, &mut NoHooks);
        assert!((state.current_recovery_speed - 2.0).abs() < 1e-5);
        tick(&mut state, &pattern, &TickInput::new(0.1, 1.1), &mut target, &mut NoHooks);
        assert!((state.current_recovery_speed - 3.0).abs() < 1e-5);
        tick(&mut state, &pattern, &TickInput::new(0.1, 1.2), &mut target, &mut NoHooks);
        assert!((state.current_recovery_speed - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_stale_cache_reads_as_no_input() {
        let pattern = pattern();
        let mut state = kicked_state(&pattern);
        assert_eq!(state.cached_controller_rotation, None);
        let mut target = Rotation::new(-20.0, 50.0);

        let out = tick(&mut state, &pattern, &TickInput::new(SIM_DT, 0.0), &mut target, &mut NoHooks);
        assert_eq!(out.player_input, Rotation::ZERO);
        // Debt is exactly what the uplift applied
        assert_eq!(state.recoil_to_recover, out.recoil_delta);
    }

    #[test]
    fn test_inactive_tick_only_resyncs() {
        let pattern = pattern();
        let mut state = RecoilState::new();
        let mut target = Rotation::new(12.0, 30.0);
        let out = tick(&mut state, &pattern, &TickInput::new(SIM_DT, 0.0), &mut target, &mut NoHooks);
        assert_eq!(out, TickOutput::default());
        assert_eq!(state.cached_controller_rotation, Some(target));
        assert_eq!(target, Rotation::new(12.0, 30.0));
    }

    struct RejectRecovery;

    impl RecoilHooks for RejectRecovery {
        fn process_delta_recovery(&mut self, _delta: &mut Rotation) -> bool {
            false
        }
    }

    #[test]
    fn test_rejected_recovery_keeps_debt() {
        let mut pattern = pattern();
        pattern.recovery_delay = 0.0;
        let mut state = kicked_state(&pattern);
        let mut target = Rotation::ZERO;
        let mut hooks = RejectRecovery;

        let mut now = 0.0;
        for _ in 0..240 {
            let out = tick(&mut state, &pattern, &TickInput::new(SIM_DT, now), &mut target, &mut hooks);
            assert_eq!(out.recovery_delta, Rotation::ZERO);
            now += SIM_DT as f64;
        }
        assert!((state.recoil_to_recover.pitch - (-2.0)).abs() < 1e-3);
        assert!((target.pitch - 2.0).abs() < 1e-3);
    }
}
