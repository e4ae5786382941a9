//! Recoil Sim - first-person weapon recoil simulation
//!
//! Core modules:
//! - `pattern`: Authored shot-to-kick lookup (unit graph, end-of-pattern policy)
//! - `sim`: Frame-stepped recoil state machine (uplift, recovery, heat spread)
//! - `settings`: Data-driven weapon tuning and presets
//! - `error`: Failures of the authoring/persistence paths
//!
//! The runtime never fails: a missing pattern, target or curve degrades to
//! "no recoil" and logs, it does not return an error.

pub mod error;
pub mod pattern;
pub mod settings;
pub mod sim;

pub use error::RecoilError;
pub use pattern::{PatternEndBehavior, PatternScale, RecoilPattern, RecoilUnit, UnitGraph};
pub use settings::{Settings, WeaponPreset};
pub use sim::{
    Curve, HeatChange, OrientationTarget, RecoilEngine, RecoilHooks, Rotation,
    SpreadHeatModel, SpreadRecoilEngine,
};

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the demo driver (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Pitch is clamped to this many degrees either side of the horizon
    pub const PITCH_LIMIT: f32 = 89.9;

    /// Default tolerance for "nearly zero" rotations (degrees)
    pub const NEARLY_ZERO: f32 = 1.0e-4;
    /// Recovery debt below this (per axis, degrees) is flushed to zero
    pub const RECOVERY_FLUSH_EPSILON: f32 = 0.001;
    /// Player input below this (per axis, degrees/frame) is treated as noise
    pub const COMPENSATION_INPUT_THRESHOLD: f32 = 0.01;
    /// Speeds below this are treated as stopped
    pub const SPEED_EPSILON: f32 = 1.0e-8;

    /// Uplift duration at `uplift_speed == 0.0` (seconds, floaty)
    pub const MAX_UPLIFT_DURATION: f32 = 0.5;
    /// Uplift duration at `uplift_speed == 1.0` (seconds, snappy)
    pub const MIN_UPLIFT_DURATION: f32 = 0.025;
}

/// Normalize an angle in degrees to (-180, 180]
#[inline]
pub fn normalize_axis(angle: f32) -> f32 {
    let mut angle = angle % 360.0;
    if angle > 180.0 {
        angle -= 360.0;
    } else if angle <= -180.0 {
        angle += 360.0;
    }
    angle
}

/// Clamp an angle in degrees to `[min, max]` after normalizing it
#[inline]
pub fn clamp_angle(angle: f32, min: f32, max: f32) -> f32 {
    normalize_axis(angle).clamp(min, max)
}

/// Sign as -1, 0 or 1 (zero stays zero, unlike `f32::signum`)
#[inline]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Move `current` toward `target` by at most `speed * dt`
#[inline]
pub fn interp_constant_to(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    let dist = target - current;
    if dist * dist < consts::SPEED_EPSILON {
        return target;
    }
    let step = speed * dt;
    current + dist.clamp(-step, step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_axis() {
        assert_eq!(normalize_axis(0.0), 0.0);
        assert_eq!(normalize_axis(180.0), 180.0);
        assert_eq!(normalize_axis(-180.0), 180.0);
        assert!((normalize_axis(190.0) - (-170.0)).abs() < 1e-4);
        assert!((normalize_axis(-190.0) - 170.0).abs() < 1e-4);
        assert!((normalize_axis(720.5) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_clamp_angle() {
        assert_eq!(clamp_angle(95.0, -89.9, 89.9), 89.9);
        assert_eq!(clamp_angle(-95.0, -89.9, 89.9), -89.9);
        // 350 degrees is -10 degrees once normalized
        assert!((clamp_angle(350.0, -89.9, 89.9) - (-10.0)).abs() < 1e-4);
    }

    #[test]
    fn test_interp_constant_to() {
        assert_eq!(interp_constant_to(0.0, 10.0, 0.1, 40.0), 4.0);
        assert_eq!(interp_constant_to(8.0, 10.0, 0.1, 40.0), 10.0);
        assert_eq!(interp_constant_to(10.0, 10.0, 0.1, 40.0), 10.0);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(3.0), 1.0);
        assert_eq!(sign(-3.0), -1.0);
    }
}
