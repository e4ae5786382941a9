//! Pitch/yaw rotation in degrees
//!
//! Two spaces use this type:
//! - orientation space: the host's camera angles (pitch up is positive)
//! - delta space: recoil deltas handed to [`Rotation::applied_to`], where
//!   pitch is inverted (`pitch -= delta.pitch`) and yaw is additive

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{NEARLY_ZERO, PITCH_LIMIT};
use crate::{clamp_angle, normalize_axis};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
}

impl Rotation {
    pub const ZERO: Self = Self { pitch: 0.0, yaw: 0.0 };

    pub const fn new(pitch: f32, yaw: f32) -> Self {
        Self { pitch, yaw }
    }

    /// Delta-space rotation for a pattern kick (x = yaw right, y = up)
    #[inline]
    pub fn from_kick(kick: Vec2) -> Self {
        Self::new(-kick.y, kick.x)
    }

    /// True when both axes are within `tolerance` degrees of zero
    #[inline]
    pub fn is_nearly_zero(&self, tolerance: f32) -> bool {
        normalize_axis(self.pitch).abs() <= tolerance && normalize_axis(self.yaw).abs() <= tolerance
    }

    /// Both axes wrapped to (-180, 180]
    #[inline]
    pub fn normalized(&self) -> Self {
        Self::new(normalize_axis(self.pitch), normalize_axis(self.yaw))
    }

    /// Angular magnitude treating (pitch, yaw) as a plane vector
    #[inline]
    pub fn length(&self) -> f32 {
        (self.pitch * self.pitch + self.yaw * self.yaw).sqrt()
    }

    /// Apply a delta-space rotation to this orientation
    ///
    /// Pitch is inverted then clamped to the pitch limit, yaw is added and
    /// wrapped to (-180, 180].
    #[inline]
    pub fn applied_to(&self, delta: Rotation) -> Self {
        let pitch = clamp_angle(self.pitch - delta.pitch, -PITCH_LIMIT, PITCH_LIMIT);
        let yaw = normalize_axis(self.yaw + delta.yaw);
        Self::new(pitch, yaw)
    }

    /// Orientation-space change produced by applying `delta`
    ///
    /// Ignores clamping; this is the value the engine expects to observe
    /// from its own output on the next frame.
    #[inline]
    pub fn as_orientation_change(&self) -> Self {
        Self::new(-self.pitch, self.yaw)
    }

    /// Move from `self` toward `target` by the fraction `clamp(dt * speed, 0, 1)`
    /// of the remaining distance
    ///
    /// Repeated calls decay the distance exponentially rather than linearly.
    pub fn interp_to(&self, target: Rotation, dt: f32, speed: f32) -> Self {
        if dt == 0.0 || *self == target {
            return *self;
        }
        if speed <= 0.0 {
            return target;
        }
        let delta = (target - *self).normalized();
        if delta.is_nearly_zero(NEARLY_ZERO) {
            return target;
        }
        let alpha = (dt * speed).clamp(0.0, 1.0);
        (*self + delta * alpha).normalized()
    }
}

impl Add for Rotation {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.pitch + rhs.pitch, self.yaw + rhs.yaw)
    }
}

impl AddAssign for Rotation {
    fn add_assign(&mut self, rhs: Self) {
        self.pitch += rhs.pitch;
        self.yaw += rhs.yaw;
    }
}

impl Sub for Rotation {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.pitch - rhs.pitch, self.yaw - rhs.yaw)
    }
}

impl SubAssign for Rotation {
    fn sub_assign(&mut self, rhs: Self) {
        self.pitch -= rhs.pitch;
        self.yaw -= rhs.yaw;
    }
}

impl Neg for Rotation {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.pitch, -self.yaw)
    }
}

impl Mul<f32> for Rotation {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.pitch * rhs, self.yaw * rhs)
    }
}
