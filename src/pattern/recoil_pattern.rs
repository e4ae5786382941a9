//! Recoil pattern asset: shot-to-kick lookup plus recovery tuning
//!
//! A pattern is read-only while simulating. Many engines may share one
//! behind an `Arc`; the only per-engine input to [`RecoilPattern::consume_shot`]
//! is the shot index and the engine's own RNG.

use std::path::Path;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::graph::UnitGraph;
use crate::error::Result;

/// What happens once the shot index reaches the last unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatternEndBehavior {
    /// Keep applying the last unit's delta (endless climb)
    #[default]
    RepeatLast,
    /// No further kick
    Stop,
    /// Loop back to `custom_restart_index`
    RestartFromCustomIndex,
    /// Kick by a random vector inside `random_range_x` x `random_range_y`
    Random,
}

/// Conversion from graph units to degrees of camera rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatternScale {
    /// Graph authored at 2x scale for finer control
    #[default]
    HalfDegree,
    /// Graph units are degrees
    Degree,
}

impl PatternScale {
    /// Multiplier from graph space to degrees
    pub fn factor(&self) -> f32 {
        match self {
            PatternScale::HalfDegree => 0.5,
            PatternScale::Degree => 1.0,
        }
    }
}

/// Inclusive sampling range; `min > max` is tolerated by swapping
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RandomRange {
    pub min: f32,
    pub max: f32,
}

impl RandomRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        if lo == hi || !lo.is_finite() || !hi.is_finite() {
            return lo;
        }
        rng.random_range(lo..=hi)
    }
}

/// A complete recoil pattern with its kinematics tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoilPattern {
    pub graph: UnitGraph,

    /// How fast the kick reaches its peak (0 = floaty, 1 = instant snap)
    pub uplift_speed: f32,

    /// Seconds after the last shot before recovery starts
    pub recovery_delay: f32,
    /// Recovery speed at the start of the return movement
    pub initial_recovery_speed: f32,
    /// Cap on recovery speed
    pub max_recovery_speed: f32,
    /// Recovery speed ramp (deg/s^2) from initial to max
    pub recovery_acceleration: f32,
    /// Accumulated aim movement (degrees, per axis) during the recovery
    /// delay that cancels recovery for the sequence; 0 disables
    pub recovery_cancel_threshold: f32,
    /// Whether aim-away cancellation is in effect at all
    pub cancellation_enabled: bool,

    pub end_behavior: PatternEndBehavior,
    /// Shot index to loop back to for `RestartFromCustomIndex`
    pub custom_restart_index: i32,
    pub random_range_x: RandomRange,
    pub random_range_y: RandomRange,

    pub scale: PatternScale,
}

impl Default for RecoilPattern {
    fn default() -> Self {
        Self {
            graph: UnitGraph::new(),
            uplift_speed: 0.7,
            recovery_delay: 0.1,
            initial_recovery_speed: 2.0,
            max_recovery_speed: 10.0,
            recovery_acceleration: 40.0,
            recovery_cancel_threshold: 0.0,
            cancellation_enabled: true,
            end_behavior: PatternEndBehavior::RepeatLast,
            custom_restart_index: 0,
            random_range_x: RandomRange::default(),
            random_range_y: RandomRange::default(),
            scale: PatternScale::HalfDegree,
        }
    }
}

impl RecoilPattern {
    pub fn new(graph: UnitGraph) -> Self {
        Self {
            graph,
            ..Default::default()
        }
    }

    /// Pattern from graph positions, in the given scale
    pub fn from_positions(positions: impl IntoIterator<Item = Vec2>, scale: PatternScale) -> Self {
        Self {
            graph: UnitGraph::from_positions(positions),
            scale,
            ..Default::default()
        }
    }

    pub fn unit_count(&self) -> usize {
        self.graph.unit_count()
    }

    /// Index of the last unit, or -1 for an empty graph
    pub fn max_shot_index(&self) -> i32 {
        self.graph.unit_count() as i32 - 1
    }

    /// Whether recovery cancellation can trigger for this pattern
    pub fn tracks_input_during_fire(&self) -> bool {
        self.cancellation_enabled && self.recovery_delay > 0.0 && self.recovery_cancel_threshold > 0.0
    }

    /// Kick (degrees; x = yaw, y = pitch up) from shot `shot_index - 1` to `shot_index`
    ///
    /// Advances `shot_index` on the normal path. Past the last unit the
    /// result follows `end_behavior`.
    pub fn consume_shot<R: Rng + ?Sized>(&self, shot_index: &mut i32, rng: &mut R) -> Vec2 {
        if self.graph.is_empty() {
            return Vec2::ZERO;
        }

        let max_index = self.max_shot_index();
        if *shot_index >= max_index {
            match self.end_behavior {
                PatternEndBehavior::Stop => return Vec2::ZERO,
                PatternEndBehavior::RepeatLast => {
                    *shot_index = max_index;
                    return self.delta_at(max_index);
                }
                PatternEndBehavior::RestartFromCustomIndex => {
                    *shot_index = self.custom_restart_index.clamp(0, max_index);
                }
                PatternEndBehavior::Random => {
                    let kick = Vec2::new(
                        self.random_range_x.sample(rng),
                        self.random_range_y.sample(rng),
                    );
                    return kick * self.scale.factor();
                }
            }
        }

        // Negative indices are treated as the first shot
        let index = (*shot_index).max(0);
        *shot_index = index + 1;
        self.delta_at(index)
    }

    /// Scaled difference between unit `index` and its predecessor
    fn delta_at(&self, index: i32) -> Vec2 {
        let index = index.max(0) as usize;
        let current = self.graph.position_at(index).unwrap_or(Vec2::ZERO);
        let previous = if index > 0 {
            self.graph.position_at(index - 1).unwrap_or(Vec2::ZERO)
        } else {
            Vec2::ZERO
        };
        (current - previous) * self.scale.factor()
    }

    // === Persistence ===

    /// Parse a pattern asset, repairing any duplicate unit ids
    ///
    /// Ids with no room left above them are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut pattern: Self = serde_json::from_str(json)?;
        pattern.graph.repair_duplicate_ids()?;
        Ok(pattern)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let pattern = Self::from_json(&json)?;
        log::info!(
            "Loaded recoil pattern from {} ({} units)",
            path.display(),
            pattern.unit_count()
        );
        Ok(pattern)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn two_unit_pattern(end_behavior: PatternEndBehavior) -> RecoilPattern {
        let mut pattern =
            RecoilPattern::from_positions([Vec2::new(0.0, 1.0), Vec2::new(0.0, 2.0)], PatternScale::Degree);
        pattern.end_behavior = end_behavior;
        pattern
    }

    #[test]
    fn test_empty_pattern_returns_zero() {
        let pattern = RecoilPattern::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut index = 0;
        assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::ZERO);
        assert_eq!(index, 0);
    }

    #[test]
    fn test_repeat_last_pins_index() {
        let pattern = two_unit_pattern(PatternEndBehavior::RepeatLast);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut index = 0;

        assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::new(0.0, 1.0));
        assert_eq!(index, 1);

        for _ in 0..5 {
            assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::new(0.0, 1.0));
            assert_eq!(index, 1);
        }

        // Index already past the end is pulled back to the last unit
        let mut index = 7;
        assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::new(0.0, 1.0));
        assert_eq!(index, 1);
    }

    #[test]
    fn test_single_unit_repeat_last_uses_position() {
        let mut pattern = RecoilPattern::from_positions([Vec2::new(1.0, 3.0)], PatternScale::Degree);
        pattern.end_behavior = PatternEndBehavior::RepeatLast;
        let mut rng = Pcg32::seed_from_u64(1);
        let mut index = 0;
        assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::new(1.0, 3.0));
        assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::new(1.0, 3.0));
        assert_eq!(index, 0);
    }

    #[test]
    fn test_stop_returns_zero_past_end() {
        let pattern = two_unit_pattern(PatternEndBehavior::Stop);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut index = 0;
        assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::new(0.0, 1.0));
        for _ in 0..3 {
            assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::ZERO);
            assert_eq!(index, 1);
        }
    }

    #[test]
    fn test_restart_from_custom_index() {
        let mut pattern = RecoilPattern::from_positions(
            [
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 3.0),
                Vec2::new(0.0, 6.0),
                Vec2::new(-1.0, 10.0),
            ],
            PatternScale::Degree,
        );
        pattern.end_behavior = PatternEndBehavior::RestartFromCustomIndex;
        pattern.custom_restart_index = 1;
        let mut rng = Pcg32::seed_from_u64(1);

        let mut index = 0;
        assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::new(0.0, 1.0));
        assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::new(1.0, 2.0));
        assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::new(-1.0, 3.0));
        assert_eq!(index, 3);

        // At the last unit: restart at 1 and consume it
        assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::new(1.0, 2.0));
        assert_eq!(index, 2);

        // Out-of-range restart index is clamped to the last unit
        pattern.custom_restart_index = 99;
        let mut index = 3;
        assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::new(-1.0, 4.0));
        assert_eq!(index, 4);
    }

    #[test]
    fn test_random_tail_stays_in_range() {
        let mut pattern = two_unit_pattern(PatternEndBehavior::Random);
        pattern.random_range_x = RandomRange::new(-2.0, 2.0);
        pattern.random_range_y = RandomRange::new(3.0, 1.0); // swapped on purpose
        let mut rng = Pcg32::seed_from_u64(42);

        let mut index = 1;
        for _ in 0..100 {
            let kick = pattern.consume_shot(&mut index, &mut rng);
            assert!((-2.0..=2.0).contains(&kick.x));
            assert!((1.0..=3.0).contains(&kick.y));
            assert_eq!(index, 1);
        }
    }

    #[test]
    fn test_random_tail_is_seeded() {
        let mut pattern = two_unit_pattern(PatternEndBehavior::Random);
        pattern.random_range_x = RandomRange::new(-2.0, 2.0);
        pattern.random_range_y = RandomRange::new(0.0, 4.0);

        let mut a = Pcg32::seed_from_u64(7);
        let mut b = Pcg32::seed_from_u64(7);
        let (mut ia, mut ib) = (1, 1);
        for _ in 0..10 {
            assert_eq!(
                pattern.consume_shot(&mut ia, &mut a),
                pattern.consume_shot(&mut ib, &mut b)
            );
        }
    }

    #[test]
    fn test_half_degree_scale() {
        let mut pattern = two_unit_pattern(PatternEndBehavior::RepeatLast);
        pattern.scale = PatternScale::HalfDegree;
        let mut rng = Pcg32::seed_from_u64(1);
        let mut index = 0;
        assert_eq!(pattern.consume_shot(&mut index, &mut rng), Vec2::new(0.0, 0.5));
    }

    #[test]
    fn test_json_rejects_exhausted_ids() {
        let json = r#"{ "graph": { "units": [
            { "id": 4294967295, "position": [0.0, 1.0] }
        ] } }"#;
        assert!(matches!(
            RecoilPattern::from_json(json),
            Err(crate::error::RecoilError::IdOverflow(u32::MAX))
        ));
    }

    #[test]
    fn test_json_roundtrip_repairs_ids() {
        let json = r#"{
            "graph": { "units": [
                { "id": 0, "position": [0.0, 1.0] },
                { "id": 0, "position": [0.0, 2.0] }
            ] },
            "end_behavior": "Stop",
            "scale": "Degree"
        }"#;
        let pattern = RecoilPattern::from_json(json).unwrap();
        assert_eq!(pattern.unit_count(), 2);
        assert_eq!(pattern.end_behavior, PatternEndBehavior::Stop);
        assert_ne!(pattern.graph.units()[0].id, pattern.graph.units()[1].id);
        assert!(pattern.graph.next_id() >= 2);
        // Unspecified fields fall back to defaults
        assert_eq!(pattern.max_recovery_speed, 10.0);

        let back = RecoilPattern::from_json(&pattern.to_json().unwrap()).unwrap();
        assert_eq!(back, pattern);
    }
}
