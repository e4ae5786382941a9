//! Weapon recoil settings and presets
//!
//! Persisted as JSON next to the pattern assets. Missing fields fall back
//! to the defaults, so hand-edited files only need what they change.

use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pattern::{PatternEndBehavior, PatternScale, RandomRange, RecoilPattern};
use crate::sim::{Curve, RecoilEngine, SpreadHeatModel, SpreadRecoilEngine};

/// Ready-made weapon archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WeaponPreset {
    #[default]
    Rifle,
    Smg,
    Lmg,
    Pistol,
}

impl WeaponPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponPreset::Rifle => "Rifle",
            WeaponPreset::Smg => "Smg",
            WeaponPreset::Lmg => "Lmg",
            WeaponPreset::Pistol => "Pistol",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rifle" | "ar" => Some(WeaponPreset::Rifle),
            "smg" => Some(WeaponPreset::Smg),
            "lmg" => Some(WeaponPreset::Lmg),
            "pistol" => Some(WeaponPreset::Pistol),
            _ => None,
        }
    }

    /// Rounds per minute on full auto
    pub fn fire_rate_rpm(&self) -> f32 {
        match self {
            WeaponPreset::Rifle => 600.0,
            WeaponPreset::Smg => 900.0,
            WeaponPreset::Lmg => 750.0,
            WeaponPreset::Pistol => 300.0,
        }
    }

    /// Seconds between rounds
    pub fn fire_interval(&self) -> f32 {
        60.0 / self.fire_rate_rpm()
    }

    /// The preset's recoil pattern (half-degree graph space)
    pub fn pattern(&self) -> RecoilPattern {
        match self {
            WeaponPreset::Rifle => {
                // Vertical climb, then a drift left and right
                let mut pattern = RecoilPattern::from_positions(
                    [
                        Vec2::new(0.0, 2.0),
                        Vec2::new(0.2, 4.5),
                        Vec2::new(0.1, 7.0),
                        Vec2::new(-0.4, 9.0),
                        Vec2::new(-1.2, 10.5),
                        Vec2::new(-1.6, 11.5),
                        Vec2::new(-0.8, 12.3),
                        Vec2::new(0.6, 13.0),
                        Vec2::new(1.8, 13.6),
                        Vec2::new(2.4, 14.1),
                    ],
                    PatternScale::HalfDegree,
                );
                pattern.uplift_speed = 0.7;
                pattern.recovery_delay = 0.12;
                pattern.recovery_cancel_threshold = 3.0;
                pattern.end_behavior = PatternEndBehavior::RepeatLast;
                pattern
            }
            WeaponPreset::Smg => {
                let mut pattern = RecoilPattern::from_positions(
                    [
                        Vec2::new(0.0, 1.0),
                        Vec2::new(0.3, 2.2),
                        Vec2::new(-0.2, 3.2),
                        Vec2::new(0.4, 4.0),
                        Vec2::new(-0.3, 4.8),
                        Vec2::new(0.2, 5.5),
                    ],
                    PatternScale::HalfDegree,
                );
                pattern.uplift_speed = 0.85;
                pattern.recovery_delay = 0.08;
                pattern.max_recovery_speed = 14.0;
                pattern.recovery_cancel_threshold = 2.0;
                pattern.end_behavior = PatternEndBehavior::RestartFromCustomIndex;
                pattern.custom_restart_index = 3;
                pattern
            }
            WeaponPreset::Lmg => {
                let mut pattern = RecoilPattern::from_positions(
                    [
                        Vec2::new(0.0, 2.5),
                        Vec2::new(0.4, 5.0),
                        Vec2::new(-0.3, 7.0),
                        Vec2::new(0.5, 8.6),
                    ],
                    PatternScale::HalfDegree,
                );
                pattern.uplift_speed = 0.45;
                pattern.recovery_delay = 0.2;
                pattern.initial_recovery_speed = 1.0;
                pattern.max_recovery_speed = 6.0;
                pattern.recovery_acceleration = 20.0;
                pattern.end_behavior = PatternEndBehavior::Random;
                pattern.random_range_x = RandomRange::new(-1.5, 1.5);
                pattern.random_range_y = RandomRange::new(0.5, 2.0);
                pattern
            }
            WeaponPreset::Pistol => {
                let mut pattern =
                    RecoilPattern::from_positions([Vec2::new(0.0, 5.0)], PatternScale::HalfDegree);
                pattern.uplift_speed = 0.95;
                pattern.recovery_delay = 0.05;
                pattern.initial_recovery_speed = 6.0;
                pattern.max_recovery_speed = 18.0;
                pattern.recovery_acceleration = 80.0;
                pattern.end_behavior = PatternEndBehavior::RepeatLast;
                pattern
            }
        }
    }

    /// Heat gained per shot, as a function of current heat
    pub fn shot_to_heat(&self) -> Curve {
        match self {
            WeaponPreset::Pistol => Curve::new([(0.0, 25.0), (100.0, 25.0)]),
            WeaponPreset::Lmg => Curve::new([(0.0, 4.0), (60.0, 6.0), (100.0, 8.0)]),
            _ => Curve::new([(0.0, 12.0), (50.0, 8.0), (100.0, 4.0)]),
        }
    }

    /// Spread cone half-angle (degrees) as a function of heat
    pub fn heat_to_spread(&self) -> Curve {
        match self {
            WeaponPreset::Pistol => Curve::new([(0.0, 0.2), (100.0, 2.0)]),
            WeaponPreset::Smg => Curve::new([(0.0, 1.0), (100.0, 4.5)]),
            WeaponPreset::Lmg => Curve::new([(0.0, 1.5), (100.0, 6.0)]),
            WeaponPreset::Rifle => Curve::new([(0.0, 0.5), (100.0, 3.5)]),
        }
    }

    /// Heat lost per second as a function of heat (hotter cools faster)
    pub fn heat_to_cooldown(&self) -> Curve {
        Curve::new([(0.0, 30.0), (100.0, 80.0)])
    }
}

/// Per-weapon recoil settings
///
/// Missing fields load as defaults; missing curves come from the file's
/// own preset, not the default one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SettingsFile")]
pub struct Settings {
    pub preset: WeaponPreset,

    /// Kick multiplier (1.0 = as authored, 0.0 = none)
    pub recoil_strength: f32,

    // === Spread ===
    pub max_heat: f32,
    /// Seconds after the last shot before heat starts cooling
    pub heat_cooldown_delay: f32,
    pub shot_to_heat: Curve,
    pub heat_to_spread: Curve,
    pub heat_to_cooldown: Curve,

    /// Seed for randomized pattern tails (None = random per engine)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(WeaponPreset::default())
    }
}

/// On-disk shape of [`Settings`], where any field may be absent
#[derive(Deserialize)]
#[serde(default)]
struct SettingsFile {
    preset: WeaponPreset,
    recoil_strength: f32,
    max_heat: f32,
    heat_cooldown_delay: f32,
    shot_to_heat: Option<Curve>,
    heat_to_spread: Option<Curve>,
    heat_to_cooldown: Option<Curve>,
    seed: Option<u64>,
}

impl Default for SettingsFile {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            preset: settings.preset,
            recoil_strength: settings.recoil_strength,
            max_heat: settings.max_heat,
            heat_cooldown_delay: settings.heat_cooldown_delay,
            shot_to_heat: None,
            heat_to_spread: None,
            heat_to_cooldown: None,
            seed: settings.seed,
        }
    }
}

impl From<SettingsFile> for Settings {
    fn from(file: SettingsFile) -> Self {
        let preset = file.preset;
        Self {
            preset,
            recoil_strength: file.recoil_strength,
            max_heat: file.max_heat,
            heat_cooldown_delay: file.heat_cooldown_delay,
            shot_to_heat: file.shot_to_heat.unwrap_or_else(|| preset.shot_to_heat()),
            heat_to_spread: file.heat_to_spread.unwrap_or_else(|| preset.heat_to_spread()),
            heat_to_cooldown: file.heat_to_cooldown.unwrap_or_else(|| preset.heat_to_cooldown()),
            seed: file.seed,
        }
    }
}

impl Settings {
    /// Settings with the preset's curves
    pub fn from_preset(preset: WeaponPreset) -> Self {
        Self {
            preset,
            recoil_strength: 1.0,
            max_heat: 100.0,
            heat_cooldown_delay: 0.5,
            shot_to_heat: preset.shot_to_heat(),
            heat_to_spread: preset.heat_to_spread(),
            heat_to_cooldown: preset.heat_to_cooldown(),
            seed: None,
        }
    }

    /// Switch preset, replacing the curves with the preset's
    pub fn apply_preset(&mut self, preset: WeaponPreset) {
        self.preset = preset;
        self.shot_to_heat = preset.shot_to_heat();
        self.heat_to_spread = preset.heat_to_spread();
        self.heat_to_cooldown = preset.heat_to_cooldown();
    }

    /// Heat model configured from these settings
    pub fn heat_model(&self) -> SpreadHeatModel {
        let mut model = SpreadHeatModel::new(self.max_heat, self.heat_cooldown_delay);
        if !self.shot_to_heat.is_empty() {
            model.set_shot_to_heat(self.shot_to_heat.clone().into_fn());
        }
        if !self.heat_to_spread.is_empty() {
            model.set_heat_to_spread(self.heat_to_spread.clone().into_fn());
        }
        if !self.heat_to_cooldown.is_empty() {
            model.set_heat_to_cooldown_per_second(self.heat_to_cooldown.clone().into_fn());
        }
        model
    }

    /// Spread engine for `pattern` wired with these settings
    pub fn build_engine(&self, pattern: Arc<RecoilPattern>) -> SpreadRecoilEngine {
        let mut engine = match self.seed {
            Some(seed) => RecoilEngine::with_seed(pattern, seed),
            None => {
                let mut engine = RecoilEngine::new();
                engine.set_pattern(pattern);
                engine
            }
        };
        engine.set_recoil_strength(self.recoil_strength);
        SpreadRecoilEngine::new(engine, self.heat_model())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {} ({})", path.display(), settings.preset.as_str());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
