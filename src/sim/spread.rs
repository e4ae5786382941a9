//! Heat-driven accuracy spread
//!
//! Each shot adds heat looked up from the current heat, heat maps to a
//! spread angle, and heat cools at a heat-dependent rate once the cooldown
//! delay after the last shot has passed. This runs on its own clock,
//! layered beside the recoil engine rather than inside it.

use std::fmt;

use glam::Vec2;

use super::curve::CurveFn;
use super::engine::RecoilEngine;
use super::state::{NoHooks, OrientationTarget, RecoilHooks};
use super::tick::TickOutput;

/// A heat transition, reported to observers and returned to the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatChange {
    pub new: f32,
    pub old: f32,
}

pub type HeatObserver = Box<dyn FnMut(HeatChange) + Send>;

pub struct SpreadHeatModel {
    heat: f32,
    max_heat: f32,
    /// Seconds after the last shot before heat starts cooling
    cooldown_delay: f32,
    last_fire_time: f64,
    shot_to_heat: Option<CurveFn>,
    heat_to_spread: Option<CurveFn>,
    heat_to_cooldown_per_second: Option<CurveFn>,
    observers: Vec<HeatObserver>,
}

impl fmt::Debug for SpreadHeatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpreadHeatModel")
            .field("heat", &self.heat)
            .field("max_heat", &self.max_heat)
            .field("cooldown_delay", &self.cooldown_delay)
            .field("last_fire_time", &self.last_fire_time)
            .field("ready", &self.is_ready())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for SpreadHeatModel {
    fn default() -> Self {
        Self::new(100.0, 0.5)
    }
}

impl SpreadHeatModel {
    pub fn new(max_heat: f32, cooldown_delay: f32) -> Self {
        Self {
            heat: 0.0,
            max_heat: max_heat.max(0.0),
            cooldown_delay: cooldown_delay.max(0.0),
            last_fire_time: 0.0,
            shot_to_heat: None,
            heat_to_spread: None,
            heat_to_cooldown_per_second: None,
            observers: Vec::new(),
        }
    }

    // === Configuration ===

    pub fn set_shot_to_heat(&mut self, curve: CurveFn) {
        self.shot_to_heat = Some(curve);
    }

    pub fn set_heat_to_spread(&mut self, curve: CurveFn) {
        self.heat_to_spread = Some(curve);
    }

    pub fn set_heat_to_cooldown_per_second(&mut self, curve: CurveFn) {
        self.heat_to_cooldown_per_second = Some(curve);
    }

    /// All three curves are configured
    pub fn is_ready(&self) -> bool {
        self.shot_to_heat.is_some()
            && self.heat_to_spread.is_some()
            && self.heat_to_cooldown_per_second.is_some()
    }

    /// Change the heat cap; current heat is re-clamped
    pub fn set_max_heat(&mut self, max_heat: f32) -> HeatChange {
        self.max_heat = max_heat.max(0.0);
        self.set_heat(self.heat)
    }

    pub fn max_heat(&self) -> f32 {
        self.max_heat
    }

    pub fn set_cooldown_delay(&mut self, delay: f32) {
        self.cooldown_delay = delay.max(0.0);
    }

    pub fn cooldown_delay(&self) -> f32 {
        self.cooldown_delay
    }

    /// Register a callback for every heat change
    pub fn on_heat_changed(&mut self, observer: impl FnMut(HeatChange) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    // === Heat ===

    pub fn heat(&self) -> f32 {
        self.heat
    }

    /// Add (or with a negative amount, remove) heat, clamped to [0, max]
    pub fn add_heat(&mut self, amount: f32) -> HeatChange {
        self.set_heat(self.heat + amount)
    }

    fn set_heat(&mut self, heat: f32) -> HeatChange {
        let old = self.heat;
        // NaN input leaves heat where it was
        let new = if heat.is_nan() { old } else { heat.clamp(0.0, self.max_heat) };
        self.heat = new;

        let change = HeatChange { new, old };
        for observer in &mut self.observers {
            observer(change);
        }
        change
    }

    /// Heat up for one fired round
    ///
    /// The increment is read from the curve at the current heat, so the
    /// curve shape decides whether returns diminish or escalate.
    pub fn on_shot_fired(&mut self, now: f64) -> Option<HeatChange> {
        self.last_fire_time = now;
        if !self.is_ready() {
            return None;
        }
        let increment = self.shot_to_heat.as_ref().map(|f| f(self.heat))?;
        Some(self.add_heat(increment))
    }

    /// Cool down once the delay after the last shot has passed
    pub fn advance(&mut self, dt: f32, now: f64) -> Option<HeatChange> {
        if !self.is_ready() || self.heat <= 0.0 {
            return None;
        }
        if now < self.last_fire_time + self.cooldown_delay as f64 {
            return None;
        }
        let rate = self.heat_to_cooldown_per_second.as_ref().map(|f| f(self.heat))?;
        Some(self.set_heat(self.heat - rate * dt))
    }

    /// Spread angle for the next shot, 0 when the curve is not set
    pub fn spread_angle(&self) -> f32 {
        match &self.heat_to_spread {
            Some(curve) => curve(self.heat),
            None => {
                log::debug!("spread_angle queried without a heat-to-spread curve");
                0.0
            }
        }
    }

    pub fn has_pending_heat(&self) -> bool {
        self.heat > f32::EPSILON
    }
}

/// Recoil engine with heat spread layered on top
pub struct SpreadRecoilEngine<H: RecoilHooks = NoHooks> {
    pub engine: RecoilEngine<H>,
    pub heat: SpreadHeatModel,
}

impl Default for SpreadRecoilEngine<NoHooks> {
    fn default() -> Self {
        Self::new(RecoilEngine::new(), SpreadHeatModel::default())
    }
}

impl<H: RecoilHooks> SpreadRecoilEngine<H> {
    pub fn new(engine: RecoilEngine<H>, heat: SpreadHeatModel) -> Self {
        Self { engine, heat }
    }

    pub fn start_sequence(&mut self) {
        self.engine.start_sequence();
    }

    /// Fire one round: recoil kick plus heat
    pub fn apply_shot(&mut self, now: f64) -> Vec2 {
        let kick = self.engine.apply_shot(now);
        self.heat.on_shot_fired(now);
        kick
    }

    pub fn advance(&mut self, dt: f32, now: f64, target: &mut dyn OrientationTarget) -> TickOutput {
        let output = self.engine.advance(dt, now, target);
        self.heat.advance(dt, now);
        output
    }

    /// Heat from an external source (melee, abilities)
    pub fn add_heat(&mut self, amount: f32) -> HeatChange {
        self.heat.add_heat(amount)
    }

    pub fn spread_angle(&self) -> f32 {
        self.heat.spread_angle()
    }

    /// Recoil still moving or heat still cooling
    pub fn is_active(&self) -> bool {
        self.engine.is_active() || self.heat.has_pending_heat()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::sim::curve::Curve;

    fn ready_model() -> SpreadHeatModel {
        let mut model = SpreadHeatModel::new(100.0, 0.5);
        // Diminishing returns: 20 heat when cold, 5 when hot
        model.set_shot_to_heat(Curve::new([(0.0, 20.0), (100.0, 5.0)]).into_fn());
        model.set_heat_to_spread(Curve::new([(0.0, 0.5), (100.0, 4.0)]).into_fn());
        model.set_heat_to_cooldown_per_second(Curve::constant(40.0).into_fn());
        model
    }

    #[test]
    fn test_add_heat_clamps() {
        let mut model = SpreadHeatModel::new(50.0, 0.5);
        assert_eq!(model.add_heat(80.0), HeatChange { new: 50.0, old: 0.0 });
        assert_eq!(model.add_heat(-500.0), HeatChange { new: 0.0, old: 50.0 });
        assert_eq!(model.add_heat(f32::NAN).new, 0.0);
    }

    #[test]
    fn test_shot_heat_reads_curve_at_current_heat() {
        let mut model = ready_model();
        let first = model.on_shot_fired(0.0).unwrap();
        assert_eq!(first.new, 20.0);
        let second = model.on_shot_fired(0.1).unwrap();
        // curve(20) = 20 - 15 * 0.2 = 17
        assert!((second.new - 37.0).abs() < 1e-4);
    }

    #[test]
    fn test_cooldown_waits_for_delay() {
        let mut model = ready_model();
        model.add_heat(40.0);
        model.on_shot_fired(1.0);
        let heat = model.heat();

        assert!(model.advance(0.1, 1.2).is_none());
        assert_eq!(model.heat(), heat);

        let change = model.advance(0.1, 1.5).unwrap();
        assert!((change.new - (heat - 4.0)).abs() < 1e-4);

        // Cools to zero and stops
        let mut now = 1.6;
        for _ in 0..100 {
            model.advance(0.1, now);
            now += 0.1;
        }
        assert_eq!(model.heat(), 0.0);
        assert!(model.advance(0.1, now).is_none());
    }

    #[test]
    fn test_unconfigured_model_is_inert() {
        let mut model = SpreadHeatModel::default();
        assert!(!model.is_ready());
        assert!(model.on_shot_fired(0.0).is_none());
        assert_eq!(model.spread_angle(), 0.0);
        model.add_heat(10.0);
        assert!(model.advance(1.0, 10.0).is_none());
        assert_eq!(model.heat(), 10.0);
    }

    #[test]
    fn test_observers_see_every_change() {
        let mut model = ready_model();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        model.on_heat_changed(move |change| sink.lock().unwrap().push(change));

        model.add_heat(10.0);
        model.set_max_heat(5.0);
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                HeatChange { new: 10.0, old: 0.0 },
                HeatChange { new: 5.0, old: 10.0 },
            ]
        );
    }

    #[test]
    fn test_spread_follows_heat() {
        let mut model = ready_model();
        assert_eq!(model.spread_angle(), 0.5);
        model.add_heat(100.0);
        assert_eq!(model.spread_angle(), 4.0);
    }
}
