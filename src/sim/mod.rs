//! Recoil simulation module
//!
//! Frame-stepped and single-owner: each weapon instance owns its engine and
//! is advanced once per host frame. Patterns are shared read-only.
//! - No threads, no blocking, no internal clock (time is passed in)
//! - Seeded RNG only
//! - Every failure degrades to "no recoil"

pub mod curve;
pub mod engine;
pub mod rotation;
pub mod spread;
pub mod state;
pub mod tick;

pub use curve::{Curve, CurveFn, CurveKey};
pub use engine::RecoilEngine;
pub use rotation::Rotation;
pub use spread::{HeatChange, HeatObserver, SpreadHeatModel, SpreadRecoilEngine};
pub use state::{NoHooks, OrientationTarget, RecoilHooks, RecoilPhase, RecoilState};
pub use tick::{TickInput, TickOutput, compensate_recovery, tick, uplift_duration, uplift_kinematics};
