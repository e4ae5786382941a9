//! Keyframed float curves for the heat model
//!
//! Piecewise-linear between keys, constant beyond the first and last key.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Host-supplied curve: pure, evaluated at arbitrary (unclamped) input
pub type CurveFn = Arc<dyn Fn(f32) -> f32 + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    keys: Vec<CurveKey>,
}

impl Curve {
    /// Curve through `(time, value)` points (any order)
    pub fn new(points: impl IntoIterator<Item = (f32, f32)>) -> Self {
        let mut curve = Self::default();
        for (time, value) in points {
            curve.add_key(time, value);
        }
        curve
    }

    pub fn constant(value: f32) -> Self {
        Self::new([(0.0, value)])
    }

    /// Insert a key, replacing any key at the same time
    pub fn add_key(&mut self, time: f32, value: f32) {
        if !time.is_finite() {
            return;
        }
        match self.keys.binary_search_by(|k| k.time.total_cmp(&time)) {
            Ok(i) => self.keys[i].value = value,
            Err(i) => self.keys.insert(i, CurveKey { time, value }),
        }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn eval(&self, x: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if x.is_nan() || x <= first.time {
            return first.value;
        }
        if x >= last.time {
            return last.value;
        }

        let i = self.keys.partition_point(|k| k.time <= x);
        let a = self.keys[i - 1];
        let b = self.keys[i];
        let t = (x - a.time) / (b.time - a.time);
        a.value + (b.value - a.value) * t
    }

    pub fn into_fn(self) -> CurveFn {
        Arc::new(move |x| self.eval(x))
    }
}
