//! Unit types for physical quantities.
//!
//! The wire protocol speaks millimeters; the motion driver speaks steps.
//! [`StepsPerMm`] is the single conversion point between the two.

use serde::Deserialize;

/// Absolute motor position in steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Steps(pub i64);

impl Steps {
    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }
}

/// Linear resolution of the actuator in steps per millimeter.
///
/// For a 1.8°/step motor at 16 microsteps on an 8 mm pitch screw:
/// 200 × 16 / 8 = 400 steps/mm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct StepsPerMm(pub u32);

impl StepsPerMm {
    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Convert a position or distance in millimeters to steps.
    #[inline]
    pub fn steps(self, mm: i32) -> Steps {
        Steps(mm as i64 * self.0 as i64)
    }

    /// Convert steps to whole millimeters (truncating toward zero).
    #[inline]
    pub fn millimeters(self, steps: Steps) -> i32 {
        (steps.0 / self.0 as i64) as i32
    }

    /// Convert a speed in mm/s to steps/s.
    #[inline]
    pub fn steps_per_sec(self, mm_per_sec: i32) -> i64 {
        mm_per_sec as i64 * self.0 as i64
    }

    /// Convert a speed in steps/s to mm/s (truncating toward zero).
    #[inline]
    pub fn mm_per_sec(self, steps_per_sec: i64) -> i32 {
        (steps_per_sec / self.0 as i64) as i32
    }

    /// Convert an acceleration in mm/s² to steps/s².
    #[inline]
    pub fn steps_per_sec2(self, mm_per_sec2: i32) -> i64 {
        mm_per_sec2 as i64 * self.0 as i64
    }
}

impl Default for StepsPerMm {
    fn default() -> Self {
        Self(400)
    }
}
