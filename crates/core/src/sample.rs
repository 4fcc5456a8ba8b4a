use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::Sub;

/// A value that can be stored in a [`History`](crate::history::History).
///
/// Implemented for the 1-, 2- and 3-component float vectors used by
/// buttons, coordinates and axes.
pub trait Value: Copy + Default + Debug + PartialEq + Sub<Output = Self> + Send + Sync {
    /// Component-wise equality within `threshold`.
    ///
    /// Components are equal when their absolute difference is below the
    /// threshold, or when they are exactly equal (so a zero threshold still
    /// coalesces identical readings).
    fn approx_eq(&self, other: &Self, threshold: f32) -> bool;
}

fn component_eq(a: f32, b: f32, threshold: f32) -> bool {
    a == b || (a - b).abs() < threshold
}

/// Scalar sample: buttons, keys, triggers, flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec1 {
    pub x: f32,
}

/// Planar sample: thumbsticks, d-pad, cursor positions, wheel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Spatial sample: three-axis controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec1 {
    pub const fn new(x: f32) -> Self {
        Self { x }
    }
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Planar part of the vector.
    #[must_use]
    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl Sub for Vec1 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Value for Vec1 {
    fn approx_eq(&self, other: &Self, threshold: f32) -> bool {
        component_eq(self.x, other.x, threshold)
    }
}

impl Value for Vec2 {
    fn approx_eq(&self, other: &Self, threshold: f32) -> bool {
        component_eq(self.x, other.x, threshold) && component_eq(self.y, other.y, threshold)
    }
}

impl Value for Vec3 {
    fn approx_eq(&self, other: &Self, threshold: f32) -> bool {
        component_eq(self.x, other.x, threshold)
            && component_eq(self.y, other.y, threshold)
            && component_eq(self.z, other.z, threshold)
    }
}

// ── Conversions used by `History::set` ────────────────────────────────────────

impl From<f32> for Vec1 {
    fn from(x: f32) -> Self {
        Self::new(x)
    }
}

impl From<bool> for Vec1 {
    fn from(down: bool) -> Self {
        Self::new(if down { 1.0 } else { 0.0 })
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<(f32, f32, f32)> for Vec3 {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// One timestamped observation of a device control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<T: Value> {
    /// Seconds since the clock origin.
    pub t: f64,
    pub value: T,
    /// `value` minus the value it replaced.
    pub delta: T,
    /// Deduplication tolerance, see [`Value::approx_eq`].
    pub threshold: f32,
}

impl<T: Value> Sample<T> {
    pub fn new(value: T, t: f64) -> Self {
        Self {
            t,
            value,
            delta: T::default(),
            threshold: 0.0,
        }
    }

    /// `true` if `value` is indistinguishable from this sample's value.
    #[must_use]
    pub fn matches(&self, value: &T) -> bool {
        self.value.approx_eq(value, self.threshold)
    }

    /// Replace the value, recording the delta from the previous one.
    pub fn apply(&mut self, value: T) {
        self.delta = value - self.value;
        self.value = value;
    }
}

impl Sample<Vec1> {
    /// Scalar reading, as used by the gesture predicates.
    #[must_use]
    pub fn x(&self) -> f32 {
        self.value.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threshold_still_matches_identical_values() {
        let s = Sample::new(Vec2::new(0.25, -1.0), 0.0);
        assert!(s.matches(&Vec2::new(0.25, -1.0)));
        assert!(!s.matches(&Vec2::new(0.25, -0.999)));
    }

    #[test]
    fn threshold_is_strict_per_component() {
        let mut s = Sample::new(Vec3::new(0.0, 0.0, 0.0), 0.0);
        s.threshold = 0.1;
        assert!(s.matches(&Vec3::new(0.05, -0.05, 0.09)));
        assert!(!s.matches(&Vec3::new(0.05, 0.0, 0.1)));
        assert!(!s.matches(&Vec3::new(0.2, 0.0, 0.0)));
    }

    #[test]
    fn apply_records_delta() {
        let mut s = Sample::new(Vec2::new(0.5, 0.5), 0.0);
        s.apply(Vec2::new(1.0, 0.0));
        assert_eq!(s.value, Vec2::new(1.0, 0.0));
        assert_eq!(s.delta, Vec2::new(0.5, -0.5));
    }

    #[test]
    fn bool_converts_to_unit_button_values() {
        assert_eq!(Vec1::from(true).x, 1.0);
        assert_eq!(Vec1::from(false).x, 0.0);
    }

    #[test]
    fn magnitude_and_projection() {
        assert_eq!(Vec2::new(3.0, 4.0).magnitude(), 5.0);
        let v = Vec3::new(1.0, 2.0, 2.0);
        assert_eq!(v.magnitude(), 3.0);
        assert_eq!(v.xy(), Vec2::new(1.0, 2.0));
    }
}
