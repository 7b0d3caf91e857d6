//! Common types and traits for 3D geometry.
//!
//! This module defines the vector and axis-aligned box types shared by the
//! planner, together with small trait abstractions for anything that has
//! dimensions or a weight.

use std::ops::{Add, Sub};

/// Global numerical tolerance for floating-point comparisons.
///
/// Used for dimension, position and weight comparisons.
pub const EPSILON_GENERAL: f64 = 1e-6;

/// Represents a 3D vector or point in space.
///
/// x runs along the container length, y along its width and z along its height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Creates a new 3D vector.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a zero vector (origin).
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Converts to tuple format for API compatibility.
    #[inline]
    pub const fn as_tuple(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }

    /// Creates from tuple format.
    #[inline]
    pub const fn from_tuple(tuple: (f64, f64, f64)) -> Self {
        Self::new(tuple.0, tuple.1, tuple.2)
    }

    /// Calculates the volume (product of all components).
    #[inline]
    pub fn volume(&self) -> f64 {
        self.x * self.y * self.z
    }

    /// Smallest of the three components.
    #[inline]
    pub fn min_component(&self) -> f64 {
        self.x.min(self.y).min(self.z)
    }

    /// Checks if the vector fits within another vector (component-wise <=).
    ///
    /// # Parameters
    /// * `container` - The outer vector (e.g., container dimensions)
    /// * `tolerance` - Numerical tolerance for the comparison
    #[inline]
    pub fn fits_within(&self, container: &Self, tolerance: f64) -> bool {
        self.x <= container.x + tolerance
            && self.y <= container.y + tolerance
            && self.z <= container.z + tolerance
    }

    /// Component-wise equality within `tolerance`.
    #[inline]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.z - other.z).abs() <= tolerance
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<(f64, f64, f64)> for Vec3 {
    #[inline]
    fn from(tuple: (f64, f64, f64)) -> Self {
        Self::from_tuple(tuple)
    }
}

impl From<Vec3> for (f64, f64, f64) {
    #[inline]
    fn from(vec: Vec3) -> Self {
        vec.as_tuple()
    }
}

/// Trait for objects with 3D dimensions.
pub trait Dimensional {
    /// Returns the dimensions of the object.
    fn dimensions(&self) -> Vec3;

    /// Calculates the volume.
    fn volume(&self) -> f64 {
        self.dimensions().volume()
    }
}

/// Trait for objects with weight.
pub trait Weighted {
    /// Returns the weight.
    fn weight(&self) -> f64;
}

/// Represents an Axis-Aligned Bounding Box (AABB).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner (position)
    pub min: Vec3,
    /// Maximum corner (position + dimensions)
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a new bounding box.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates a bounding box from position and dimensions.
    #[inline]
    pub fn from_position_and_dims(position: Vec3, dims: Vec3) -> Self {
        Self::new(position, position + dims)
    }

    /// Checks whether two boxes share positive-volume interior.
    ///
    /// Separating Axis Theorem for AABBs: the boxes are disjoint as soon as they
    /// are separated on one axis. Touching faces count as separated, and gaps
    /// smaller than `tolerance` are treated as touching.
    #[inline]
    pub fn overlaps(&self, other: &Self, tolerance: f64) -> bool {
        !(self.max.x <= other.min.x + tolerance
            || other.max.x <= self.min.x + tolerance
            || self.max.y <= other.min.y + tolerance
            || other.max.y <= self.min.y + tolerance
            || self.max.z <= other.min.z + tolerance
            || other.max.z <= self.min.z + tolerance)
    }

    /// Checks whether `self` lies completely inside `outer`.
    #[inline]
    pub fn is_inside(&self, outer: &Self, tolerance: f64) -> bool {
        self.min.x >= outer.min.x - tolerance
            && self.min.y >= outer.min.y - tolerance
            && self.min.z >= outer.min.z - tolerance
            && self.max.x <= outer.max.x + tolerance
            && self.max.y <= outer.max.y + tolerance
            && self.max.z <= outer.max.z + tolerance
    }

    /// Checks if a point lies in the half-open extent `[min, max)` on all axes.
    ///
    /// Any box anchored at such a point would intersect `self`.
    #[inline]
    pub fn covers_point(&self, point: &Vec3, tolerance: f64) -> bool {
        point.x >= self.min.x - tolerance
            && point.x < self.max.x - tolerance
            && point.y >= self.min.y - tolerance
            && point.y < self.max.y - tolerance
            && point.z >= self.min.z - tolerance
            && point.z < self.max.z - tolerance
    }

    /// Returns the dimensions (length, width, height).
    #[inline]
    pub fn dimensions(&self) -> Vec3 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(origin: (f64, f64, f64), side: f64) -> BoundingBox {
        BoundingBox::from_position_and_dims(origin.into(), Vec3::new(side, side, side))
    }

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(a.min_component(), 1.0);
    }

    #[test]
    fn test_vec3_volume_and_fit() {
        let dims = Vec3::new(10.0, 20.0, 30.0);
        assert!((dims.volume() - 6000.0).abs() < EPSILON_GENERAL);

        let large = Vec3::new(30.0, 30.0, 30.0);
        assert!(dims.fits_within(&large, EPSILON_GENERAL));
        assert!(!large.fits_within(&dims, EPSILON_GENERAL));
    }

    #[test]
    fn test_bounding_box_overlap_is_strict() {
        let a = cube((0.0, 0.0, 0.0), 10.0);
        let b = cube((5.0, 5.0, 5.0), 10.0);
        let touching = cube((10.0, 0.0, 0.0), 10.0);
        let edge = cube((10.0, 10.0, 0.0), 10.0);

        assert!(a.overlaps(&b, EPSILON_GENERAL));
        assert!(!a.overlaps(&touching, EPSILON_GENERAL));
        assert!(!a.overlaps(&edge, EPSILON_GENERAL));
    }

    #[test]
    fn test_bounding_box_inside() {
        let outer = cube((0.0, 0.0, 0.0), 10.0);
        assert!(cube((0.0, 0.0, 0.0), 10.0).is_inside(&outer, EPSILON_GENERAL));
        assert!(cube((5.0, 5.0, 5.0), 5.0).is_inside(&outer, EPSILON_GENERAL));
        assert!(!cube((6.0, 0.0, 0.0), 5.0).is_inside(&outer, EPSILON_GENERAL));
    }

    #[test]
    fn test_bounding_box_covers_point_half_open() {
        let b = cube((0.0, 0.0, 0.0), 10.0);
        assert!(b.covers_point(&Vec3::zero(), EPSILON_GENERAL));
        assert!(b.covers_point(&Vec3::new(5.0, 0.0, 9.0), EPSILON_GENERAL));
        assert!(!b.covers_point(&Vec3::new(10.0, 0.0, 0.0), EPSILON_GENERAL));
        assert!(!b.covers_point(&Vec3::new(0.0, 0.0, 10.0), EPSILON_GENERAL));
    }
}
