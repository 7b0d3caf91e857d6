//! Geometric helpers for collision detection, containment and orientation.
//!
//! All functions are pure. Malformed (non-positive) dimensions are rejected during
//! request validation and never reach this module.

use crate::model::Container;
use crate::types::{BoundingBox, Vec3};

/// Checks whether two boxes share positive-volume interior.
///
/// Boxes that merely touch along a face or an edge do not overlap.
pub fn overlaps(a: &BoundingBox, b: &BoundingBox, epsilon: f64) -> bool {
    a.overlaps(b, epsilon)
}

/// Checks whether a box lies fully inside the container interior.
pub fn within(container: &Container, b: &BoundingBox, epsilon: f64) -> bool {
    b.is_inside(&container.bounds(), epsilon)
}

/// Enumerates the distinct orientations of a box.
///
/// The order is fixed, since the planner falls back on it to break ties:
/// `(l,w,h), (w,l,h), (l,h,w), (h,l,w), (w,h,l), (h,w,l)`.
/// A box that may not spin keeps its height vertical and can only turn about the
/// z axis, which leaves `(l,w,h)` and `(w,l,h)`. Orientations that coincide
/// because of equal edges are reported once.
pub fn orientations(dims: Vec3, spinnable: bool) -> Vec<Vec3> {
    let Vec3 { x: l, y: w, z: h } = dims;
    let candidates: &[(f64, f64, f64)] = if spinnable {
        &[
            (l, w, h),
            (w, l, h),
            (l, h, w),
            (h, l, w),
            (w, h, l),
            (h, w, l),
        ]
    } else {
        &[(l, w, h), (w, l, h)]
    };

    let mut result: Vec<Vec3> = Vec::with_capacity(candidates.len());
    for &candidate in candidates {
        let candidate = Vec3::from_tuple(candidate);
        if !result.contains(&candidate) {
            result.push(candidate);
        }
    }
    result
}

/// Calculates the overlap of two intervals in one dimension.
///
/// # Returns
/// Length of the overlap, at least 0.0
pub fn overlap_1d(a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    (a2.min(b2) - a1.max(b1)).max(0.0)
}

#[inline]
fn touches(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Area of the faces two boxes share.
///
/// Non-zero only when the boxes touch on one axis and their projections onto
/// the other two axes overlap.
pub fn shared_face_area(a: &BoundingBox, b: &BoundingBox, epsilon: f64) -> f64 {
    let ox = overlap_1d(a.min.x, a.max.x, b.min.x, b.max.x);
    let oy = overlap_1d(a.min.y, a.max.y, b.min.y, b.max.y);
    let oz = overlap_1d(a.min.z, a.max.z, b.min.z, b.max.z);

    let mut area = 0.0;
    if touches(a.max.x, b.min.x, epsilon) || touches(a.min.x, b.max.x, epsilon) {
        area += oy * oz;
    }
    if touches(a.max.y, b.min.y, epsilon) || touches(a.min.y, b.max.y, epsilon) {
        area += ox * oz;
    }
    if touches(a.max.z, b.min.z, epsilon) || touches(a.min.z, b.max.z, epsilon) {
        area += ox * oy;
    }
    area
}

/// Area a box shares with the six container faces.
pub fn wall_contact_area(container: &Container, b: &BoundingBox, epsilon: f64) -> f64 {
    let d = b.dimensions();
    let mut area = 0.0;
    if touches(b.min.x, 0.0, epsilon) {
        area += d.y * d.z;
    }
    if touches(b.max.x, container.length, epsilon) {
        area += d.y * d.z;
    }
    if touches(b.min.y, 0.0, epsilon) {
        area += d.x * d.z;
    }
    if touches(b.max.y, container.width, epsilon) {
        area += d.x * d.z;
    }
    if touches(b.min.z, 0.0, epsilon) {
        area += d.x * d.y;
    }
    if touches(b.max.z, container.height, epsilon) {
        area += d.x * d.y;
    }
    area
}

/// Total contact surface of a candidate with the container and the placed boxes.
pub fn contact_area<'a>(
    container: &Container,
    candidate: &BoundingBox,
    placed: impl IntoIterator<Item = &'a BoundingBox>,
    epsilon: f64,
) -> f64 {
    let walls = wall_contact_area(container, candidate, epsilon);
    let neighbours: f64 = placed
        .into_iter()
        .map(|other| shared_face_area(candidate, other, epsilon))
        .sum();
    walls + neighbours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EPSILON_GENERAL;

    fn aabb(pos: (f64, f64, f64), dims: (f64, f64, f64)) -> BoundingBox {
        BoundingBox::from_position_and_dims(pos.into(), dims.into())
    }

    fn container(l: f64, w: f64, h: f64) -> Container {
        Container {
            length: l,
            width: w,
            height: h,
            max_weight: 100.0,
        }
    }

    #[test]
    fn touching_faces_do_not_overlap() {
        let a = aabb((0.0, 0.0, 0.0), (10.0, 10.0, 10.0));
        let b = aabb((10.0, 0.0, 0.0), (10.0, 10.0, 10.0));
        let c = aabb((9.0, 9.0, 9.0), (10.0, 10.0, 10.0));
        assert!(!overlaps(&a, &b, EPSILON_GENERAL));
        assert!(overlaps(&a, &c, EPSILON_GENERAL));
    }

    #[test]
    fn within_checks_all_axes() {
        let cont = container(10.0, 20.0, 30.0);
        assert!(within(&cont, &aabb((0.0, 0.0, 0.0), (10.0, 20.0, 30.0)), EPSILON_GENERAL));
        assert!(!within(&cont, &aabb((0.0, 0.0, 1.0), (10.0, 20.0, 30.0)), EPSILON_GENERAL));
        assert!(!within(&cont, &aabb((0.0, 0.0, 0.0), (11.0, 1.0, 1.0)), EPSILON_GENERAL));
    }

    #[test]
    fn orientations_enumerates_six_distinct_rotations() {
        let all = orientations(Vec3::new(1.0, 2.0, 3.0), true);
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(all[1], Vec3::new(2.0, 1.0, 3.0));
        assert_eq!(all[5], Vec3::new(3.0, 2.0, 1.0));
    }

    #[test]
    fn orientations_deduplicates_equal_edges() {
        assert_eq!(orientations(Vec3::new(4.0, 4.0, 4.0), true).len(), 1);
        assert_eq!(orientations(Vec3::new(4.0, 4.0, 2.0), true).len(), 3);
        assert_eq!(orientations(Vec3::new(4.0, 4.0, 2.0), false).len(), 1);
    }

    #[test]
    fn upright_orientations_keep_height() {
        let upright = orientations(Vec3::new(1.0, 2.0, 3.0), false);
        assert_eq!(upright, vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(2.0, 1.0, 3.0)]);
    }

    #[test]
    fn overlap_1d_clamps_at_zero() {
        assert_eq!(overlap_1d(0.0, 5.0, 3.0, 8.0), 2.0);
        assert_eq!(overlap_1d(0.0, 5.0, 6.0, 8.0), 0.0);
    }

    #[test]
    fn shared_face_area_counts_partial_contact() {
        let a = aabb((0.0, 0.0, 0.0), (10.0, 10.0, 10.0));
        let b = aabb((10.0, 5.0, 0.0), (10.0, 10.0, 4.0));
        assert!((shared_face_area(&a, &b, EPSILON_GENERAL) - 20.0).abs() < EPSILON_GENERAL);

        let apart = aabb((11.0, 0.0, 0.0), (1.0, 1.0, 1.0));
        assert_eq!(shared_face_area(&a, &apart, EPSILON_GENERAL), 0.0);
    }

    #[test]
    fn contact_area_sums_walls_and_neighbours() {
        let cont = container(20.0, 10.0, 10.0);
        let first = aabb((0.0, 0.0, 0.0), (10.0, 10.0, 10.0));
        // floor + ceiling + x=0 wall + both y walls
        assert!(
            (contact_area(&cont, &first, std::iter::empty(), EPSILON_GENERAL) - 500.0).abs()
                < EPSILON_GENERAL
        );

        let second = aabb((10.0, 0.0, 0.0), (10.0, 10.0, 10.0));
        // same walls on the far side plus the shared face with `first`
        let placed = [first];
        assert!(
            (contact_area(&cont, &second, placed.iter(), EPSILON_GENERAL) - 600.0).abs()
                < EPSILON_GENERAL
        );
    }
}
