//! Free-space tracking with extreme points.
//!
//! The tracker keeps the occupied regions of the container and the set of anchor
//! points at which the minimum corner of the next box may be put. Only these
//! anchors are ever considered by the planner.

use crate::model::Container;
use crate::types::{BoundingBox, Vec3};

/// Candidate anchor points and occupied regions of one container.
#[derive(Clone, Debug)]
pub struct FreeSpaceTracker {
    bounds: Vec3,
    anchors: Vec<Vec3>,
    occupied: Vec<BoundingBox>,
    epsilon: f64,
}

impl FreeSpaceTracker {
    /// Creates a tracker for an empty container with the single anchor at the origin.
    pub fn new(container: &Container, epsilon: f64) -> Self {
        Self {
            bounds: Vec3::new(container.length, container.width, container.height),
            anchors: vec![Vec3::zero()],
            occupied: Vec::new(),
            epsilon,
        }
    }

    /// Regions already taken by placed boxes.
    pub fn occupied(&self) -> &[BoundingBox] {
        &self.occupied
    }

    /// Returns the anchors from which a box with edge `min_edge` can still reach
    /// into free space.
    ///
    /// Anchors too close to a container wall for the smallest remaining edge are
    /// dropped for good, since no later unit can use them either as long as the
    /// caller passes the minimum over all remaining units.
    pub fn live_anchors(&mut self, min_edge: f64) -> &[Vec3] {
        let bounds = self.bounds;
        let eps = self.epsilon;
        self.anchors.retain(|a| {
            a.x + min_edge <= bounds.x + eps
                && a.y + min_edge <= bounds.y + eps
                && a.z + min_edge <= bounds.z + eps
        });
        &self.anchors
    }

    /// Records a box placed at `anchor` with the oriented dimensions `dims`.
    ///
    /// The consumed anchor and every anchor the box now covers are removed; the
    /// three extreme points of the box are added where they lie inside the
    /// container and in free space.
    pub fn place(&mut self, anchor: Vec3, dims: Vec3) {
        let placed = BoundingBox::from_position_and_dims(anchor, dims);
        let eps = self.epsilon;

        self.anchors
            .retain(|a| !a.approx_eq(&anchor, eps) && !placed.covers_point(a, eps));
        self.occupied.push(placed);

        let candidates = [
            (Vec3::new(anchor.x + dims.x, anchor.y, anchor.z), placed.max.x < self.bounds.x - eps),
            (Vec3::new(anchor.x, anchor.y + dims.y, anchor.z), placed.max.y < self.bounds.y - eps),
            (Vec3::new(anchor.x, anchor.y, anchor.z + dims.z), placed.max.z < self.bounds.z - eps),
        ];

        for (point, inside) in candidates {
            if inside {
                self.add_anchor(point);
            }
        }
    }

    fn add_anchor(&mut self, point: Vec3) {
        let eps = self.epsilon;
        if self.anchors.iter().any(|a| a.approx_eq(&point, eps)) {
            return;
        }
        if self.occupied.iter().any(|b| b.covers_point(&point, eps)) {
            return;
        }
        self.anchors.push(point);
    }
}
