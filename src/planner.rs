//! Placement engine for loading a single container.
//!
//! Units are placed greedily, largest volume first. For every unit the engine
//! evaluates each live anchor point of the free-space tracker in every allowed
//! orientation and commits the feasible pair with the largest contact surface
//! ("touching perimeter"), so boxes hug walls and each other and leave little
//! fragmented space behind. There is no backtracking: the result is
//! deterministic for a given input order, not optimal.

use std::cmp::Ordering;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::expander::expand_units;
use crate::free_space::FreeSpaceTracker;
use crate::geometry::{contact_area, orientations, overlap_1d, overlaps, within};
use crate::model::{BoxType, Container, Group, PlacedUnit, Unit, ValidationError};
use crate::report::{ColorTable, PlacementReport, assemble_report};
use crate::types::{BoundingBox, Dimensional, Vec3};
use crate::weight::WeightGuard;

/// Configuration of the placement engine.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
    /// General numerical tolerance
    pub general_epsilon: f64,
    /// Whether box types may be turned onto their sides at all
    pub allow_rotations: bool,
    /// Minimum share of a lifted box's base that must rest on other boxes (0 disables the check)
    pub support_ratio: f64,
    /// Wall-clock budget for one computation
    pub time_budget: Option<Duration>,
    /// Color for boxes whose group has no color assigned
    pub default_color: String,
}

impl PlannerConfig {
    pub const DEFAULT_GENERAL_EPSILON: f64 = 1e-6;
    pub const DEFAULT_ALLOW_ROTATIONS: bool = true;
    pub const DEFAULT_SUPPORT_RATIO: f64 = 1.0;
    pub const DEFAULT_COLOR: &'static str = "#cccccc";

    /// Creates a builder for a custom configuration.
    pub fn builder() -> PlannerConfigBuilder {
        PlannerConfigBuilder::default()
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            general_epsilon: Self::DEFAULT_GENERAL_EPSILON,
            allow_rotations: Self::DEFAULT_ALLOW_ROTATIONS,
            support_ratio: Self::DEFAULT_SUPPORT_RATIO,
            time_budget: None,
            default_color: Self::DEFAULT_COLOR.to_string(),
        }
    }
}

/// Builder for `PlannerConfig`.
#[derive(Default)]
pub struct PlannerConfigBuilder {
    config: PlannerConfig,
}

impl PlannerConfigBuilder {
    /// Sets the general tolerance.
    pub fn general_epsilon(mut self, epsilon: f64) -> Self {
        self.config.general_epsilon = epsilon;
        self
    }

    /// Allows or forbids turning boxes onto their sides.
    pub fn allow_rotations(mut self, allow: bool) -> Self {
        self.config.allow_rotations = allow;
        self
    }

    /// Sets the minimum supported base share for lifted boxes.
    pub fn support_ratio(mut self, ratio: f64) -> Self {
        self.config.support_ratio = ratio;
        self
    }

    /// Sets the wall-clock budget.
    pub fn time_budget(mut self, budget: Option<Duration>) -> Self {
        self.config.time_budget = budget;
        self
    }

    /// Sets the fallback color.
    pub fn default_color(mut self, color: impl Into<String>) -> Self {
        self.config.default_color = color.into();
        self
    }

    /// Creates the final configuration.
    pub fn build(self) -> PlannerConfig {
        self.config
    }
}

/// Why a unit could not be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnplacedReason {
    DimensionsExceedContainer,
    WeightLimitExceeded,
    NoFeasiblePosition,
    TimeBudgetExceeded,
    Cancelled,
}

impl UnplacedReason {
    pub fn code(&self) -> &'static str {
        match self {
            UnplacedReason::DimensionsExceedContainer => "dimensions_exceed_container",
            UnplacedReason::WeightLimitExceeded => "weight_limit_exceeded",
            UnplacedReason::NoFeasiblePosition => "no_feasible_position",
            UnplacedReason::TimeBudgetExceeded => "time_budget_exceeded",
            UnplacedReason::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for UnplacedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnplacedReason::DimensionsExceedContainer => {
                write!(f, "Box does not fit the container in any orientation")
            }
            UnplacedReason::WeightLimitExceeded => {
                write!(f, "Box would exceed the container's maximum payload")
            }
            UnplacedReason::NoFeasiblePosition => {
                write!(f, "No free position left for the box")
            }
            UnplacedReason::TimeBudgetExceeded => {
                write!(f, "Computation time budget exhausted before the box was placed")
            }
            UnplacedReason::Cancelled => {
                write!(f, "Computation was cancelled before the box was tried")
            }
        }
    }
}

/// Unit that could not be placed.
#[derive(Clone, Debug)]
pub struct UnplacedUnit {
    pub unit: Unit,
    pub reason: UnplacedReason,
}

/// Outcome of the placement engine, before any output enrichment.
#[derive(Clone, Debug, Default)]
pub struct LoadPlan {
    pub placed: Vec<PlacedUnit>,
    pub unplaced: Vec<UnplacedUnit>,
}

impl LoadPlan {
    /// Sum of the placed units' weights.
    pub fn total_weight(&self) -> f64 {
        self.placed.iter().map(|p| p.unit.weight).sum()
    }

    /// Sum of the placed units' volumes.
    pub fn used_volume(&self) -> f64 {
        self.placed.iter().map(|p| p.volume()).sum()
    }
}

/// Events emitted while loading, for live visualization.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type")]
pub enum LoadEvent {
    /// A unit was placed.
    UnitPlaced {
        id: String,
        x: f64,
        y: f64,
        z: f64,
        length: f64,
        width: f64,
        height: f64,
        weight: f64,
        total_weight: f64,
    },
    /// A unit could not be placed.
    UnitRejected {
        id: String,
        reason_code: String,
        reason_text: String,
    },
    /// Loading finished.
    Finished { placed: usize, unplaced: usize },
}

/// Computes the load plan for one container and returns the enriched report.
///
/// Inputs are validated before any placement work; an empty item list yields an
/// empty report.
pub fn plan_load(
    container: &Container,
    items: &[BoxType],
    groups: &[Group],
    config: &PlannerConfig,
) -> Result<PlacementReport, ValidationError> {
    plan_load_with_progress(container, items, groups, config, |_| {
        ControlFlow::Continue(())
    })
}

/// Like `plan_load`, with a callback for every placement decision.
///
/// Returning `ControlFlow::Break` from the callback stops the computation; every
/// unit not yet decided is then reported as cancelled.
pub fn plan_load_with_progress(
    container: &Container,
    items: &[BoxType],
    groups: &[Group],
    config: &PlannerConfig,
    on_event: impl FnMut(&LoadEvent) -> ControlFlow<()>,
) -> Result<PlacementReport, ValidationError> {
    container.validate()?;
    for item in items {
        item.validate()?;
    }

    let units = expand_units(items, !config.allow_rotations);
    info!(
        "📦 Loading {} units into a {} × {} × {} container",
        units.len(),
        container.length,
        container.width,
        container.height
    );
    let plan = place_units(container, units, config, on_event);
    let colors = ColorTable::new(groups, &config.default_color);
    let report = assemble_report(container, plan, &colors);
    info!(
        "✅ {} placed, {} unplaced, fill rate {:.2}%",
        report.placed_items.len(),
        report.unplaced_items.len(),
        report.fill_rate
    );
    Ok(report)
}

/// Places units one at a time into the container.
///
/// Units are sorted by decreasing volume; equal volumes keep their input order.
/// Once the time budget runs out or the callback breaks, the units left over are
/// rejected with the matching reason and no further placement is attempted.
pub fn place_units(
    container: &Container,
    units: Vec<Unit>,
    config: &PlannerConfig,
    mut on_event: impl FnMut(&LoadEvent) -> ControlFlow<()>,
) -> LoadPlan {
    let deadline = config
        .time_budget
        .and_then(|budget| Instant::now().checked_add(budget));
    let eps = config.general_epsilon;

    let mut units = units;
    units.sort_by(|a, b| b.volume().partial_cmp(&a.volume()).unwrap_or(Ordering::Equal));

    // smallest edge among the units from index i onwards
    let mut min_edge_from = vec![f64::INFINITY; units.len() + 1];
    for i in (0..units.len()).rev() {
        min_edge_from[i] = min_edge_from[i + 1].min(units[i].dims.min_component());
    }

    let mut tracker = FreeSpaceTracker::new(container, eps);
    let mut guard = WeightGuard::new(container.max_weight, eps);
    let mut plan = LoadPlan::default();
    let mut halted: Option<UnplacedReason> = None;

    for (idx, unit) in units.into_iter().enumerate() {
        if let Some(reason) = halted {
            let _ = reject(&mut plan, unit, reason, &mut on_event);
            continue;
        }

        let outcome = if deadline_passed(deadline) {
            Err(UnplacedReason::TimeBudgetExceeded)
        } else {
            find_best_placement(
                &unit,
                container,
                &mut tracker,
                &guard,
                min_edge_from[idx],
                deadline,
                config,
            )
        };

        let flow = match outcome {
            Ok((position, dims)) => {
                tracker.place(position, dims);
                guard.commit(&unit);
                let placed = PlacedUnit {
                    unit,
                    position,
                    dims,
                };
                debug!(
                    "Placed {} at ({}, {}, {})",
                    placed.unit.unit_id(),
                    position.x,
                    position.y,
                    position.z
                );
                let flow = on_event(&LoadEvent::UnitPlaced {
                    id: placed.unit.unit_id(),
                    x: position.x,
                    y: position.y,
                    z: position.z,
                    length: dims.x,
                    width: dims.y,
                    height: dims.z,
                    weight: placed.unit.weight,
                    total_weight: guard.loaded(),
                });
                plan.placed.push(placed);
                flow
            }
            Err(UnplacedReason::TimeBudgetExceeded) => {
                info!(
                    "⏱️ Time budget exhausted after {} placements",
                    plan.placed.len()
                );
                halted = Some(UnplacedReason::TimeBudgetExceeded);
                reject(&mut plan, unit, UnplacedReason::TimeBudgetExceeded, &mut on_event)
            }
            Err(reason) => reject(&mut plan, unit, reason, &mut on_event),
        };

        if flow.is_break() && halted.is_none() {
            info!(
                "🛑 Loading cancelled after {} placements",
                plan.placed.len()
            );
            halted = Some(UnplacedReason::Cancelled);
        }
    }

    let _ = on_event(&LoadEvent::Finished {
        placed: plan.placed.len(),
        unplaced: plan.unplaced.len(),
    });
    plan
}

fn reject(
    plan: &mut LoadPlan,
    unit: Unit,
    reason: UnplacedReason,
    on_event: &mut impl FnMut(&LoadEvent) -> ControlFlow<()>,
) -> ControlFlow<()> {
    debug!("Rejected {}: {}", unit.unit_id(), reason.code());
    let flow = on_event(&LoadEvent::UnitRejected {
        id: unit.unit_id(),
        reason_code: reason.code().to_string(),
        reason_text: reason.to_string(),
    });
    plan.unplaced.push(UnplacedUnit { unit, reason });
    flow
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Finds the best anchor and orientation for a unit.
///
/// # Returns
/// `Ok((position, oriented_dims))` for the winning pair, otherwise the reason
/// the unit cannot be placed. `deadline` is checked before every anchor.
fn find_best_placement(
    unit: &Unit,
    container: &Container,
    tracker: &mut FreeSpaceTracker,
    guard: &WeightGuard,
    min_edge: f64,
    deadline: Option<Instant>,
    config: &PlannerConfig,
) -> Result<(Vec3, Vec3), UnplacedReason> {
    let eps = config.general_epsilon;
    let rotations = orientations(unit.dims, unit.spinnable);
    let container_dims = container.dimensions();

    if !rotations.iter().any(|d| d.fits_within(&container_dims, eps)) {
        return Err(UnplacedReason::DimensionsExceedContainer);
    }
    if !guard.admits(unit) {
        return Err(UnplacedReason::WeightLimitExceeded);
    }

    let anchors = tracker.live_anchors(min_edge).to_vec();
    let occupied = tracker.occupied();
    let mut best: Option<((Vec3, Vec3), PlacementScore)> = None;

    for anchor in anchors {
        if deadline_passed(deadline) {
            return Err(UnplacedReason::TimeBudgetExceeded);
        }
        for (orientation, &dims) in rotations.iter().enumerate() {
            let candidate = BoundingBox::from_position_and_dims(anchor, dims);

            if !within(container, &candidate, eps) {
                continue;
            }
            if occupied.iter().any(|p| overlaps(p, &candidate, eps)) {
                continue;
            }
            if !has_sufficient_support(&candidate, occupied, config) {
                continue;
            }

            let score = PlacementScore {
                contact: contact_area(container, &candidate, occupied, eps),
                z: anchor.z,
                y: anchor.y,
                x: anchor.x,
                orientation,
            };
            update_best(&mut best, (anchor, dims), score, config);
        }
    }

    best.map(|(placement, _)| placement)
        .ok_or(UnplacedReason::NoFeasiblePosition)
}

/// Checks whether enough of a lifted box's base rests on placed boxes.
///
/// Boxes on the floor are always supported; a ratio of 0 disables the check.
fn has_sufficient_support(
    candidate: &BoundingBox,
    occupied: &[BoundingBox],
    config: &PlannerConfig,
) -> bool {
    let eps = config.general_epsilon;
    if config.support_ratio <= 0.0 || candidate.min.z <= eps {
        return true;
    }

    let support_area: f64 = occupied
        .iter()
        .filter(|p| (p.max.z - candidate.min.z).abs() <= eps)
        .map(|p| {
            overlap_1d(candidate.min.x, candidate.max.x, p.min.x, p.max.x)
                * overlap_1d(candidate.min.y, candidate.max.y, p.min.y, p.max.y)
        })
        .sum();

    let dims = candidate.dimensions();
    let base_area = dims.x * dims.y;
    if base_area <= eps {
        return false;
    }

    support_area / base_area + eps >= config.support_ratio
}

/// Rating of one anchor/orientation pair.
///
/// Larger contact wins, then lower z, y, x, then the earlier orientation.
#[derive(Clone, Copy, Debug)]
struct PlacementScore {
    contact: f64,
    z: f64,
    y: f64,
    x: f64,
    orientation: usize,
}

fn update_best(
    best: &mut Option<((Vec3, Vec3), PlacementScore)>,
    placement: (Vec3, Vec3),
    score: PlacementScore,
    config: &PlannerConfig,
) {
    match best {
        None => {
            *best = Some((placement, score));
        }
        Some((_, current)) => {
            if is_better_score(score, *current, config) {
                *best = Some((placement, score));
            }
        }
    }
}

fn is_better_score(new: PlacementScore, current: PlacementScore, config: &PlannerConfig) -> bool {
    match compare_with_epsilon(new.contact, current.contact, config.general_epsilon) {
        Ordering::Greater => return true,
        Ordering::Less => return false,
        Ordering::Equal => {}
    }

    for (a, b) in [(new.z, current.z), (new.y, current.y), (new.x, current.x)] {
        match compare_with_epsilon(a, b, config.general_epsilon) {
            Ordering::Less => return true,
            Ordering::Greater => return false,
            Ordering::Equal => {}
        }
    }

    new.orientation < current.orientation
}

fn compare_with_epsilon(a: f64, b: f64, eps: f64) -> Ordering {
    if (a - b).abs() <= eps {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}
