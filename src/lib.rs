//! Single-container load planning.
//!
//! Places as many boxes as possible into one container with a greedy
//! extreme-point heuristic that favours placements touching walls and
//! neighbouring boxes, while keeping the payload under the weight limit.

pub mod api;
pub mod config;
pub mod expander;
pub mod free_space;
pub mod geometry;
pub mod model;
pub mod planner;
pub mod report;
pub mod types;
pub mod weight;

pub use model::{BoxType, Container, Group, ValidationError};
pub use planner::{PlannerConfig, plan_load, plan_load_with_progress};
pub use report::PlacementReport;
