//! Assembly of the final placement report.
//!
//! Pure aggregation over a finished `LoadPlan`: colors are resolved per group and
//! the fill rate and payload are computed. No placement decision is changed here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{Container, Group};
use crate::planner::{LoadPlan, UnplacedUnit};
use crate::types::Dimensional;

/// Group name to color lookup with a fallback for unknown groups.
#[derive(Clone, Debug)]
pub struct ColorTable {
    colors: HashMap<String, String>,
    default_color: String,
}

impl ColorTable {
    /// Builds the table; on duplicate group names the first color wins.
    pub fn new(groups: &[Group], default_color: &str) -> Self {
        let mut colors = HashMap::with_capacity(groups.len());
        for group in groups {
            colors
                .entry(group.name.clone())
                .or_insert_with(|| group.color.clone());
        }
        Self {
            colors,
            default_color: default_color.to_string(),
        }
    }

    /// Color for a group; absent or unknown groups get the default color.
    pub fn resolve(&self, group: Option<&str>) -> &str {
        group
            .and_then(|name| self.colors.get(name))
            .map(String::as_str)
            .unwrap_or(self.default_color.as_str())
    }
}

/// Single placed box in the report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    #[schema(nullable = true)]
    pub group: Option<String>,
    pub color: String,
}

/// One box that could not be loaded, in the shape of the requested item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnplacedItem {
    pub id: String,
    pub unit_id: String,
    pub quantity: u32,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    #[schema(nullable = true)]
    pub group: Option<String>,
    pub reason_code: String,
    pub reason: String,
}

impl From<UnplacedUnit> for UnplacedItem {
    fn from(entry: UnplacedUnit) -> Self {
        let UnplacedUnit { unit, reason } = entry;
        Self {
            unit_id: unit.unit_id(),
            id: unit.source_id,
            quantity: 1,
            length: unit.dims.x,
            width: unit.dims.y,
            height: unit.dims.z,
            weight: unit.weight,
            group: unit.group,
            reason_code: reason.code().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result of one loading computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacementReport {
    /// Share of the container volume occupied by placed boxes, 0 to 100
    pub fill_rate: f64,
    pub total_weight: f64,
    pub container_volume: f64,
    pub placed_items: Vec<PlacedItem>,
    pub unplaced_items: Vec<UnplacedItem>,
}

/// Percentage of `container_volume` taken by `used_volume`, clamped to 0..=100.
pub fn fill_rate(used_volume: f64, container_volume: f64) -> f64 {
    if container_volume <= 0.0 || used_volume <= 0.0 {
        return 0.0;
    }
    (used_volume / container_volume * 100.0).clamp(0.0, 100.0)
}

/// Turns a load plan into the report, resolving group colors.
pub fn assemble_report(container: &Container, plan: LoadPlan, colors: &ColorTable) -> PlacementReport {
    let container_volume = container.volume();
    let used_volume = plan.used_volume();
    let total_weight = plan.total_weight();
    let LoadPlan { placed, unplaced } = plan;

    let placed_items = placed
        .into_iter()
        .map(|p| PlacedItem {
            color: colors.resolve(p.unit.group.as_deref()).to_string(),
            id: p.unit.unit_id(),
            x: p.position.x,
            y: p.position.y,
            z: p.position.z,
            length: p.dims.x,
            width: p.dims.y,
            height: p.dims.z,
            weight: p.unit.weight,
            group: p.unit.group,
        })
        .collect::<Vec<_>>();

    PlacementReport {
        fill_rate: if placed_items.is_empty() {
            0.0
        } else {
            fill_rate(used_volume, container_volume)
        },
        total_weight,
        container_volume,
        placed_items,
        unplaced_items: unplaced.into_iter().map(UnplacedItem::from).collect(),
    }
}
