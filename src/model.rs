//! Data models for the container loading computation.
//!
//! This module defines the fundamental data structures:
//! - `Container`: the single cargo space with its payload limit
//! - `BoxType`: a requested box kind with a quantity and a group
//! - `Group`: display metadata (color) for a group of box types
//! - `Unit`: one physical box after quantity expansion
//! - `PlacedUnit`: a unit with its oriented dimensions and position
//!
//! The request-facing structures are (de)serialized in camelCase.

use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::types::{BoundingBox, Dimensional, Vec3, Weighted};

/// Validation error for request data.
///
/// Raised before any placement work begins; everything else the planner
/// encounters is an outcome, not an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
}

fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_container_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if value < 0.0 || !value.is_finite() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must not be negative, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_weight_value(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(ValidationError::InvalidWeight(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

/// The cargo space of one computation.
///
/// x runs along `length`, y along `width` and z along `height`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({"length": 1000.0, "width": 1000.0, "height": 1000.0, "maxWeight": 500.0}))]
pub struct Container {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub max_weight: f64,
}

impl Container {
    /// Creates a container after validating its parameters.
    pub fn new(
        length: f64,
        width: f64,
        height: f64,
        max_weight: f64,
    ) -> Result<Self, ValidationError> {
        let container = Self {
            length,
            width,
            height,
            max_weight,
        };
        container.validate()?;
        Ok(container)
    }

    /// Checks the container parameters.
    ///
    /// A zero dimension is accepted: such a container simply holds nothing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_container_dimension(self.length, "Container length")?;
        validate_container_dimension(self.width, "Container width")?;
        validate_container_dimension(self.height, "Container height")?;
        if self.max_weight < 0.0 || !self.max_weight.is_finite() {
            return Err(ValidationError::InvalidWeight(format!(
                "Container max weight must not be negative, got: {}",
                self.max_weight
            )));
        }
        Ok(())
    }

    /// The usable interior as a bounding box anchored at the origin.
    #[inline]
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_position_and_dims(Vec3::zero(), self.dimensions())
    }
}

impl Dimensional for Container {
    fn dimensions(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height)
    }
}

fn default_spinnable() -> bool {
    true
}

/// A requested box kind.
///
/// `quantity` identical boxes of this type are to be loaded. Without an explicit
/// `spinnable` flag the box may be turned onto any side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "A", "quantity": 2, "length": 500.0, "width": 400.0, "height": 300.0,
    "weight": 10.0, "group": "G1"
}))]
pub struct BoxType {
    pub id: String,
    pub quantity: u32,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    #[serde(default)]
    #[schema(nullable = true)]
    pub group: Option<String>,
    #[serde(default = "default_spinnable")]
    pub spinnable: bool,
}

impl BoxType {
    /// Creates a spinnable box type after validating its parameters.
    pub fn new(
        id: impl Into<String>,
        quantity: u32,
        dims: (f64, f64, f64),
        weight: f64,
        group: Option<String>,
    ) -> Result<Self, ValidationError> {
        let box_type = Self {
            id: id.into(),
            quantity,
            length: dims.0,
            width: dims.1,
            height: dims.2,
            weight,
            group,
            spinnable: true,
        };
        box_type.validate()?;
        Ok(box_type)
    }

    /// Restricts the type to turns about the vertical axis.
    pub fn upright(mut self) -> Self {
        self.spinnable = false;
        self
    }

    /// Checks dimensions, weight and quantity.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_dimension(self.length, &format!("Length of '{}'", self.id))?;
        validate_dimension(self.width, &format!("Width of '{}'", self.id))?;
        validate_dimension(self.height, &format!("Height of '{}'", self.id))?;
        validate_weight_value(self.weight, &format!("Weight of '{}'", self.id))?;
        if self.quantity == 0 {
            return Err(ValidationError::InvalidQuantity(format!(
                "Quantity of '{}' must be at least 1",
                self.id
            )));
        }
        Ok(())
    }
}

impl Dimensional for BoxType {
    fn dimensions(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height)
    }
}

/// Display metadata for a group of box types.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"name": "G1", "color": "#FF0000"}))]
pub struct Group {
    pub name: String,
    pub color: String,
}

impl Group {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// One physical box instance, expanded from a `BoxType`.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    pub source_id: String,
    /// 1-based index within the source type.
    pub instance_index: u32,
    pub dims: Vec3,
    pub weight: f64,
    pub group: Option<String>,
    pub spinnable: bool,
}

impl Unit {
    /// Identifier of the form `<sourceBoxId>-<instanceIndex>`.
    pub fn unit_id(&self) -> String {
        format!("{}-{}", self.source_id, self.instance_index)
    }
}

impl Dimensional for Unit {
    fn dimensions(&self) -> Vec3 {
        self.dims
    }
}

impl Weighted for Unit {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// A unit placed in the container.
///
/// `dims` holds the dimensions as oriented, `position` the minimum corner.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedUnit {
    pub unit: Unit,
    pub position: Vec3,
    pub dims: Vec3,
}

impl PlacedUnit {
    /// Calculates the bounding box of the placed unit.
    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_position_and_dims(self.position, self.dims)
    }
}

impl Dimensional for PlacedUnit {
    fn dimensions(&self) -> Vec3 {
        self.dims
    }
}

impl Weighted for PlacedUnit {
    fn weight(&self) -> f64 {
        self.unit.weight
    }
}
