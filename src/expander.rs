//! Expansion of requested box types into individual units.

use crate::model::{BoxType, Unit};
use crate::types::Vec3;

/// Expands every box type into `quantity` units.
///
/// Input order of the types is preserved and instance indices ascend from 1
/// within a type. `force_upright` marks every unit as spin-restricted.
pub fn expand_units(box_types: &[BoxType], force_upright: bool) -> Vec<Unit> {
    let total: usize = box_types.iter().map(|b| b.quantity as usize).sum();
    let mut units = Vec::with_capacity(total);

    for box_type in box_types {
        let dims = Vec3::new(box_type.length, box_type.width, box_type.height);
        for instance_index in 1..=box_type.quantity {
            units.push(Unit {
                source_id: box_type.id.clone(),
                instance_index,
                dims,
                weight: box_type.weight,
                group: box_type.group.clone(),
                spinnable: box_type.spinnable && !force_upright,
            });
        }
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_quantities_in_input_order() {
        let types = vec![
            BoxType::new("B", 2, (1.0, 1.0, 1.0), 1.0, Some("G".to_string())).unwrap(),
            BoxType::new("A", 3, (2.0, 2.0, 2.0), 2.0, None).unwrap(),
        ];

        let units = expand_units(&types, false);
        let ids: Vec<String> = units.iter().map(Unit::unit_id).collect();
        assert_eq!(ids, vec!["B-1", "B-2", "A-1", "A-2", "A-3"]);
        assert_eq!(units[0].group.as_deref(), Some("G"));
        assert_eq!(units[4].dims, Vec3::new(2.0, 2.0, 2.0));
        assert!(units.iter().all(|u| u.spinnable));
    }

    #[test]
    fn force_upright_overrides_spinnable() {
        let types = vec![BoxType::new("A", 1, (1.0, 2.0, 3.0), 1.0, None).unwrap()];
        let units = expand_units(&types, true);
        assert!(!units[0].spinnable);
    }

    #[test]
    fn empty_request_yields_no_units() {
        assert!(expand_units(&[], false).is_empty());
    }
}
