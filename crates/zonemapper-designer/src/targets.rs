//! Live target overlay.
//!
//! Each tracked X/Y entity pair reports a sensor-frame position in the input
//! unit. Readings are scaled to millimeters and turned into the cone frame so
//! they line up with the rotated sensor sector.

use zonemapper_core::{EntityPair, LengthUnit, Point, StateSnapshot};

/// A projected target, in world millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetMarker {
    /// Position of the source pair; selects the marker color.
    pub pair_index: usize,
    pub world: Point,
}

/// Projects every pair whose two states both parse as numbers.
///
/// Incomplete pairs, missing entities and non-numeric states are skipped
/// without affecting the index of later pairs.
pub fn project_targets(
    pairs: &[EntityPair],
    states: &StateSnapshot,
    cone_angle_deg: f64,
    input_unit: LengthUnit,
) -> Vec<TargetMarker> {
    let multiplier = input_unit.mm_per_unit();
    pairs
        .iter()
        .enumerate()
        .filter(|(_, pair)| pair.is_complete())
        .filter_map(|(pair_index, pair)| {
            let x = states.numeric(pair.x.trim())?;
            let y = states.numeric(pair.y.trim())?;
            let raw = Point::new(x * multiplier, y * multiplier);
            Some(TargetMarker {
                pair_index,
                world: raw.rotated_into_cone_frame(cone_angle_deg),
            })
        })
        .collect()
}
