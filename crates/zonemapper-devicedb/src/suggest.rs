//! X/Y pair suggestion from a device's entity list.
//!
//! Position sensors usually come in `..._x` / `..._y` siblings. Candidates
//! are matched by name first; when nothing looks like a coordinate, the
//! device's numeric entities are paired two by two in registry order.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use zonemapper_core::{EntityPair, StateSnapshot};

use crate::registry::DeviceRegistry;

fn x_patterns() -> &'static (Regex, Regex) {
    static X: OnceLock<(Regex, Regex)> = OnceLock::new();
    X.get_or_init(|| {
        (
            Regex::new(r"(^|[_-])x(\b|[_-])").expect("invalid x pattern"),
            Regex::new(r"_x$").expect("invalid x suffix pattern"),
        )
    })
}

fn y_patterns() -> &'static (Regex, Regex) {
    static Y: OnceLock<(Regex, Regex)> = OnceLock::new();
    Y.get_or_init(|| {
        (
            Regex::new(r"(^|[_-])y(\b|[_-])").expect("invalid y pattern"),
            Regex::new(r"_y$").expect("invalid y suffix pattern"),
        )
    })
}

fn is_axis_entity(entity_id: &str, patterns: &(Regex, Regex)) -> bool {
    patterns.0.is_match(entity_id) || patterns.1.is_match(entity_id)
}

fn replace_last(text: &str, from: &str, to: &str) -> String {
    match text.rfind(from) {
        Some(at) => format!("{}{}{}", &text[..at], to, &text[at + from.len()..]),
        None => text.to_string(),
    }
}

/// Likely Y sibling for an X entity id.
///
/// Replaces the last `x` with `y`, then the last `_x` with `_y`.
pub fn guess_y_sibling(x_entity: &str) -> String {
    let swapped = replace_last(x_entity, "x", "y");
    replace_last(&swapped, "_x", "_y")
}

/// Suggests tracked pairs from the entities of `device_id`.
///
/// Returns an empty list when nothing suitable is found.
pub fn suggest_pairs(
    registry: &DeviceRegistry,
    device_id: &str,
    states: &StateSnapshot,
) -> Vec<EntityPair> {
    let ids: Vec<&str> = registry
        .device_entities(device_id)
        .into_iter()
        .map(|e| e.entity_id.as_str())
        .collect();

    let xs: Vec<&str> = ids
        .iter()
        .copied()
        .filter(|id| is_axis_entity(id, x_patterns()))
        .collect();
    let ys: Vec<&str> = ids
        .iter()
        .copied()
        .filter(|id| is_axis_entity(id, y_patterns()))
        .collect();

    let mut used: HashSet<&str> = HashSet::new();
    let mut pairs = Vec::new();
    for x in xs {
        let guess = guess_y_sibling(x);
        let y = ids
            .iter()
            .copied()
            .find(|id| *id == guess)
            .or_else(|| ys.iter().copied().find(|id| !used.contains(id)));
        if let Some(y) = y {
            used.insert(y);
            pairs.push(EntityPair::new(x, y));
        }
    }

    if pairs.is_empty() {
        let numeric: Vec<&str> = ids
            .iter()
            .copied()
            .filter(|id| states.numeric(id).is_some())
            .collect();
        pairs = numeric
            .chunks_exact(2)
            .map(|chunk| EntityPair::new(chunk[0], chunk[1]))
            .collect();
    }

    tracing::debug!("Suggested {} pairs for device {}", pairs.len(), device_id);
    pairs
}
