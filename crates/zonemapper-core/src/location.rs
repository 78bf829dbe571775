//! Location slugs and zone state keys.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const ZONE_KEY_PREFIX: &str = "sensor.zone_mapper_";
const ZONE_KEY_INFIX: &str = "_zone_";

/// Turns a free-form location name into a state-key slug.
///
/// `"Bureau Étage"` becomes `"bureau_etage"`. A name with no usable
/// characters maps to `"unknown"`; an empty name stays empty.
pub fn slugify_location(location: &str) -> String {
    if location.is_empty() {
        return String::new();
    }
    let folded: String = location
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    let mut slug = String::with_capacity(folded.len());
    let mut pending_sep = false;
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c);
        } else {
            pending_sep = true;
        }
    }

    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}

/// State key for a zone: `sensor.zone_mapper_{slug}_zone_{id}`.
pub fn zone_state_key(location: &str, zone_id: i64) -> String {
    format!(
        "{}{}{}{}",
        ZONE_KEY_PREFIX,
        slugify_location(location),
        ZONE_KEY_INFIX,
        zone_id
    )
}

fn zone_key_regex() -> &'static Regex {
    static ZONE_KEY: OnceLock<Regex> = OnceLock::new();
    ZONE_KEY.get_or_init(|| {
        Regex::new(r"^sensor\.zone_mapper_([a-z0-9_]+)_zone_(\d+)$")
            .expect("invalid zone key pattern")
    })
}

/// Splits a zone state key into its slug and zone id.
///
/// Returns `None` unless the key has the exact
/// `sensor.zone_mapper_<slug>_zone_<digits>` shape with a `[a-z0-9_]+` slug.
pub fn parse_zone_state_key(key: &str) -> Option<(String, i64)> {
    let caps = zone_key_regex().captures(key)?;
    let id = caps[2].parse().ok()?;
    Some((caps[1].to_string(), id))
}

/// Zone ids discovered in `keys` for the given location, sorted and deduplicated.
pub fn discover_zone_ids<'a>(location: &str, keys: impl IntoIterator<Item = &'a str>) -> Vec<i64> {
    let slug = slugify_location(location);
    let mut ids: Vec<i64> = keys
        .into_iter()
        .filter_map(parse_zone_state_key)
        .filter(|(key_slug, id)| *key_slug == slug && *id > 0)
        .map(|(_, id)| id)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
