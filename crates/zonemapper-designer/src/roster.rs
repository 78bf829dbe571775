//! Zone roster: the ordered list of zone ids and display names.
//!
//! The roster is separate from the [`ZoneStore`](crate::zone_store::ZoneStore):
//! a zone can be listed (and selectable) without any geometry drawn yet.

use zonemapper_settings::ZoneSeed;

/// Fallback display name for a zone.
pub fn default_zone_name(id: i64) -> String {
    format!("Zone {}", id)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneRoster {
    entries: Vec<ZoneSeed>,
}

impl ZoneRoster {
    pub fn new(entries: Vec<ZoneSeed>) -> Self {
        Self { entries }
    }

    /// Roster for dynamically discovered ids, sorted, named `Zone {id}`.
    pub fn from_discovered(mut ids: Vec<i64>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self {
            entries: ids
                .into_iter()
                .map(|id| ZoneSeed::new(id, default_zone_name(id)))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[ZoneSeed] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<i64> {
        self.entries.iter().map(|z| z.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.iter().any(|z| z.id == id)
    }

    pub fn first_id(&self) -> Option<i64> {
        self.entries.first().map(|z| z.id)
    }

    /// Trimmed roster name, or `Zone {id}` when unnamed or unknown.
    pub fn label(&self, id: i64) -> String {
        self.entries
            .iter()
            .find(|z| z.id == id)
            .and_then(|z| z.name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_zone_name(id))
    }

    /// Smallest positive id not taken by the roster or by `extra_taken`.
    pub fn next_free_id(&self, extra_taken: &[i64]) -> i64 {
        let mut id = 1;
        while self.contains(id) || extra_taken.contains(&id) {
            id += 1;
        }
        id
    }

    /// Appends a zone named `Zone {id}`.
    pub fn add(&mut self, id: i64) {
        self.entries.push(ZoneSeed::new(id, default_zone_name(id)));
    }

    /// Sets a zone's name; blank names fall back to `Zone {id}`.
    ///
    /// Returns the stored name, or `None` when the id is not listed.
    pub fn rename(&mut self, id: i64, name: &str) -> Option<String> {
        let trimmed = name.trim();
        let stored = if trimmed.is_empty() {
            default_zone_name(id)
        } else {
            trimmed.to_string()
        };
        let entry = self.entries.iter_mut().find(|z| z.id == id)?;
        entry.name = Some(stored.clone());
        Some(stored)
    }

    /// Updates the name if it differs. Returns `true` when something changed.
    pub fn relabel(&mut self, id: i64, name: &str) -> bool {
        match self.entries.iter_mut().find(|z| z.id == id) {
            Some(entry) if entry.name.as_deref() != Some(name) => {
                entry.name = Some(name.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|z| z.id != id);
        self.entries.len() != before
    }

    /// Keeps `current` if still listed, otherwise falls back to the first zone.
    pub fn resolve_selection(&self, current: Option<i64>) -> Option<i64> {
        match current {
            Some(id) if self.contains(id) => Some(id),
            _ => self.first_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> ZoneRoster {
        ZoneRoster::new(vec![
            ZoneSeed::new(1, "Desk"),
            ZoneSeed { id: 3, name: None },
            ZoneSeed::new(4, "   "),
        ])
    }

    #[test]
    fn test_labels() {
        let r = roster();
        assert_eq!(r.label(1), "Desk");
        assert_eq!(r.label(3), "Zone 3");
        assert_eq!(r.label(4), "Zone 4");
        assert_eq!(r.label(9), "Zone 9");
    }

    #[test]
    fn test_next_free_id() {
        let r = roster();
        assert_eq!(r.next_free_id(&[]), 2);
        assert_eq!(r.next_free_id(&[2]), 5);
        assert_eq!(ZoneRoster::default().next_free_id(&[]), 1);
    }

    #[test]
    fn test_rename_blank_falls_back() {
        let mut r = roster();
        assert_eq!(r.rename(1, "  Sofa "), Some("Sofa".to_string()));
        assert_eq!(r.rename(1, ""), Some("Zone 1".to_string()));
        assert_eq!(r.rename(7, "Nope"), None);
    }

    #[test]
    fn test_selection_resolution() {
        let r = roster();
        assert_eq!(r.resolve_selection(Some(3)), Some(3));
        assert_eq!(r.resolve_selection(Some(2)), Some(1));
        assert_eq!(r.resolve_selection(None), Some(1));
        assert_eq!(ZoneRoster::default().resolve_selection(Some(1)), None);
    }

    #[test]
    fn test_discovered_roster_sorted() {
        let r = ZoneRoster::from_discovered(vec![3, 1, 3, 2]);
        assert_eq!(r.ids(), vec![1, 2, 3]);
        assert_eq!(r.label(2), "Zone 2");
    }

    #[test]
    fn test_relabel_reports_change() {
        let mut r = roster();
        assert!(!r.relabel(1, "Desk"));
        assert!(r.relabel(1, "Bed"));
        assert!(!r.relabel(8, "Ghost"));
        assert!(r.remove(1));
        assert!(!r.remove(1));
    }
}
