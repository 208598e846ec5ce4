//! Leftover inventory (C4): tracks offcuts produced by stripe tiling and
//! offers them back to later cuts before a fresh stock panel is used.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::GeometryConstants;

/// An offcut left over from a stripe cut: a full-length (or longer) strip
/// whose width is narrower than a fresh stock panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leftover {
    pub id: String,
    pub length: f64,
    pub thickness: f64,
    pub width_remaining: f64,
    pub created_at: DateTime<Utc>,
}

/// Running counters describing how an inventory has been used over a
/// generation pass. Surfaced in [`crate::planner::GenerationReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeftoverStats {
    pub created: usize,
    pub reused: usize,
    pub full_panels_saved: usize,
    pub total_leftover_area: f64,
}

/// First-fit leftover inventory. Leftovers are offered in creation order;
/// the first one that fits a request is used, whether or not a narrower
/// leftover elsewhere would waste less width.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeftoverInventory {
    leftovers: Vec<Leftover>,
    stats: LeftoverStats,
    next_id: u64,
}

impl LeftoverInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> LeftoverStats {
        self.stats
    }

    pub fn leftovers(&self) -> &[Leftover] {
        &self.leftovers
    }

    /// First leftover matching `thickness` exactly, with at least
    /// `needed_length` of length and `needed_width` of remaining width.
    pub fn find_compatible(
        &self,
        needed_width: f64,
        needed_length: f64,
        thickness: f64,
    ) -> Option<&Leftover> {
        let eps = GeometryConstants::COORDINATE_EPSILON;
        self.leftovers.iter().find(|l| {
            (l.thickness - thickness).abs() < eps
                && l.length + eps >= needed_length
                && l.width_remaining + eps >= needed_width
        })
    }

    /// Consume `width_used` of width from the leftover identified by
    /// `leftover_id`. Removes it once its remaining width drops to (near)
    /// zero, mirroring the source tracker's in-place `use_leftover` update:
    /// a partially-used leftover stays in inventory at its reduced width
    /// rather than being split into a second offcut record.
    pub fn consume(&mut self, leftover_id: &str, width_used: f64) {
        let eps = GeometryConstants::COORDINATE_EPSILON;
        if let Some(pos) = self.leftovers.iter().position(|l| l.id == leftover_id) {
            self.leftovers[pos].width_remaining -= width_used;
            self.stats.reused += 1;
            self.stats.full_panels_saved += 1;
            if self.leftovers[pos].width_remaining <= eps {
                self.leftovers.remove(pos);
            }
        }
    }

    /// Record a new offcut. Ignored if the remaining width is at or below
    /// the epsilon tolerance (nothing usable was left).
    pub fn add(&mut self, length: f64, thickness: f64, width_remaining: f64) -> Option<&Leftover> {
        if width_remaining <= GeometryConstants::COORDINATE_EPSILON {
            return None;
        }
        let id = format!("LO_{:04}", self.next_id);
        self.next_id += 1;
        self.stats.created += 1;
        self.stats.total_leftover_area += length * width_remaining;
        self.leftovers.push(Leftover {
            id,
            length,
            thickness,
            width_remaining,
            created_at: now(),
        });
        self.leftovers.last()
    }
}

/// `chrono::Utc::now()` wrapped so call sites read the same as the rest of
/// the inventory API; kept as a free function in case a deterministic clock
/// needs to be threaded through for replay/testing later.
fn now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inventory_finds_nothing() {
        let inv = LeftoverInventory::new();
        assert!(inv.find_compatible(500.0, 2000.0, 20.0).is_none());
    }

    #[test]
    fn add_then_find_compatible_leftover() {
        let mut inv = LeftoverInventory::new();
        inv.add(2400.0, 20.0, 400.0);
        assert_eq!(inv.stats().created, 1);

        let found = inv.find_compatible(350.0, 2000.0, 20.0);
        assert!(found.is_some());
        assert_eq!(found.unwrap().width_remaining, 400.0);

        // Wrong thickness never matches.
        assert!(inv.find_compatible(350.0, 2000.0, 18.0).is_none());
        // Needs more length than available.
        assert!(inv.find_compatible(350.0, 3000.0, 20.0).is_none());
        // Needs more width than available.
        assert!(inv.find_compatible(450.0, 2000.0, 20.0).is_none());
    }

    #[test]
    fn consume_partial_keeps_leftover_reduced() {
        let mut inv = LeftoverInventory::new();
        inv.add(2400.0, 20.0, 400.0);
        let id = inv.leftovers()[0].id.clone();

        inv.consume(&id, 150.0);

        assert_eq!(inv.leftovers().len(), 1);
        assert_eq!(inv.leftovers()[0].width_remaining, 250.0);
        assert_eq!(inv.stats().reused, 1);
        assert_eq!(inv.stats().full_panels_saved, 1);
    }

    #[test]
    fn consume_full_removes_leftover() {
        let mut inv = LeftoverInventory::new();
        inv.add(2400.0, 20.0, 400.0);
        let id = inv.leftovers()[0].id.clone();

        inv.consume(&id, 400.0);

        assert!(inv.leftovers().is_empty());
        assert_eq!(inv.stats().reused, 1);
    }

    #[test]
    fn first_fit_prefers_earliest_match_over_tighter_fit() {
        // Mirrors the source tracker: first compatible leftover wins, even
        // if a later, narrower one would waste less width.
        let mut inv = LeftoverInventory::new();
        inv.add(2400.0, 20.0, 600.0);
        inv.add(2400.0, 20.0, 350.0);

        let found = inv.find_compatible(300.0, 2000.0, 20.0).unwrap();
        assert_eq!(found.width_remaining, 600.0);
    }

    #[test]
    fn zero_width_leftover_is_not_recorded() {
        let mut inv = LeftoverInventory::new();
        assert!(inv.add(2400.0, 20.0, 0.0).is_none());
        assert_eq!(inv.stats().created, 0);
        assert!(inv.leftovers().is_empty());
    }
}
