//! Panel generator (C5): glues the decomposer, tiler, and leftover inventory
//! together for one room under one orientation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decomposer::decompose;
use crate::geometry::{bbox, polygon_area};
use crate::inventory::LeftoverInventory;
use crate::tiler::tile;
use crate::types::{Orientation, PanelSpec, Polygon, Rect, RoomId, ZoneId};
use crate::Result;

/// One emitted panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub panel_id: String,
    pub rect: Rect,
    pub width: f64,
    pub length: f64,
    pub is_cut: bool,
    pub cut_notes: String,
    pub from_leftover: bool,
    pub room_id: Option<RoomId>,
    pub zone_id: Option<ZoneId>,
}

impl Panel {
    pub fn area(&self) -> f64 {
        self.width * self.length
    }
}

/// Per-room (or per-zone) summary returned alongside its panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub panel_count: usize,
    pub cut_panel_count: usize,
    pub from_leftover_count: usize,
    pub total_panel_area: f64,
    pub room_area: f64,
    /// New leftover area this room's own cuts added to the inventory (the
    /// inventory's `total_leftover_area` delta across this call). Reusing an
    /// existing leftover reduces the inventory total rather than growing it,
    /// so this is never inflated by cross-room reuse; it's the waste figure
    /// `waste_percentage = leftover_area_created / room_area × 100` needs.
    pub leftover_area_created: f64,
}

/// Generate panels for one room (or merged region) under one orientation.
///
/// If decomposition fails (e.g. `DecompositionDiverged` past the fallback, or
/// a genuinely degenerate polygon), the region's bbox is used as a single
/// cell rather than failing the whole room, per the source's tolerant
/// behavior for malformed geometry.
#[allow(clippy::too_many_arguments)]
pub fn generate_for_region(
    polygon: &Polygon,
    orientation: Orientation,
    spec: &PanelSpec,
    inventory: &mut LeftoverInventory,
    next_panel_id: &mut u64,
    id_prefix: &str,
    room_id: Option<&RoomId>,
    zone_id: Option<&ZoneId>,
) -> Result<(Vec<Panel>, RoomSummary)> {
    let room_area = polygon_area(polygon).unwrap_or(0.0);

    let rects = match decompose(polygon) {
        Ok(rects) => rects,
        Err(err) => {
            debug!(error = %err, "decomposition failed, falling back to bbox");
            vec![bbox(polygon)?]
        }
    };

    let leftover_area_before = inventory.stats().total_leftover_area;

    let mut panels = Vec::new();
    for rect in &rects {
        let mut region_panels = tile(
            rect,
            orientation,
            spec,
            inventory,
            next_panel_id,
            id_prefix,
            room_id,
            zone_id,
        );
        panels.append(&mut region_panels);
    }

    let leftover_area_created =
        (inventory.stats().total_leftover_area - leftover_area_before).max(0.0);

    let summary = RoomSummary {
        panel_count: panels.len(),
        cut_panel_count: panels.iter().filter(|p| p.is_cut).count(),
        from_leftover_count: panels.iter().filter(|p| p.from_leftover).count(),
        total_panel_area: panels.iter().map(Panel::area).sum(),
        room_area,
        leftover_area_created,
    };

    Ok((panels, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LengthMode, Point};

    #[test]
    fn rectangular_room_generates_full_coverage() {
        let polygon = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(5000.0, 0.0),
            Point::new(5000.0, 3000.0),
            Point::new(0.0, 3000.0),
        ]);
        let spec = PanelSpec::new(1150.0, LengthMode::Auto, 20.0);
        let mut inventory = LeftoverInventory::new();
        let mut next_id = 1u64;

        let (panels, summary) = generate_for_region(
            &polygon,
            Orientation::Vertical,
            &spec,
            &mut inventory,
            &mut next_id,
            "CP",
            Some(&"room-1".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(panels.len(), 5);
        assert_eq!(summary.panel_count, 5);
        assert_eq!(summary.cut_panel_count, 1);
        assert_eq!(summary.from_leftover_count, 0);
        assert_eq!(summary.room_area, 15_000_000.0);
        // One leftover {length: 3000, width_remaining: 750} created (S1).
        assert_eq!(summary.leftover_area_created, 3000.0 * 750.0);
        for p in &panels {
            assert_eq!(p.room_id.as_deref(), Some("room-1"));
        }
    }

    #[test]
    fn l_shaped_room_tiles_every_cell() {
        let polygon = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2000.0, 0.0),
            Point::new(2000.0, 1000.0),
            Point::new(1000.0, 1000.0),
            Point::new(1000.0, 2000.0),
            Point::new(0.0, 2000.0),
        ]);
        let spec = PanelSpec::new(1150.0, LengthMode::Auto, 20.0);
        let mut inventory = LeftoverInventory::new();
        let mut next_id = 1u64;

        let (panels, summary) = generate_for_region(
            &polygon,
            Orientation::Horizontal,
            &spec,
            &mut inventory,
            &mut next_id,
            "CP",
            None,
            None,
        )
        .unwrap();

        assert!(!panels.is_empty());
        assert_eq!(summary.room_area, 3_000_000.0);
        let total_panel_area: f64 = panels.iter().map(Panel::area).sum();
        assert!(total_panel_area >= summary.room_area - 1e-6);
    }
}
