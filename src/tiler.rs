//! Stripe tiler (C3): tiles one axis-aligned rectangle with panels running in
//! a chosen orientation, consuming and creating leftovers as it goes.

use crate::constants::GeometryConstants;
use crate::generator::Panel;
use crate::inventory::LeftoverInventory;
use crate::types::{LengthMode, Orientation, PanelSpec, Rect, RoomId, ZoneId};

/// Tile `rect` with panels in `orientation`. `next_panel_id` is read and
/// incremented for every emitted panel; `id_prefix` is `"CP"` for ceiling
/// panels or `"FP"` for floor panels.
#[allow(clippy::too_many_arguments)]
pub fn tile(
    rect: &Rect,
    orientation: Orientation,
    spec: &PanelSpec,
    inventory: &mut LeftoverInventory,
    next_panel_id: &mut u64,
    id_prefix: &str,
    room_id: Option<&RoomId>,
    zone_id: Option<&ZoneId>,
) -> Vec<Panel> {
    let eps = GeometryConstants::COORDINATE_EPSILON;

    // `d` is the stripe (length) axis, `c` the cross (width) axis.
    let (region_min_d, region_max_d, region_min_c, region_max_c) = match orientation {
        Orientation::Horizontal => (rect.min_x, rect.max_x, rect.min_y, rect.max_y),
        Orientation::Vertical => (rect.min_y, rect.max_y, rect.min_x, rect.max_x),
    };

    let stripe_len = match spec.length_mode {
        LengthMode::Auto => region_max_d - region_min_d,
        LengthMode::Custom(l) => l,
    };
    let stripe_w = spec.max_width;

    let mut panels = Vec::new();
    let mut current_d = region_min_d;
    while current_d < region_max_d - eps {
        let along_extent = stripe_len.min(region_max_d - current_d);

        let mut current_c = region_min_c;
        while current_c < region_max_c - eps {
            let cross_extent = stripe_w.min(region_max_c - current_c);

            if along_extent > eps && cross_extent > eps {
                let panel = emit_panel(
                    orientation,
                    current_d,
                    current_c,
                    along_extent,
                    cross_extent,
                    spec,
                    inventory,
                    next_panel_id,
                    id_prefix,
                    room_id,
                    zone_id,
                );
                panels.push(panel);
            }

            current_c += cross_extent;
        }
        current_d += stripe_len;
    }

    panels
}

#[allow(clippy::too_many_arguments)]
fn emit_panel(
    orientation: Orientation,
    current_d: f64,
    current_c: f64,
    along_extent: f64,
    cross_extent: f64,
    spec: &PanelSpec,
    inventory: &mut LeftoverInventory,
    next_panel_id: &mut u64,
    id_prefix: &str,
    room_id: Option<&RoomId>,
    zone_id: Option<&ZoneId>,
) -> Panel {
    let eps = GeometryConstants::COORDINATE_EPSILON;
    let width_is_cut = cross_extent + eps < spec.max_width;
    let along_is_cut = match spec.length_mode {
        LengthMode::Auto => false,
        LengthMode::Custom(l) => along_extent + eps < l,
    };

    let mut is_cut = width_is_cut || along_is_cut;
    let mut from_leftover = false;
    let mut cut_notes = String::new();

    if width_is_cut {
        if let Some(leftover) = inventory.find_compatible(cross_extent, along_extent, spec.thickness) {
            let id = leftover.id.clone();
            inventory.consume(&id, cross_extent);
            from_leftover = true;
            cut_notes = format!("From leftover {id}");
        } else {
            cut_notes = "Cut from full panel".to_string();
            let leftover_width = spec.max_width - cross_extent;
            if leftover_width > eps {
                inventory.add(along_extent, spec.thickness, leftover_width);
            }
        }
        is_cut = true;
    }

    if along_is_cut {
        if cut_notes.is_empty() {
            cut_notes = "Boundary extension".to_string();
        } else {
            cut_notes.push_str(", Boundary extension");
        }
    }

    let rect = match orientation {
        Orientation::Horizontal => Rect::new(
            current_d,
            current_c,
            current_d + along_extent,
            current_c + cross_extent,
        ),
        Orientation::Vertical => Rect::new(
            current_c,
            current_d,
            current_c + cross_extent,
            current_d + along_extent,
        ),
    };

    let panel_id = format!("{id_prefix}_{:03}", *next_panel_id);
    *next_panel_id += 1;

    Panel {
        panel_id,
        rect,
        width: cross_extent,
        length: along_extent,
        is_cut,
        cut_notes,
        from_leftover,
        room_id: room_id.cloned(),
        zone_id: zone_id.cloned(),
    }
}
