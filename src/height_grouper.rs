//! Height grouper (C8): groups rooms by ceiling height and recommends a
//! project-wide ceiling strategy from each group's mergeability.

use std::collections::BTreeMap;

use crate::constants::GeometryConstants;
use crate::geometry::{bbox, merged_bbox, perimeter, polygon_area, polygons_close};
use crate::types::{Rect, Room, RoomId};
use crate::Result;

/// One set of rooms sharing the same (rounded) ceiling height.
#[derive(Debug, Clone)]
pub struct HeightGroup {
    pub height: f64,
    pub room_ids: Vec<RoomId>,
    pub total_area: f64,
    pub bounding_box: Rect,
    pub area_efficiency: f64,
    pub shape_complexity: f64,
    pub can_merge: bool,
}

/// Project-wide recommendation for how to plan ceilings across height groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendedStrategy {
    /// One height group, and it's mergeable into a single continuous plan.
    UnifiedMerged,
    /// One height group, but merging isn't admissible; plan each room alone.
    UnifiedSeparate,
    /// Multiple height groups, at least one of which is mergeable.
    HeightGroupedWithMerging,
    /// Multiple height groups, none mergeable.
    HeightGroupedSeparate,
}

/// Full height-grouping analysis for a project's rooms.
#[derive(Debug, Clone)]
pub struct HeightAnalysis {
    pub groups: Vec<HeightGroup>,
    pub all_same_height: bool,
    pub recommended_strategy: RecommendedStrategy,
}

/// Groups `rooms` by height (each room's own height, or `default_height` if
/// unset), rounding to the nearest millimeter so floating-point jitter
/// doesn't split what's meant to be one height level into several groups.
/// Groups are returned in ascending height order for deterministic output.
pub fn analyze_heights(rooms: &[Room], default_height: f64) -> Result<HeightAnalysis> {
    let mut buckets: BTreeMap<i64, Vec<&Room>> = BTreeMap::new();
    for room in rooms {
        let height = room.height.unwrap_or(default_height);
        let key = height.round() as i64;
        buckets.entry(key).or_default().push(room);
    }

    let mut groups = Vec::with_capacity(buckets.len());
    for (key, members) in &buckets {
        groups.push(build_group(*key as f64, members)?);
    }

    let all_same_height = groups.len() == 1;
    let recommended_strategy = recommend_strategy(&groups);

    Ok(HeightAnalysis {
        groups,
        all_same_height,
        recommended_strategy,
    })
}

fn build_group(height: f64, members: &[&Room]) -> Result<HeightGroup> {
    let polys: Vec<_> = members.iter().map(|r| &r.polygon).collect();
    let bounding_box = merged_bbox(&polys)?;

    let mut total_area = 0.0;
    let mut total_perimeter = 0.0;
    for room in members {
        total_area += polygon_area(&room.polygon).unwrap_or(0.0);
        total_perimeter += perimeter(&room.polygon);
    }

    let bounding_area = bounding_box.area();
    let area_efficiency = if bounding_area > 0.0 {
        total_area / bounding_area
    } else {
        0.0
    };
    let shape_complexity = if total_area > 0.0 {
        total_perimeter / total_area
    } else {
        0.0
    };
    let can_merge = members.len() > 1
        && area_efficiency >= GeometryConstants::MERGE_AREA_EFFICIENCY_THRESHOLD
        && any_pair_connected(members)?;

    Ok(HeightGroup {
        height,
        room_ids: members.iter().map(|r| r.id.clone()).collect(),
        total_area,
        bounding_box,
        area_efficiency,
        shape_complexity,
        can_merge,
    })
}

/// True if at least one pair of rooms in the group shares a vertex within
/// [`GeometryConstants::VERTEX_PROXIMITY_TOLERANCE_MM`] or has bbox centers
/// within [`GeometryConstants::CENTER_PROXIMITY_TOLERANCE_MM`]. A single
/// room (or a group with no connected pair at all) can't be merged even if
/// its area efficiency happens to clear the threshold.
fn any_pair_connected(members: &[&Room]) -> Result<bool> {
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            let a = &members[i].polygon;
            let b = &members[j].polygon;
            if polygons_close(a, b, GeometryConstants::VERTEX_PROXIMITY_TOLERANCE_MM) {
                return Ok(true);
            }
            let center_a = bbox(a)?.center();
            let center_b = bbox(b)?.center();
            if center_a.distance_to(&center_b) <= GeometryConstants::CENTER_PROXIMITY_TOLERANCE_MM
            {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn recommend_strategy(groups: &[HeightGroup]) -> RecommendedStrategy {
    match groups {
        [] => RecommendedStrategy::UnifiedSeparate,
        [single] => {
            if single.can_merge && single.room_ids.len() > 1 {
                RecommendedStrategy::UnifiedMerged
            } else {
                RecommendedStrategy::UnifiedSeparate
            }
        }
        many => {
            if many.iter().any(|g| g.can_merge) {
                RecommendedStrategy::HeightGroupedWithMerging
            } else {
                RecommendedStrategy::HeightGroupedSeparate
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FloorType, Point, Polygon};

    fn room(id: &str, height: Option<f64>, x_offset: f64, w: f64, h: f64) -> Room {
        Room {
            id: id.to_string(),
            polygon: Polygon::new(vec![
                Point::new(x_offset, 0.0),
                Point::new(x_offset + w, 0.0),
                Point::new(x_offset + w, h),
                Point::new(x_offset, h),
            ]),
            height,
            floor_type: FloorType::Panel,
            ceiling_thickness: None,
            floor_thickness: None,
        }
    }

    #[test]
    fn single_room_is_unified_separate() {
        let rooms = vec![room("r1", Some(2700.0), 0.0, 5000.0, 3000.0)];
        let analysis = analyze_heights(&rooms, 2700.0).unwrap();
        assert_eq!(analysis.groups.len(), 1);
        assert!(analysis.all_same_height);
        assert_eq!(
            analysis.recommended_strategy,
            RecommendedStrategy::UnifiedSeparate
        );
    }

    #[test]
    fn two_adjacent_rooms_at_same_height_are_mergeable() {
        // Two rooms placed edge-to-edge with no gap: combined bbox area
        // equals the sum of their individual areas, area_efficiency = 1.0.
        let rooms = vec![
            room("r1", Some(2700.0), 0.0, 3000.0, 3000.0),
            room("r2", Some(2700.0), 3000.0, 3000.0, 3000.0),
        ];
        let analysis = analyze_heights(&rooms, 2700.0).unwrap();
        assert_eq!(analysis.groups.len(), 1);
        assert!(analysis.groups[0].can_merge);
        assert_eq!(
            analysis.recommended_strategy,
            RecommendedStrategy::UnifiedMerged
        );
    }

    #[test]
    fn rooms_at_different_heights_form_separate_groups() {
        let rooms = vec![
            room("r1", Some(2700.0), 0.0, 3000.0, 3000.0),
            room("r2", Some(3200.0), 5000.0, 3000.0, 3000.0),
        ];
        let analysis = analyze_heights(&rooms, 2700.0).unwrap();
        assert_eq!(analysis.groups.len(), 2);
        assert!(!analysis.all_same_height);
        assert_eq!(
            analysis.recommended_strategy,
            RecommendedStrategy::HeightGroupedSeparate
        );
    }

    #[test]
    fn rooms_with_no_height_fall_back_to_default() {
        let rooms = vec![
            room("r1", None, 0.0, 3000.0, 3000.0),
            room("r2", None, 3000.0, 3000.0, 3000.0),
        ];
        let analysis = analyze_heights(&rooms, 2700.0).unwrap();
        assert_eq!(analysis.groups.len(), 1);
        assert_eq!(analysis.groups[0].height, 2700.0);
    }

    #[test]
    fn rooms_at_exactly_the_merge_threshold_are_mergeable() {
        // Two 105x1000 rooms with a 90mm gap (within the 100mm vertex
        // tolerance, so they count as connected): combined area 210,000 /
        // bbox area 300,000 = exactly 0.7, the merge threshold itself.
        let rooms = vec![
            room("r1", Some(2700.0), 0.0, 105.0, 1000.0),
            room("r2", Some(2700.0), 195.0, 105.0, 1000.0),
        ];
        let analysis = analyze_heights(&rooms, 2700.0).unwrap();
        assert_eq!(analysis.groups.len(), 1);
        assert!((analysis.groups[0].area_efficiency - 0.7).abs() < 1e-9);
        assert!(analysis.groups[0].can_merge);
        assert_eq!(
            analysis.recommended_strategy,
            RecommendedStrategy::UnifiedMerged
        );
    }

    #[test]
    fn far_apart_rooms_at_same_height_are_not_mergeable() {
        // A large gap between the two rooms drags area_efficiency below the
        // 0.7 threshold even though both are at the same height.
        let rooms = vec![
            room("r1", Some(2700.0), 0.0, 1000.0, 1000.0),
            room("r2", Some(2700.0), 9000.0, 1000.0, 1000.0),
        ];
        let analysis = analyze_heights(&rooms, 2700.0).unwrap();
        assert_eq!(analysis.groups.len(), 1);
        assert!(!analysis.groups[0].can_merge);
        assert_eq!(
            analysis.recommended_strategy,
            RecommendedStrategy::UnifiedSeparate
        );
    }
}
