//! Shared data model for the panel-layout engine.

use serde::{Deserialize, Serialize};

/// A point in the room coordinate system, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An ordered, implicitly-closed sequence of vertices describing a room outline.
///
/// Must have at least 3 points. Orientation (CW/CCW) is not canonicalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// True if `self` and `other` overlap by more than `tolerance` millimeters
    /// on both axes (used for the non-overlap invariant, not for placement).
    pub fn overlaps(&self, other: &Rect, tolerance: f64) -> bool {
        let x_overlap = self.min_x.max(other.min_x) < self.max_x.min(other.max_x) - tolerance;
        let y_overlap = self.min_y.max(other.min_y) < self.max_y.min(other.max_y) - tolerance;
        x_overlap && y_overlap
    }

    /// True if `p` lies within `self`, inclusive of the boundary.
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Which rooms a floor plan is eligible to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloorType {
    Panel,
    Other,
}

/// Identifier newtypes. Kept as plain strings because the collaborator store
/// owns identity assignment; the core never mints one.
pub type RoomId = String;
pub type ProjectId = String;
pub type ZoneId = String;

/// A room polygon plus the metadata the core needs; everything else about a
/// room (walls, doors, intersections) lives in the collaborator store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub polygon: Polygon,
    pub height: Option<f64>,
    pub floor_type: FloorType,
    pub ceiling_thickness: Option<f64>,
    pub floor_thickness: Option<f64>,
}

/// Stripe direction. Horizontal runs along +x, Vertical runs along +y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// How the stripe length along the stripe direction is determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LengthMode {
    /// Stripe length equals the region's extent along the stripe direction.
    Auto,
    /// Stripe length is capped at the given value, in millimeters.
    Custom(f64),
}

/// Parameters governing how one region is tiled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub max_width: f64,
    pub length_mode: LengthMode,
    pub thickness: f64,
}

impl PanelSpec {
    pub fn new(max_width: f64, length_mode: LengthMode, thickness: f64) -> Self {
        Self {
            max_width,
            length_mode,
            thickness,
        }
    }
}

/// Which kind of plan is being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanKind {
    Ceiling,
    Floor,
}

/// The requested orientation-selection strategy for a generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrientationStrategy {
    /// Use the strategy evaluator's recommendation.
    Auto,
    AllHorizontal,
    AllVertical,
    /// Each room independently picks whichever of H/V has less waste. Ceiling only.
    RoomOptimal,
    /// Merge same-height rooms into one continuous ceiling plan, when admissible.
    ProjectMerged,
}

/// Generation parameters persisted with a plan so regeneration can reproduce
/// or deliberately vary the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRecord {
    pub thickness: f64,
    pub orientation_strategy: OrientationStrategy,
    pub panel_width: f64,
    pub panel_length: LengthMode,
    pub support_type: String,
    pub support_config: serde_json::Value,
}

/// A persisted ceiling plan for one room or zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CeilingPlan {
    pub room_id: Option<RoomId>,
    pub zone_id: Option<ZoneId>,
    pub record: PlanRecord,
}

/// A persisted floor plan for one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorPlan {
    pub room_id: RoomId,
    pub record: PlanRecord,
}

/// A set of same-height rooms sharing one continuous ceiling plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub room_ids: Vec<RoomId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_area_and_center() {
        let r = Rect::new(0.0, 0.0, 5000.0, 3000.0);
        assert_eq!(r.area(), 15_000_000.0);
        let c = r.center();
        assert_eq!(c.x, 2500.0);
        assert_eq!(c.y, 1500.0);
    }

    #[test]
    fn polygon_validity() {
        let triangle = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ]);
        assert!(triangle.is_valid());

        let degenerate = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert!(!degenerate.is_valid());
    }
}
