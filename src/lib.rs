//! Panel-layout and leftover-reuse engine for ceiling/floor panel planning.
//!
//! Given a set of rooms described by polygonal outlines, this crate computes
//! a deterministic, collision-free set of axis-aligned rectangular panels
//! that tile each room's interior, chooses an orientation strategy, tracks
//! every cut against a stock panel, reuses leftovers across rooms, and
//! reports coverage/waste/reuse statistics. REST endpoints, a room editor,
//! and persistence of rooms/plans are external collaborators, represented
//! here only through the [`store::RoomStore`] trait boundary.

pub mod constants;
pub mod errors;
pub mod types;
pub mod geometry;
pub mod decomposer;
pub mod inventory;
pub mod tiler;
pub mod generator;
pub mod height_grouper;
pub mod strategy;
pub mod store;
pub mod planner;

pub use errors::AppError;
pub use types::{
    CeilingPlan, FloorPlan, FloorType, LengthMode, Orientation, OrientationStrategy, PanelSpec,
    PlanKind, PlanRecord, Point, Polygon, ProjectId, Rect, Room, RoomId, Zone, ZoneId,
};
pub use inventory::{Leftover, LeftoverInventory, LeftoverStats};
pub use generator::Panel;
pub use planner::{GenerationParams, GenerationReport, PanelPlanner, PlanningConfig};
pub use store::{InMemoryRoomStore, RoomStore};
pub use strategy::StrategyResult;
pub use height_grouper::{HeightAnalysis, RecommendedStrategy};

/// Result type returned by every public operation in this crate.
pub type Result<T> = std::result::Result<T, AppError>;
