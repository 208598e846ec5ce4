//! Collaborator-store boundary: the planner calls into room/plan persistence
//! only through [`RoomStore`]. REST endpoints, the room editor, and the
//! actual database live outside this crate; [`InMemoryRoomStore`] is a
//! complete implementation useful to any embedder without a real one handy.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::generator::Panel;
use crate::types::{PlanRecord, ProjectId, Room, RoomId};
use crate::Result;

/// Either a single room or a merged zone, the two things panels and plans
/// can be attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Room(RoomId),
    Zone(String),
}

/// The minimal persistence boundary the planner needs.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn list_rooms(&self, project_id: &ProjectId) -> Result<Vec<Room>>;
    async fn replace_panels(&self, target: &Target, panels: Vec<Panel>) -> Result<()>;
    async fn upsert_plan(&self, target: &Target, plan: PlanRecord) -> Result<()>;
}

/// An in-memory `RoomStore`, seeded directly or used as a scratch target in
/// tests and examples.
#[derive(Default)]
pub struct InMemoryRoomStore {
    rooms: Mutex<HashMap<ProjectId, Vec<Room>>>,
    panels: Mutex<HashMap<Target, Vec<Panel>>>,
    plans: Mutex<HashMap<Target, PlanRecord>>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project's room set (there's no "create room" API surface here
    /// on purpose - room editing is the collaborator's job, not the core's).
    pub fn seed_rooms(&self, project_id: impl Into<ProjectId>, rooms: Vec<Room>) {
        self.rooms
            .lock()
            .expect("room store mutex poisoned")
            .insert(project_id.into(), rooms);
    }

    pub fn panels_for(&self, target: &Target) -> Vec<Panel> {
        self.panels
            .lock()
            .expect("room store mutex poisoned")
            .get(target)
            .cloned()
            .unwrap_or_default()
    }

    pub fn plan_for(&self, target: &Target) -> Option<PlanRecord> {
        self.plans
            .lock()
            .expect("room store mutex poisoned")
            .get(target)
            .cloned()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn list_rooms(&self, project_id: &ProjectId) -> Result<Vec<Room>> {
        Ok(self
            .rooms
            .lock()
            .expect("room store mutex poisoned")
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_panels(&self, target: &Target, panels: Vec<Panel>) -> Result<()> {
        self.panels
            .lock()
            .map_err(|_| AppError::storage_failure("room store mutex poisoned"))?
            .insert(target.clone(), panels);
        Ok(())
    }

    async fn upsert_plan(&self, target: &Target, plan: PlanRecord) -> Result<()> {
        self.plans
            .lock()
            .map_err(|_| AppError::storage_failure("room store mutex poisoned"))?
            .insert(target.clone(), plan);
        Ok(())
    }
}
