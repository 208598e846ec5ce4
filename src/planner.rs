//! Project planner (C7): orchestrates per-room generation, aggregates
//! project-wide statistics, and persists plans through a [`RoomStore`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex as TokioMutex};
use tracing::{info, warn};

use crate::constants::PanelConstants;
use crate::errors::AppError;
use crate::geometry::polygon_area;
use crate::height_grouper::{analyze_heights as analyze_room_heights, HeightAnalysis, RecommendedStrategy};
use crate::store::{RoomStore, Target};
use crate::strategy::{
    evaluate_candidates_with_threads, pick_best, run_project_merged, run_uniform, StrategyResult,
};
use crate::types::{
    FloorType, LengthMode, Orientation, OrientationStrategy, PanelSpec, PlanKind, PlanRecord,
    ProjectId, Room, RoomId,
};
use crate::Result;

/// Knobs governing defaults and parallel fan-out for a [`PanelPlanner`].
///
/// Mirrors this crate's own `OptimizationConfig` lineage: one struct holding
/// every default a generation pass can fall back on, with a `Default` impl
/// that reproduces the documented defaults exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanningConfig {
    pub max_stock_width: f64,
    pub default_ceiling_thickness: f64,
    pub default_panel_thickness: f64,
    pub default_floor_panel_thickness: f64,
    pub panel_length_mode: LengthMode,
    pub max_threads: Option<usize>,
    /// Ceiling height assumed for a room that declares none. Not part of the
    /// distilled default list, but `analyze_heights` needs a fallback and the
    /// original source falls back to the project's own declared height; since
    /// this crate has no project entity, it's a planner-level default instead.
    pub default_room_height: f64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            max_stock_width: PanelConstants::MAX_STOCK_WIDTH,
            default_ceiling_thickness: PanelConstants::DEFAULT_CEILING_THICKNESS,
            default_panel_thickness: PanelConstants::DEFAULT_PANEL_THICKNESS,
            default_floor_panel_thickness: PanelConstants::DEFAULT_FLOOR_PANEL_THICKNESS,
            panel_length_mode: LengthMode::Auto,
            max_threads: None,
            default_room_height: PanelConstants::DEFAULT_CEILING_THICKNESS,
        }
    }
}

/// Parameters for one generation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationParams {
    pub orientation_strategy: OrientationStrategy,
    pub panel_width: Option<f64>,
    pub panel_length: Option<LengthMode>,
    pub thickness_override: Option<f64>,
    pub room_specific_overrides: Option<HashMap<RoomId, Orientation>>,
}

impl Default for OrientationStrategy {
    fn default() -> Self {
        OrientationStrategy::Auto
    }
}

/// Per-room statistics from one generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomReport {
    pub room_id: RoomId,
    pub total_panels: usize,
    pub full_panels: usize,
    pub cut_panels: usize,
    pub waste_percentage: f64,
    pub orientation: Orientation,
}

/// The outcome of one `generate_ceiling`/`generate_floor` pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    pub project_id: ProjectId,
    pub room_reports: Vec<RoomReport>,
    pub total_panels: usize,
    pub project_waste_percentage: f64,
    pub recommended_strategy: String,
    pub leftovers_created: usize,
    pub leftovers_reused: usize,
    pub full_panels_saved: usize,
    /// Per-room skip reasons. A non-empty list never means the pass failed —
    /// failed rooms are simply absent from `room_reports`.
    pub warnings: Vec<String>,
}

/// Orchestrates room generation for one project against a [`RoomStore`].
///
/// Enforces one in-flight pass per project: a second caller generating for a
/// project already mid-pass gets `ConcurrentGeneration` immediately rather
/// than queuing behind the first.
pub struct PanelPlanner<S: RoomStore> {
    store: Arc<S>,
    config: PlanningConfig,
    in_flight: StdMutex<HashMap<ProjectId, Arc<TokioMutex<()>>>>,
}

impl<S: RoomStore> PanelPlanner<S> {
    pub fn new(store: Arc<S>, config: PlanningConfig) -> Self {
        Self {
            store,
            config,
            in_flight: StdMutex::new(HashMap::new()),
        }
    }

    /// Height-group analysis for a project's rooms (no persistence).
    pub async fn analyze_heights(&self, project_id: &ProjectId) -> Result<HeightAnalysis> {
        let rooms = self.eligible_rooms(project_id, None).await?;
        analyze_room_heights(&rooms, self.config.default_room_height)
    }

    /// Runs every admissible candidate strategy for a project's rooms and
    /// returns them all, ranked by nothing in particular - callers compare
    /// with [`crate::strategy::pick_best`] themselves. No persistence.
    pub async fn analyze_orientations(
        &self,
        project_id: &ProjectId,
        spec: &PanelSpec,
    ) -> Result<Vec<StrategyResult>> {
        let rooms = self.eligible_rooms(project_id, None).await?;
        let heights = analyze_room_heights(&rooms, self.config.default_room_height)?;
        let merge_zone = merge_admissible_zone(project_id, &heights);
        evaluate_candidates_with_threads(&rooms, spec, true, merge_zone.as_deref(), self.config.max_threads)
    }

    /// Generates and persists a ceiling plan.
    pub async fn generate_ceiling(
        &self,
        project_id: &ProjectId,
        params: GenerationParams,
    ) -> Result<GenerationReport> {
        self.generate(project_id, PlanKind::Ceiling, params, None).await
    }

    /// Like [`Self::generate_ceiling`], but checked for cancellation between
    /// rooms via `cancel`. A `true` on the channel aborts the pass before the
    /// next room starts; nothing already persisted is rolled back, matching
    /// the per-room-transaction commit model.
    pub async fn generate_ceiling_cancellable(
        &self,
        project_id: &ProjectId,
        params: GenerationParams,
        cancel: watch::Receiver<bool>,
    ) -> Result<GenerationReport> {
        self.generate(project_id, PlanKind::Ceiling, params, Some(cancel))
            .await
    }

    /// Generates and persists a floor plan. Only rooms whose `floor_type` is
    /// [`FloorType::Panel`] are eligible.
    pub async fn generate_floor(
        &self,
        project_id: &ProjectId,
        params: GenerationParams,
    ) -> Result<GenerationReport> {
        self.generate(project_id, PlanKind::Floor, params, None).await
    }

    pub async fn generate_floor_cancellable(
        &self,
        project_id: &ProjectId,
        params: GenerationParams,
        cancel: watch::Receiver<bool>,
    ) -> Result<GenerationReport> {
        self.generate(project_id, PlanKind::Floor, params, Some(cancel))
            .await
    }

    async fn generate(
        &self,
        project_id: &ProjectId,
        plan_kind: PlanKind,
        params: GenerationParams,
        mut cancel: Option<watch::Receiver<bool>>,
    ) -> Result<GenerationReport> {
        let panel_width = params.panel_width.unwrap_or(self.config.max_stock_width);
        let panel_length = params.panel_length.unwrap_or(self.config.panel_length_mode);
        validate_params(panel_width, panel_length)?;

        let _guard = self.acquire_guard(project_id)?;
        info!(project_id = %project_id, ?plan_kind, "starting generation pass");

        let mut rooms = self.eligible_rooms(project_id, Some(plan_kind)).await?;
        let mut warnings = Vec::new();
        rooms.retain(|room| match polygon_area(&room.polygon) {
            Ok(area) if area > 0.0 => true,
            _ => {
                warnings.push(format!("room {} skipped: degenerate polygon", room.id));
                false
            }
        });

        if rooms.is_empty() {
            return Err(AppError::no_eligible_rooms(project_id.clone()));
        }

        let thickness = params.thickness_override.unwrap_or(match plan_kind {
            PlanKind::Ceiling => self.config.default_panel_thickness,
            PlanKind::Floor => self.config.default_floor_panel_thickness,
        });
        let spec = PanelSpec::new(panel_width, panel_length, thickness);

        let heights = analyze_room_heights(&rooms, self.config.default_room_height)?;

        if let Some(overrides) = params.room_specific_overrides.filter(|o| !o.is_empty()) {
            // Rooms not named in `overrides` still use the requested/resolved
            // global strategy, not a fixed orientation, so resolve it the
            // same way the non-override path does and use its per-room
            // orientations as the fallback for unlisted rooms.
            let resolved = self
                .resolve_strategy(
                    project_id,
                    plan_kind,
                    &rooms,
                    &spec,
                    &heights,
                    params.orientation_strategy,
                )
                .await?;
            let default_orientations = resolved.room_orientations;

            return self
                .generate_with_overrides(
                    project_id,
                    plan_kind,
                    &rooms,
                    &spec,
                    overrides,
                    default_orientations,
                    warnings,
                    cancel,
                )
                .await;
        }

        let chosen = self
            .resolve_strategy(project_id, plan_kind, &rooms, &spec, &heights, params.orientation_strategy)
            .await?;

        if let Some(rx) = cancel.as_mut() {
            if *rx.borrow() {
                return Err(AppError::invalid_params("generation cancelled"));
            }
        }

        self.persist_and_summarize(
            project_id,
            plan_kind,
            &spec,
            chosen,
            heights.recommended_strategy,
            warnings,
        )
        .await
    }

    /// Resolves `Auto` by running every admissible candidate and keeping the
    /// lowest-waste one; an explicit strategy is run directly, with no
    /// evaluation step. `RoomOptimal`/`ProjectMerged` are ceiling-only.
    async fn resolve_strategy(
        &self,
        project_id: &ProjectId,
        plan_kind: PlanKind,
        rooms: &[Room],
        spec: &PanelSpec,
        heights: &HeightAnalysis,
        requested: OrientationStrategy,
    ) -> Result<StrategyResult> {
        let merge_zone = merge_admissible_zone(project_id, heights);

        match requested {
            OrientationStrategy::Auto => {
                let include_room_optimal = plan_kind == PlanKind::Ceiling;
                let merge_zone = if plan_kind == PlanKind::Ceiling {
                    merge_zone
                } else {
                    None
                };
                let candidates = evaluate_candidates_with_threads(
                    rooms,
                    spec,
                    include_room_optimal,
                    merge_zone.as_deref(),
                    self.config.max_threads,
                )?;
                let best = pick_best(&candidates);
                Ok(candidates.into_iter().nth(best).expect("non-empty candidate list"))
            }
            OrientationStrategy::AllHorizontal => {
                run_uniform(rooms, Orientation::Horizontal, spec, "all_horizontal")
            }
            OrientationStrategy::AllVertical => {
                run_uniform(rooms, Orientation::Vertical, spec, "all_vertical")
            }
            OrientationStrategy::RoomOptimal if plan_kind == PlanKind::Ceiling => {
                crate::strategy::run_room_optimal(rooms, spec)
            }
            OrientationStrategy::ProjectMerged if plan_kind == PlanKind::Ceiling => {
                let zone_id = merge_zone.ok_or_else(|| {
                    AppError::invalid_params(
                        "project_merged requested but rooms are not merge-admissible",
                    )
                })?;
                run_project_merged(rooms, Orientation::Vertical, spec, &zone_id)
            }
            other => Err(AppError::invalid_params(format!(
                "{other:?} is not available for floor plans"
            ))),
        }
    }

    /// `room_specific_overrides` path: one pass, one shared inventory, each
    /// listed room forced to its override orientation; unlisted rooms fall
    /// back to whatever the requested/resolved global strategy assigned them.
    #[allow(clippy::too_many_arguments)]
    async fn generate_with_overrides(
        &self,
        project_id: &ProjectId,
        plan_kind: PlanKind,
        rooms: &[Room],
        spec: &PanelSpec,
        overrides: HashMap<RoomId, Orientation>,
        default_orientations: HashMap<RoomId, Orientation>,
        warnings: Vec<String>,
        mut cancel: Option<watch::Receiver<bool>>,
    ) -> Result<GenerationReport> {
        use crate::inventory::LeftoverInventory;
        use crate::generator::generate_for_region;

        let mut inventory = LeftoverInventory::new();
        let mut next_id = 1u64;
        let mut panels = Vec::new();
        let mut room_summaries = HashMap::new();
        let mut room_orientations = HashMap::new();
        let mut total_room_area = 0.0;

        for room in rooms {
            if let Some(rx) = cancel.as_mut() {
                if *rx.borrow() {
                    return Err(AppError::invalid_params("generation cancelled"));
                }
            }
            let orientation = overrides.get(&room.id).copied().unwrap_or_else(|| {
                default_orientations
                    .get(&room.id)
                    .copied()
                    .unwrap_or(Orientation::Horizontal)
            });
            let (mut room_panels, summary) = generate_for_region(
                &room.polygon,
                orientation,
                spec,
                &mut inventory,
                &mut next_id,
                "CP",
                Some(&room.id),
                None,
            )?;
            total_room_area += summary.room_area;
            room_summaries.insert(room.id.clone(), summary);
            room_orientations.insert(room.id.clone(), orientation);
            panels.append(&mut room_panels);
        }

        let stats = inventory.stats();
        let total_leftover_area = stats.total_leftover_area;
        let waste_percentage = if total_room_area > 0.0 {
            total_leftover_area / total_room_area * crate::constants::MathConstants::PERCENTAGE_MULTIPLIER
        } else {
            0.0
        };
        let result = StrategyResult {
            label: "room_specific_overrides".to_string(),
            panels,
            room_summaries,
            room_orientations: room_orientations.clone(),
            total_room_area,
            total_leftover_area,
            waste_percentage,
            leftovers_created: stats.created,
            leftovers_reused: stats.reused,
        };

        self.persist_and_summarize_with_orientations(
            project_id,
            plan_kind,
            spec,
            result,
            RecommendedStrategy::HeightGroupedSeparate,
            warnings,
            room_orientations,
        )
        .await
    }

    async fn persist_and_summarize(
        &self,
        project_id: &ProjectId,
        plan_kind: PlanKind,
        spec: &PanelSpec,
        chosen: StrategyResult,
        recommended_strategy: RecommendedStrategy,
        warnings: Vec<String>,
    ) -> Result<GenerationReport> {
        let orientation_by_room = chosen.room_orientations.clone();
        self.persist_and_summarize_with_orientations(
            project_id,
            plan_kind,
            spec,
            chosen,
            recommended_strategy,
            warnings,
            orientation_by_room,
        )
        .await
    }

    async fn persist_and_summarize_with_orientations(
        &self,
        project_id: &ProjectId,
        plan_kind: PlanKind,
        spec: &PanelSpec,
        chosen: StrategyResult,
        recommended_strategy: RecommendedStrategy,
        mut warnings: Vec<String>,
        orientation_by_room: HashMap<RoomId, Orientation>,
    ) -> Result<GenerationReport> {
        let record = PlanRecord {
            thickness: spec.thickness,
            orientation_strategy: OrientationStrategy::Auto,
            panel_width: spec.max_width,
            panel_length: spec.length_mode,
            support_type: "none".to_string(),
            support_config: serde_json::Value::Null,
        };

        let mut room_reports = Vec::with_capacity(chosen.room_summaries.len());
        let mut room_ids: Vec<&RoomId> = chosen.room_summaries.keys().collect();
        room_ids.sort();

        for room_id in room_ids {
            let summary = chosen.room_summaries[room_id];
            let target = Target::Room(room_id.clone());
            let room_panels: Vec<_> = chosen
                .panels
                .iter()
                .filter(|p| p.room_id.as_ref() == Some(room_id))
                .cloned()
                .collect();

            if let Err(err) = self.store.replace_panels(&target, room_panels).await {
                warn!(project_id = %project_id, room_id = %room_id, error = %err, "persisting panels failed, aborting pass");
                return Err(err);
            }
            if let Err(err) = self.store.upsert_plan(&target, record.clone()).await {
                warn!(project_id = %project_id, room_id = %room_id, error = %err, "persisting plan failed, aborting pass");
                return Err(err);
            }

            let waste_percentage = if summary.room_area > 0.0 {
                summary.leftover_area_created / summary.room_area
                    * crate::constants::MathConstants::PERCENTAGE_MULTIPLIER
            } else {
                0.0
            };

            room_reports.push(RoomReport {
                room_id: room_id.clone(),
                total_panels: summary.panel_count,
                full_panels: summary.panel_count - summary.cut_panel_count,
                cut_panels: summary.cut_panel_count,
                waste_percentage,
                orientation: orientation_by_room
                    .get(room_id)
                    .copied()
                    .unwrap_or(Orientation::Horizontal),
            });
        }

        if plan_kind == PlanKind::Ceiling && chosen.label == "project_merged" {
            if let Some(panel) = chosen.panels.first() {
                if let Some(zone_id) = &panel.zone_id {
                    let zone_target = Target::Zone(zone_id.clone());
                    self.store
                        .replace_panels(&zone_target, chosen.panels.clone())
                        .await?;
                    self.store.upsert_plan(&zone_target, record.clone()).await?;
                }
            }
        }

        warnings.extend(
            room_reports
                .iter()
                .filter(|r| r.total_panels == 0)
                .map(|r| format!("room {} produced zero panels", r.room_id)),
        );

        Ok(GenerationReport {
            project_id: project_id.clone(),
            total_panels: chosen.panels.len(),
            project_waste_percentage: chosen.waste_percentage,
            recommended_strategy: format!("{recommended_strategy:?}"),
            leftovers_created: chosen.leftovers_created,
            leftovers_reused: chosen.leftovers_reused,
            full_panels_saved: chosen.panels.iter().filter(|p| p.from_leftover).count(),
            room_reports,
            warnings,
        })
    }

    async fn eligible_rooms(
        &self,
        project_id: &ProjectId,
        plan_kind: Option<PlanKind>,
    ) -> Result<Vec<Room>> {
        let mut rooms = self.store.list_rooms(project_id).await?;
        rooms.retain(|r| r.polygon.is_valid());
        if plan_kind == Some(PlanKind::Floor) {
            rooms.retain(|r| r.floor_type == FloorType::Panel);
        }
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rooms)
    }

    fn acquire_guard(&self, project_id: &ProjectId) -> Result<tokio::sync::OwnedMutexGuard<()>> {
        let mutex = {
            let mut map = self
                .in_flight
                .lock()
                .expect("planner concurrency-guard mutex poisoned");
            map.entry(project_id.clone())
                .or_insert_with(|| Arc::new(TokioMutex::new(())))
                .clone()
        };
        mutex
            .try_lock_owned()
            .map_err(|_| AppError::concurrent_generation(project_id.clone()))
    }
}

fn validate_params(panel_width: f64, panel_length: LengthMode) -> Result<()> {
    if panel_width <= 0.0 {
        return Err(AppError::invalid_params("panel_width must be positive"));
    }
    if let LengthMode::Custom(l) = panel_length {
        if l <= 0.0 {
            return Err(AppError::invalid_params(
                "custom_panel_length must be positive",
            ));
        }
    }
    Ok(())
}

/// `project_merged` is admissible only when every room sits in one height
/// group and that group's area efficiency clears the merge threshold.
fn merge_admissible_zone(project_id: &ProjectId, heights: &HeightAnalysis) -> Option<String> {
    if heights.all_same_height && heights.groups.first().is_some_and(|g| g.can_merge) {
        Some(format!("zone-{project_id}"))
    } else {
        None
    }
}
