//! Default values and thresholds used throughout the panel-layout engine.

/// Stock panel and panel-thickness defaults.
pub struct PanelConstants;

impl PanelConstants {
    /// Maximum stock panel width, in millimeters. A panel cut narrower than
    /// this is a cut panel; a panel at exactly this width is a full stock panel.
    pub const MAX_STOCK_WIDTH: f64 = 1150.0;

    /// Default ceiling plan thickness (plan-level metadata, not per-panel).
    pub const DEFAULT_CEILING_THICKNESS: f64 = 150.0;

    /// Default thickness of an individual ceiling panel.
    pub const DEFAULT_PANEL_THICKNESS: f64 = 20.0;

    /// Default thickness of an individual floor panel.
    pub const DEFAULT_FLOOR_PANEL_THICKNESS: f64 = 20.0;
}

/// Shape-decomposition and merge-admissibility thresholds.
pub struct GeometryConstants;

impl GeometryConstants {
    /// Coverage invariant tolerance for the shape decomposer: the summed
    /// area of kept cells must be within this fraction of the polygon area.
    pub const MAX_COVERAGE_DIVERGENCE: f64 = 0.05;

    /// Fraction of the bbox extent below which two adjacent grid coordinates
    /// are merged, to avoid micro-cells from floating-point jitter.
    pub const MIN_GRID_SPACING_FRACTION: f64 = 0.01;

    /// Tolerance, in millimeters, for "vertex close to vertex" connectivity
    /// checks used by the height grouper.
    pub const VERTEX_PROXIMITY_TOLERANCE_MM: f64 = 100.0;

    /// Tolerance, in millimeters, for "center close to center" connectivity
    /// checks used by the height grouper.
    pub const CENTER_PROXIMITY_TOLERANCE_MM: f64 = 500.0;

    /// Minimum area efficiency (Σ room area / combined bbox area) for a
    /// height group to be considered mergeable into one zone plan. Hard-coded
    /// in the original source with no parameter threading it through, so it
    /// stays a constant here too rather than a `PlanningConfig` field.
    pub const MERGE_AREA_EFFICIENCY_THRESHOLD: f64 = 0.7;

    /// Floating-point equality tolerance for coordinate comparisons.
    pub const COORDINATE_EPSILON: f64 = 1e-6;

    /// Tolerance, in millimeters, for rect overlap / boundary-containment checks.
    pub const OVERLAP_TOLERANCE_MM: f64 = 1.0;
}

/// Percentage and unit-conversion constants.
pub struct MathConstants;

impl MathConstants {
    /// Multiplier for converting a ratio into a percentage (0.15 -> 15.0).
    pub const PERCENTAGE_MULTIPLIER: f64 = 100.0;
}
