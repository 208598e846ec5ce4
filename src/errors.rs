//! Error handling for the panel-layout engine, organized by domain:
//! - Geometry errors: polygon and decomposition failures
//! - Planning errors: generation-pass level failures
//! - Storage errors: collaborator-store persistence failures

use thiserror::Error;

/// Geometry and decomposition errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("degenerate polygon: {details}")]
    DegeneratePolygon { details: String },

    #[error("decomposition diverged: polygon area {polygon_area}, cell area {cell_area} (ratio {ratio})")]
    DecompositionDiverged {
        polygon_area: f64,
        cell_area: f64,
        ratio: f64,
    },
}

impl GeometryError {
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::DegeneratePolygon { .. })
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::DecompositionDiverged { .. })
    }
}

/// Generation-pass level errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    #[error("project {project_id} has no eligible rooms for this plan kind")]
    NoEligibleRooms { project_id: String },

    #[error("generation already in progress for project {project_id}")]
    ConcurrentGeneration { project_id: String },

    #[error("invalid parameters: {details}")]
    InvalidParams { details: String },
}

impl PlanningError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentGeneration { .. })
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NoEligibleRooms { .. } | Self::InvalidParams { .. }
        )
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ConcurrentGeneration { .. })
    }
}

/// Persistence-layer errors surfaced by a concrete `RoomStore` implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("persistence transaction failed: {details}")]
    TransactionFailed { details: String },
}

impl StorageError {
    pub fn is_retryable(&self) -> bool {
        true
    }

    pub fn is_client_error(&self) -> bool {
        false
    }

    pub fn is_server_error(&self) -> bool {
        true
    }
}

/// Top-level error type returned by every public operation in this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AppError {
    /// True if this error indicates a temporary condition that might be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Geometry(e) => e.is_retryable(),
            Self::Planning(e) => e.is_retryable(),
            Self::Storage(e) => e.is_retryable(),
        }
    }

    /// True if this error indicates a client error (4xx equivalent).
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Geometry(e) => e.is_client_error(),
            Self::Planning(e) => e.is_client_error(),
            Self::Storage(e) => e.is_client_error(),
        }
    }

    /// True if this error indicates a server error (5xx equivalent).
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Geometry(e) => e.is_server_error(),
            Self::Planning(e) => e.is_server_error(),
            Self::Storage(e) => e.is_server_error(),
        }
    }

    pub fn degenerate_polygon(details: impl Into<String>) -> Self {
        Self::Geometry(GeometryError::DegeneratePolygon {
            details: details.into(),
        })
    }

    pub fn decomposition_diverged(polygon_area: f64, cell_area: f64) -> Self {
        let ratio = if polygon_area > 0.0 {
            (polygon_area - cell_area).abs() / polygon_area
        } else {
            0.0
        };
        Self::Geometry(GeometryError::DecompositionDiverged {
            polygon_area,
            cell_area,
            ratio,
        })
    }

    pub fn no_eligible_rooms(project_id: impl Into<String>) -> Self {
        Self::Planning(PlanningError::NoEligibleRooms {
            project_id: project_id.into(),
        })
    }

    pub fn concurrent_generation(project_id: impl Into<String>) -> Self {
        Self::Planning(PlanningError::ConcurrentGeneration {
            project_id: project_id.into(),
        })
    }

    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::Planning(PlanningError::InvalidParams {
            details: details.into(),
        })
    }

    pub fn storage_failure(details: impl Into<String>) -> Self {
        Self::Storage(StorageError::TransactionFailed {
            details: details.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_matches_spec() {
        let e = AppError::invalid_params("panel_width must be positive");
        assert!(e.is_client_error());
        assert!(!e.is_retryable());

        let e = AppError::concurrent_generation("proj-1");
        assert!(e.is_retryable());
        assert!(e.is_server_error());

        let e = AppError::storage_failure("connection reset");
        assert!(e.is_retryable());
        assert!(e.is_server_error());
    }

    #[test]
    fn decomposition_diverged_ratio() {
        let e = AppError::decomposition_diverged(100.0, 80.0);
        match e {
            AppError::Geometry(GeometryError::DecompositionDiverged { ratio, .. }) => {
                assert!((ratio - 0.2).abs() < 1e-9);
            }
            _ => panic!("wrong variant"),
        }
    }
}
