//! Error types for collider3d.
//!
//! Geometry kernels and the pair dispatcher never raise; they return
//! explicit "no result" variants (`ContactResult::NoCollision`,
//! `RayHit::Miss`). This module only covers construction-time refusals and
//! index-mutation outcomes.

use thiserror::Error;

/// Result type alias for fallible collider3d operations.
pub type Result<T> = std::result::Result<T, ColliderError>;

/// Errors surfaced by collider3d.
///
/// Narrow-phase and broad-phase queries are total functions and do not
/// return this type; it only appears at construction boundaries and index
/// mutation entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColliderError {
    /// A construction parameter failed validation (non-positive radius,
    /// negative level, zero-length ray direction, degenerate shape).
    #[error("invalid parameter {parameter}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        parameter: String,
        /// Human-readable reason the value was refused.
        reason: String,
    },

    /// `remove`/`moveTo` referenced an entity id that is not present in the
    /// index.
    #[error("entity {entity_id} not found in index")]
    NotFound {
        /// The id that could not be located.
        entity_id: u64,
    },
}

impl ColliderError {
    /// Builds an [`ColliderError::InvalidParameter`] error.
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Builds a [`ColliderError::NotFound`] error.
    pub fn not_found(entity_id: u64) -> Self {
        Self::NotFound { entity_id }
    }
}
