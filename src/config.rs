//! Configurable constants recognized by the implementation.
//!
//! Mirrors the `*Config` + `Default` pattern used for engine and indexing
//! configuration elsewhere in this codebase: one struct, documented fields,
//! a `Default` impl for the out-of-the-box tuning values.

use serde::{Deserialize, Serialize};

/// Maximum number of triangles stored at a single BVH leaf.
pub const MAX_TRIS_PER_LEAF: usize = 4;

/// Epsilon below which a ray direction component (or an edge-cross axis
/// length) is treated as parallel/degenerate.
pub const EPS_PARALLEL: f32 = 1e-6;

/// Epsilon used to select the hit face in ray-vs-AABB tests.
pub const EPS_FACE_SELECT_AABB: f32 = 1e-3;

/// Epsilon used to select the hit face in ray-vs-OBB tests.
pub const EPS_FACE_SELECT_OBB: f32 = 1e-4;

/// Baumgarte-style slop left unpenalized by position correction. Not
/// consumed inside this crate (the resolver is an external collaborator)
/// but exposed for callers that need the documented constant.
pub const POSITION_CORRECTION_SLOP: f32 = 0.01;

/// Default maximum number of entities tracked per spatial index node
/// before callers are expected to refine to a deeper level.
pub const DEFAULT_MAX_ENTITIES_PER_NODE: usize = 10;

/// Default neighbor-search radius (in cells) used by `neighbors`.
pub const DEFAULT_NEIGHBOR_SEARCH_RADIUS: i64 = 1;

/// Upper bound of the `cells(Q)` coordinate domain on each axis.
pub const MAX_COORD: i64 = 1 << 20;

/// Runtime-configurable knobs for a [`crate::index::SpatialIndex`] or the
/// mesh BVH builder.
///
/// Constructed with [`ColliderConfig::default`] and overridden field by
/// field; every field corresponds 1:1 to one of the module-level
/// constants above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderConfig {
    /// Maximum triangles per BVH leaf before a split is attempted.
    pub max_tris_per_leaf: usize,
    /// Parallel-rejection epsilon for ray directions and SAT edge axes.
    pub eps_parallel: f32,
    /// Face-selection epsilon for ray-vs-AABB hits.
    pub eps_face_select_aabb: f32,
    /// Face-selection epsilon for ray-vs-OBB hits.
    pub eps_face_select_obb: f32,
    /// Position-correction slop constant, surfaced for collaborators.
    pub position_correction_slop: f32,
    /// Default max entities per spatial index node.
    pub max_entities_per_node: usize,
    /// Default neighbor search radius in cells.
    pub neighbor_search_radius: i64,
    /// Inclusive upper bound of the cells(Q) coordinate domain.
    pub max_coord: i64,
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            max_tris_per_leaf: MAX_TRIS_PER_LEAF,
            eps_parallel: EPS_PARALLEL,
            eps_face_select_aabb: EPS_FACE_SELECT_AABB,
            eps_face_select_obb: EPS_FACE_SELECT_OBB,
            position_correction_slop: POSITION_CORRECTION_SLOP,
            max_entities_per_node: DEFAULT_MAX_ENTITIES_PER_NODE,
            neighbor_search_radius: DEFAULT_NEIGHBOR_SEARCH_RADIUS,
            max_coord: MAX_COORD,
        }
    }
}
