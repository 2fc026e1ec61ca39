//! Space-filling-curve spatial index: entities keyed by Morton cell,
//! supporting range, k-nearest-neighbor, and ray queries plus a four-phase
//! move protocol that keeps moving entities discoverable throughout.
//!
//! Grounded on the `OctreeConfig`/`OctreeNode` split seen elsewhere in this
//! corpus (a config carrying the world-to-grid mapping, paired with a
//! small immutable cell-address type), generalized here from an explicit
//! octree to a flat Morton-keyed map: `BTreeMap<MortonKey, HashSet<u64>>`
//! orders cells by `(level, code)` for free, which is what both the
//! `cells(Q)` range scan and the best-first k-NN/ray traversals need.

mod morton;

pub use morton::{KeyInterval, MortonGrid, MortonKey};

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

use crate::config::ColliderConfig;
use crate::error::{ColliderError, Result};
use crate::geom::{ray_vs_aabb, Aabb};
use crate::math::{Point3, Vector3};

/// Geometry an entity was registered with: a single point, or an
/// axis-aligned bounding region spanning one or more cells.
#[derive(Debug, Clone, Copy, PartialEq)]
enum EntityGeometry {
    Point(Point3),
    Bounded(Aabb),
}

impl EntityGeometry {
    fn recentered(&self, new_position: Point3) -> Self {
        match self {
            EntityGeometry::Point(_) => EntityGeometry::Point(new_position),
            EntityGeometry::Bounded(aabb) => {
                let half = aabb.half_extents();
                EntityGeometry::Bounded(Aabb::new(new_position - half, new_position + half))
            }
        }
    }

    fn keys_at(&self, grid: &MortonGrid, level: u8, max_coord: i64) -> Vec<MortonKey> {
        match self {
            EntityGeometry::Point(p) => vec![grid.key_for_point(*p, level, max_coord)],
            EntityGeometry::Bounded(aabb) => grid
                .cells_in_region(aabb, level, max_coord)
                .into_iter()
                .flat_map(|interval| (interval.start..=interval.end).map(move |code| MortonKey { level, code }))
                .collect(),
        }
    }

    fn overlaps(&self, region: &Aabb) -> bool {
        match self {
            EntityGeometry::Point(p) => region.contains_point(*p),
            EntityGeometry::Bounded(aabb) => aabb.overlaps(region),
        }
    }

    fn distance_to(&self, point: Point3) -> f32 {
        match self {
            EntityGeometry::Point(p) => (*p - point).norm(),
            EntityGeometry::Bounded(aabb) => (aabb.closest_point(point) - point).norm(),
        }
    }

    fn aabb(&self) -> Aabb {
        match self {
            EntityGeometry::Point(p) => Aabb::new(*p, *p),
            EntityGeometry::Bounded(aabb) => *aabb,
        }
    }
}

/// A half-space boundary: `normal.dot(p) + distance` is the signed
/// distance of `p` from the plane, positive on the side `normal` points
/// toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit surface normal.
    pub normal: Vector3,
    /// Signed offset from the origin along `normal`.
    pub distance: f32,
}

impl Plane {
    /// Builds a plane from a unit normal and signed offset.
    pub fn new(normal: Vector3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Signed distance of `p` from the plane.
    pub fn signed_distance(&self, p: Point3) -> f32 {
        self.normal.dot(&p.coords) + self.distance
    }

    /// The "positive vertex" AABB test: `false` only if the whole box is
    /// strictly behind the plane. Grounded on the `extent . |normal|`
    /// projected-radius test used for frustum culling in the corpus's
    /// rendering examples.
    fn aabb_in_front(&self, aabb: &Aabb) -> bool {
        let center = aabb.center();
        let half = aabb.half_extents();
        let dist = self.signed_distance(center);
        let radius =
            half.x * self.normal.x.abs() + half.y * self.normal.y.abs() + half.z * self.normal.z.abs();
        dist >= -radius
    }
}

/// A view volume as six bounding half-spaces (left, right, bottom, top,
/// near, far, in no particular order — only their conjunction matters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// The six bounding planes.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Builds a frustum from its six bounding planes.
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    fn aabb_in_front(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| plane.aabb_in_front(aabb))
    }
}

#[derive(Debug, Clone)]
struct EntityRecord {
    geometry: EntityGeometry,
    level: u8,
    keys: Vec<MortonKey>,
}

/// Snapshot of index occupancy, for diagnostics and capacity planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of distinct entities currently tracked.
    pub entity_count: usize,
    /// Number of occupied cells across every level in use.
    pub node_count: usize,
    /// Coarsest and finest levels with at least one occupied cell, if any.
    pub level_range: Option<(u8, u8)>,
}

/// A wrapper making `f32` usable as a heap key; panics on `NaN` via
/// `Ordering::Equal` fallback rather than propagating it, matching the
/// "geometry never returns an error" convention elsewhere in this crate.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FloatOrd(f32);

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

/// Entities keyed by Morton cell at whatever level each was inserted at.
///
/// Single-writer: callers serialize mutation the way every shape in this
/// crate expects exclusive `&mut` access during a move. Reads via
/// `query_*` take `&self` and observe one consistent snapshot since no
/// mutation runs concurrently with them under that contract.
pub struct SpatialIndex {
    config: ColliderConfig,
    grid: MortonGrid,
    nodes: BTreeMap<MortonKey, HashSet<u64>>,
    entities: HashMap<u64, EntityRecord>,
    levels_in_use: HashMap<u8, usize>,
}

impl SpatialIndex {
    /// Builds an empty index over `grid` using `config`'s tuning values
    /// (`max_coord` bounds the domain; the rest govern query behavior).
    pub fn new(grid: MortonGrid, config: ColliderConfig) -> Self {
        Self {
            config,
            grid,
            nodes: BTreeMap::new(),
            entities: HashMap::new(),
            levels_in_use: HashMap::new(),
        }
    }

    /// Number of distinct entities currently tracked.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// `true` if no entities are tracked.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Occupancy snapshot: entity count, node count, and the span of
    /// levels with at least one occupied cell.
    pub fn stats(&self) -> IndexStats {
        let level_range = self
            .levels_in_use
            .keys()
            .fold(None, |acc: Option<(u8, u8)>, &level| match acc {
                None => Some((level, level)),
                Some((lo, hi)) => Some((lo.min(level), hi.max(level))),
            });
        IndexStats {
            entity_count: self.entities.len(),
            node_count: self.nodes.len(),
            level_range,
        }
    }

    fn bump_level(&mut self, level: u8) {
        *self.levels_in_use.entry(level).or_insert(0) += 1;
    }

    fn unbump_level(&mut self, level: u8) {
        if let Some(count) = self.levels_in_use.get_mut(&level) {
            *count -= 1;
            if *count == 0 {
                self.levels_in_use.remove(&level);
            }
        }
    }

    fn insert_entity(&mut self, id: u64, geometry: EntityGeometry, level: u8) -> Result<()> {
        if self.entities.contains_key(&id) {
            return Err(ColliderError::invalid_parameter(
                "id",
                format!("entity {id} is already present in the index"),
            ));
        }
        let keys = geometry.keys_at(&self.grid, level, self.config.max_coord);
        for key in &keys {
            self.nodes.entry(*key).or_default().insert(id);
        }
        self.bump_level(level);
        self.entities.insert(id, EntityRecord { geometry, level, keys });
        tracing::debug!(entity_id = id, level, "inserted entity into spatial index");
        Ok(())
    }

    /// Registers a point entity at `level`, occupying the single cell
    /// containing `position`.
    pub fn insert_point(&mut self, id: u64, position: Point3, level: u8) -> Result<()> {
        self.insert_entity(id, EntityGeometry::Point(position), level)
    }

    /// Registers a bounded (spanning) entity at `level`, occupying every
    /// cell its AABB intersects.
    pub fn insert_bounded(&mut self, id: u64, bounds: Aabb, level: u8) -> Result<()> {
        self.insert_entity(id, EntityGeometry::Bounded(bounds), level)
    }

    fn detach(&mut self, keys: &[MortonKey], id: u64) {
        for key in keys {
            if let Some(set) = self.nodes.get_mut(key) {
                set.remove(&id);
                if set.is_empty() {
                    self.nodes.remove(key);
                }
            }
        }
    }

    /// Removes an entity from the index. Returns
    /// [`ColliderError::NotFound`] if `id` is not present.
    pub fn remove(&mut self, id: u64) -> Result<()> {
        let record = self
            .entities
            .remove(&id)
            .ok_or_else(|| ColliderError::not_found(id))?;
        self.detach(&record.keys, id);
        self.unbump_level(record.level);
        tracing::debug!(entity_id = id, "removed entity from spatial index");
        Ok(())
    }

    /// Moves an entity to `new_position`, re-centering bounded entities
    /// around it. Implements the four-phase protocol: PREPARE computes the
    /// new key set; INSERT adds the entity under every new key before
    /// anything is removed, so it stays discoverable at the union of old
    /// and new keys for the duration of the call; UPDATE atomically swaps
    /// the stored geometry; REMOVE drops keys that no longer apply. A
    /// `NotFound` id leaves the index untouched (PREPARE never starts).
    pub fn move_to(&mut self, id: u64, new_position: Point3) -> Result<()> {
        let Some(record) = self.entities.get(&id) else {
            return Err(ColliderError::not_found(id));
        };
        let level = record.level;
        let old_keys = record.keys.clone();
        let new_geometry = record.geometry.recentered(new_position);
        let new_keys = new_geometry.keys_at(&self.grid, level, self.config.max_coord);

        for key in &new_keys {
            self.nodes.entry(*key).or_default().insert(id);
        }

        if let Some(record) = self.entities.get_mut(&id) {
            record.geometry = new_geometry;
            record.keys = new_keys.clone();
        }

        for key in &old_keys {
            if !new_keys.contains(key) {
                if let Some(set) = self.nodes.get_mut(key) {
                    set.remove(&id);
                    if set.is_empty() {
                        self.nodes.remove(key);
                    }
                }
            }
        }

        tracing::trace!(entity_id = id, "moved entity within spatial index");
        Ok(())
    }

    /// Every entity id whose registered geometry overlaps `bounds`.
    ///
    /// Uses `cells(Q)` at every level currently in use to gather candidate
    /// cells, unions their entities, then filters false positives
    /// (entities that occupy a candidate cell but don't actually overlap
    /// `bounds`) by re-testing each candidate's own geometry.
    pub fn query_range(&self, bounds: &Aabb) -> Vec<u64> {
        let mut candidates: HashSet<u64> = HashSet::new();
        for &level in self.levels_in_use.keys() {
            for interval in self.grid.cells_in_region(bounds, level, self.config.max_coord) {
                let (start, end) = interval.key_range();
                for ids in self.nodes.range(start..=end).map(|(_, ids)| ids) {
                    candidates.extend(ids.iter().copied());
                }
            }
        }
        candidates
            .into_iter()
            .filter(|id| {
                self.entities
                    .get(id)
                    .is_some_and(|record| record.geometry.overlaps(bounds))
            })
            .collect()
    }

    /// Every entity id whose bounds are not entirely behind `plane`.
    ///
    /// Linear over the entity registry rather than cell-accelerated: a
    /// single half-space doesn't reduce to a `cells(Q)`-style axis-aligned
    /// region the way `query_range`'s box does, so this tests every
    /// entity's own AABB directly.
    pub fn query_plane(&self, plane: &Plane) -> Vec<u64> {
        self.entities
            .iter()
            .filter(|(_, record)| plane.aabb_in_front(&record.geometry.aabb()))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Every entity id whose bounds are not entirely behind any plane of
    /// `frustum` — the standard view-volume culling test, applied to
    /// indexed entities instead of render instances.
    pub fn query_frustum(&self, frustum: &Frustum) -> Vec<u64> {
        self.entities
            .iter()
            .filter(|(_, record)| frustum.aabb_in_front(&record.geometry.aabb()))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Best-first k-nearest-neighbor search: expands cells in order of
    /// closest-point-on-cell distance to `point`, stopping once the
    /// closest unexplored cell is farther than the current k-th best
    /// entity distance.
    pub fn query_knn(&self, point: Point3, k: usize) -> Vec<u64> {
        if k == 0 {
            return Vec::new();
        }

        let mut cell_heap: BinaryHeap<std::cmp::Reverse<(FloatOrd, MortonKey)>> = self
            .nodes
            .keys()
            .map(|&key| {
                let dist = (self.grid.cell_aabb(key).closest_point(point) - point).norm();
                std::cmp::Reverse((FloatOrd(dist), key))
            })
            .collect();

        let mut best: BinaryHeap<(FloatOrd, u64)> = BinaryHeap::new();
        let mut seen: HashSet<u64> = HashSet::new();

        while let Some(std::cmp::Reverse((FloatOrd(cell_dist), key))) = cell_heap.pop() {
            if best.len() >= k {
                if let Some((FloatOrd(worst), _)) = best.peek() {
                    if cell_dist > *worst {
                        break;
                    }
                }
            }
            let Some(ids) = self.nodes.get(&key) else {
                continue;
            };
            for &id in ids {
                if !seen.insert(id) {
                    continue;
                }
                let Some(record) = self.entities.get(&id) else {
                    continue;
                };
                let dist = record.geometry.distance_to(point);
                if best.len() < k {
                    best.push((FloatOrd(dist), id));
                } else if let Some((FloatOrd(worst), _)) = best.peek() {
                    if dist < *worst {
                        best.pop();
                        best.push((FloatOrd(dist), id));
                    }
                }
            }
        }

        let mut out: Vec<(f32, u64)> = best.into_iter().map(|(FloatOrd(d), id)| (d, id)).collect();
        out.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        out.into_iter().map(|(_, id)| id).collect()
    }

    /// Entity ids whose cells the ray enters, ordered by entry distance.
    /// Traverses cells in increasing ray-entry order and prunes once a
    /// cell's entry distance exceeds both the best hit found so far and
    /// `ray.max_distance`.
    pub fn query_ray(&self, ray: &crate::geom::Ray3) -> Vec<u64> {
        let mut cell_heap: BinaryHeap<std::cmp::Reverse<(FloatOrd, MortonKey)>> = BinaryHeap::new();
        for &key in self.nodes.keys() {
            let aabb = self.grid.cell_aabb(key);
            if let crate::geom::RayHit::Hit { t, .. } = ray_vs_aabb(ray, &aabb) {
                cell_heap.push(std::cmp::Reverse((FloatOrd(t), key)));
            }
        }

        let mut hits: Vec<(f32, u64)> = Vec::new();
        let mut seen: HashSet<u64> = HashSet::new();
        let mut best_t = ray.max_distance;

        while let Some(std::cmp::Reverse((FloatOrd(entry_t), key))) = cell_heap.pop() {
            if entry_t > best_t {
                break;
            }
            let Some(ids) = self.nodes.get(&key) else {
                continue;
            };
            for &id in ids {
                if !seen.insert(id) {
                    continue;
                }
                let Some(record) = self.entities.get(&id) else {
                    continue;
                };
                let entity_aabb = match record.geometry {
                    EntityGeometry::Point(p) => Aabb::new(p, p),
                    EntityGeometry::Bounded(aabb) => aabb,
                };
                if let crate::geom::RayHit::Hit { t, .. } = ray_vs_aabb(ray, &entity_aabb) {
                    if t <= best_t {
                        best_t = best_t.min(t);
                        hits.push((t, id));
                    }
                }
            }
        }

        hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    /// Up to 26 neighboring cell keys at `key`'s level, using the
    /// configured neighbor search radius.
    pub fn neighbors(&self, key: MortonKey) -> Vec<MortonKey> {
        self.grid
            .neighbors(key, self.config.neighbor_search_radius, self.config.max_coord)
    }

    /// The `cells(Q)` interval decomposition of `bounds` at `level`.
    pub fn cells(&self, bounds: &Aabb, level: u8) -> Vec<KeyInterval> {
        self.grid.cells_in_region(bounds, level, self.config.max_coord)
    }
}

/// Thread-shared handle to a [`SpatialIndex`]: an `Arc<RwLock<..>>` pair
/// matching the "single writer, many readers" concurrency contract —
/// readers take the shared guard, the entity-mover protocol serializes
/// through the exclusive one.
pub type SharedIndex = std::sync::Arc<parking_lot::RwLock<SpatialIndex>>;

/// Wraps `index` in a [`SharedIndex`] handle.
pub fn shared(index: SpatialIndex) -> SharedIndex {
    std::sync::Arc::new(parking_lot::RwLock::new(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Ray3;
    use crate::math::Vector3;

    fn unit_grid() -> MortonGrid {
        MortonGrid {
            origin: Point3::origin(),
            root_extent: 1024.0,
        }
    }

    fn index() -> SpatialIndex {
        SpatialIndex::new(unit_grid(), ColliderConfig::default())
    }

    #[test]
    fn insert_point_then_remove_round_trips() {
        let mut idx = index();
        idx.insert_point(1, Point3::new(1.0, 2.0, 3.0), 5).unwrap();
        assert_eq!(idx.len(), 1);
        idx.remove(1).unwrap();
        assert!(idx.is_empty());
        assert_eq!(idx.stats().node_count, 0);
    }

    #[test]
    fn remove_unknown_id_is_not_found() {
        let mut idx = index();
        assert_eq!(idx.remove(42), Err(ColliderError::not_found(42)));
    }

    #[test]
    fn query_range_finds_inserted_point() {
        let mut idx = index();
        idx.insert_point(1, Point3::new(5.0, 5.0, 5.0), 6).unwrap();
        idx.insert_point(2, Point3::new(500.0, 500.0, 500.0), 6).unwrap();

        let region = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0));
        let found = idx.query_range(&region);
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn query_knn_orders_by_distance() {
        let mut idx = index();
        idx.insert_point(1, Point3::new(10.0, 0.0, 0.0), 6).unwrap();
        idx.insert_point(2, Point3::new(1.0, 0.0, 0.0), 6).unwrap();
        idx.insert_point(3, Point3::new(5.0, 0.0, 0.0), 6).unwrap();

        let nearest = idx.query_knn(Point3::origin(), 2);
        assert_eq!(nearest, vec![2, 3]);
    }

    #[test]
    fn move_to_keeps_entity_findable_at_new_position() {
        let mut idx = index();
        idx.insert_point(1, Point3::new(0.0, 0.0, 0.0), 6).unwrap();
        idx.move_to(1, Point3::new(50.0, 0.0, 0.0)).unwrap();

        let old_region = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let new_region = Aabb::new(Point3::new(49.0, -1.0, -1.0), Point3::new(51.0, 1.0, 1.0));
        assert!(idx.query_range(&old_region).is_empty());
        assert_eq!(idx.query_range(&new_region), vec![1]);
    }

    #[test]
    fn query_ray_orders_hits_by_entry_distance() {
        let mut idx = index();
        idx.insert_bounded(
            1,
            Aabb::from_center_half_extents(Point3::new(10.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5)),
            6,
        )
        .unwrap();
        idx.insert_bounded(
            2,
            Aabb::from_center_half_extents(Point3::new(5.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5)),
            6,
        )
        .unwrap();

        let ray = Ray3::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0), 100.0);
        assert_eq!(idx.query_ray(&ray), vec![2, 1]);
    }

    #[test]
    fn neighbors_delegates_to_grid_with_configured_radius() {
        let idx = index();
        let key = idx.grid.key_for_point(Point3::new(5.0, 5.0, 5.0), 6, idx.config.max_coord);
        assert_eq!(idx.neighbors(key).len(), 26);
    }

    #[test]
    fn query_plane_excludes_entities_fully_behind_it() {
        let mut idx = index();
        idx.insert_point(1, Point3::new(5.0, 0.0, 0.0), 6).unwrap();
        idx.insert_point(2, Point3::new(-5.0, 0.0, 0.0), 6).unwrap();

        // Normal points toward +x; plane passes through the origin, so only
        // entities with x >= 0 are in front.
        let plane = Plane::new(Vector3::new(1.0, 0.0, 0.0), 0.0);
        assert_eq!(idx.query_plane(&plane), vec![1]);
    }

    #[test]
    fn query_frustum_requires_every_plane_to_pass() {
        let mut idx = index();
        idx.insert_point(1, Point3::new(5.0, 0.0, 0.0), 6).unwrap();
        idx.insert_point(2, Point3::new(-5.0, 0.0, 0.0), 6).unwrap();

        // A one-sided "frustum": five permissive planes plus one that only
        // entity 1 satisfies, so the conjunction matches only entity 1.
        let permissive = Plane::new(Vector3::new(0.0, 1.0, 0.0), 1000.0);
        let restrictive = Plane::new(Vector3::new(1.0, 0.0, 0.0), 0.0);
        let frustum = Frustum::new([
            permissive,
            permissive,
            permissive,
            permissive,
            permissive,
            restrictive,
        ]);
        assert_eq!(idx.query_frustum(&frustum), vec![1]);
    }
}
