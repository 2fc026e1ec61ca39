//! Morton keys: a (level, interleaved-code) pair inducing a space-filling
//! curve ordering over a cubic coordinate domain, plus the grid that maps
//! world-space points to cells and back.

use crate::math::{Point3, Vector3};
use crate::geom::Aabb;

/// A key identifying one cell of the spatial grid: a refinement level plus
/// a bit-interleaved coordinate code. Ordered by `(level, code)`, matching
/// field declaration order, with `code` compared as an unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MortonKey {
    /// Refinement level; level 0 is the coarsest (the whole root extent is
    /// one cell).
    pub level: u8,
    /// Bit-interleaved 3D coordinate code at `level`.
    pub code: u64,
}

/// One contiguous run of Morton codes at a fixed level, produced by
/// [`MortonGrid::cells_in_region`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInterval {
    /// Level shared by every key in `[start, end]`.
    pub level: u8,
    /// First code in the run (inclusive).
    pub start: u64,
    /// Last code in the run (inclusive).
    pub end: u64,
}

impl KeyInterval {
    /// The inclusive key range as a pair of `MortonKey`s, suitable for
    /// `BTreeMap::range`.
    pub fn key_range(&self) -> (MortonKey, MortonKey) {
        (
            MortonKey {
                level: self.level,
                code: self.start,
            },
            MortonKey {
                level: self.level,
                code: self.end,
            },
        )
    }
}

/// Spreads the low 21 bits of `v` so that two zero bits follow each set
/// bit, the standard bit trick behind 3D Morton encoding.
fn spread_bits(v: u64) -> u64 {
    let mut v = v & 0x1f_ffff;
    v = (v | (v << 32)) & 0x1f00000000ffff;
    v = (v | (v << 16)) & 0x1f0000ff0000ff;
    v = (v | (v << 8)) & 0x100f00f00f00f00f;
    v = (v | (v << 4)) & 0x10c30c30c30c30c3;
    v = (v | (v << 2)) & 0x1249249249249249;
    v
}

/// Inverse of [`spread_bits`]: gathers every third bit back into the low
/// 21 bits.
fn compact_bits(v: u64) -> u64 {
    let mut v = v & 0x1249249249249249;
    v = (v | (v >> 2)) & 0x10c30c30c30c30c3;
    v = (v | (v >> 4)) & 0x100f00f00f00f00f;
    v = (v | (v >> 8)) & 0x1f0000ff0000ff;
    v = (v | (v >> 16)) & 0x1f00000000ffff;
    v = (v | (v >> 32)) & 0x1f_ffff;
    v
}

/// Interleaves three 21-bit coordinates into a single 63-bit Morton code.
fn encode(coords: [i64; 3]) -> u64 {
    spread_bits(coords[0] as u64) | (spread_bits(coords[1] as u64) << 1) | (spread_bits(coords[2] as u64) << 2)
}

/// Inverse of [`encode`].
fn decode(code: u64) -> [i64; 3] {
    [
        compact_bits(code) as i64,
        compact_bits(code >> 1) as i64,
        compact_bits(code >> 2) as i64,
    ]
}

/// Maps world-space points to Morton cells: an origin plus the world-space
/// extent of a single level-0 cell. `length_at_level(L) = root_extent / 2^L`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MortonGrid {
    /// World-space position of cell `(0, 0, 0)` at every level.
    pub origin: Point3,
    /// World-space side length of the single cell at level 0.
    pub root_extent: f32,
}

impl MortonGrid {
    /// World-space side length of a cell at `level`.
    pub fn length_at_level(&self, level: u8) -> f32 {
        self.root_extent / (1u64 << level) as f32
    }

    /// Quantizes `p` to integer cell coordinates at `level`, clamped into
    /// `[0, max_coord - 1]` on each axis.
    pub fn cell_coords(&self, p: Point3, level: u8, max_coord: i64) -> [i64; 3] {
        let size = self.length_at_level(level);
        let upper = (max_coord - 1).max(0);
        [
            (((p.x - self.origin.x) / size).floor() as i64).clamp(0, upper),
            (((p.y - self.origin.y) / size).floor() as i64).clamp(0, upper),
            (((p.z - self.origin.z) / size).floor() as i64).clamp(0, upper),
        ]
    }

    /// Quantizes `p` to integer cell coordinates at `level`, treating `p`
    /// as an exclusive upper bound: a coordinate that lands exactly on a
    /// cell's lower boundary belongs to the *previous* cell, not the one it
    /// opens. Used for the max corner of a half-open query region, so
    /// `[0,2)` along an axis with unit cells covers cell `0` only, not
    /// cells `0` and `1`.
    fn cell_coords_exclusive(&self, p: Point3, level: u8, max_coord: i64) -> [i64; 3] {
        let size = self.length_at_level(level);
        let upper = (max_coord - 1).max(0);
        let axis = |value: f32, origin: f32| -> i64 {
            let scaled = (value - origin) / size;
            (scaled.ceil() as i64 - 1).clamp(0, upper)
        };
        [
            axis(p.x, self.origin.x),
            axis(p.y, self.origin.y),
            axis(p.z, self.origin.z),
        ]
    }

    /// The Morton key of the cell containing `p` at `level`.
    pub fn key_for_point(&self, p: Point3, level: u8, max_coord: i64) -> MortonKey {
        MortonKey {
            level,
            code: encode(self.cell_coords(p, level, max_coord)),
        }
    }

    /// World-space minimum corner of the cell named by `key`.
    pub fn cell_min(&self, key: MortonKey) -> Point3 {
        let coords = decode(key.code);
        let size = self.length_at_level(key.level);
        self.origin
            + Vector3::new(coords[0] as f32, coords[1] as f32, coords[2] as f32) * size
    }

    /// World-space AABB of the cell named by `key`.
    pub fn cell_aabb(&self, key: MortonKey) -> Aabb {
        let min = self.cell_min(key);
        let size = self.length_at_level(key.level);
        Aabb::new(min, min + Vector3::new(size, size, size))
    }

    /// The `cells(Q)` decomposition: every cell at `level` whose AABB
    /// overlaps `region`, coalesced into contiguous Morton-code runs.
    ///
    /// 1. Computes the inclusive per-axis cell range covering `region`
    ///    (clamped to `[0, max_coord)`); `region` is treated as half-open,
    ///    so `region.max` is quantized exclusively (a max corner sitting
    ///    exactly on a cell boundary belongs to the cell below it).
    /// 2. Encodes every cell in that cuboid into a sorted set of codes.
    /// 3. Scans the sorted codes, coalescing `code[i+1] == code[i] + 1`
    ///    runs into `[start, end]` intervals.
    pub fn cells_in_region(&self, region: &Aabb, level: u8, max_coord: i64) -> Vec<KeyInterval> {
        let min_coords = self.cell_coords(region.min, level, max_coord);
        let max_coords = self.cell_coords_exclusive(region.max, level, max_coord);

        let mut codes = std::collections::BTreeSet::new();
        for x in min_coords[0]..=max_coords[0] {
            for y in min_coords[1]..=max_coords[1] {
                for z in min_coords[2]..=max_coords[2] {
                    codes.insert(encode([x, y, z]));
                }
            }
        }

        let mut intervals = Vec::new();
        let mut iter = codes.into_iter();
        if let Some(first) = iter.next() {
            let mut start = first;
            let mut end = first;
            for code in iter {
                if code == end + 1 {
                    end = code;
                } else {
                    intervals.push(KeyInterval { level, start, end });
                    start = code;
                    end = code;
                }
            }
            intervals.push(KeyInterval { level, start, end });
        }
        intervals
    }

    /// Up to 26 keys for the cells adjacent to `key` at the same level,
    /// offsetting coordinates by `[-radius, radius]` on each axis
    /// independently (skipping the zero offset) and discarding any result
    /// outside `[0, max_coord)`.
    pub fn neighbors(&self, key: MortonKey, radius: i64, max_coord: i64) -> Vec<MortonKey> {
        let coords = decode(key.code);
        let mut out = Vec::with_capacity(26);
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                for dz in -radius..=radius {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    let x = coords[0] + dx;
                    let y = coords[1] + dy;
                    let z = coords[2] + dz;
                    if x < 0 || y < 0 || z < 0 || x >= max_coord || y >= max_coord || z >= max_coord {
                        continue;
                    }
                    out.push(MortonKey {
                        level: key.level,
                        code: encode([x, y, z]),
                    });
                }
            }
        }
        out
    }
}
