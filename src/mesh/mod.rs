//! Triangle mesh bounding-volume hierarchy.

mod bvh;

pub use bvh::Bvh;
