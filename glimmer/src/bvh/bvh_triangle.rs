use glam::Vec3;

use super::BoundingBox;

/// Triangle, as seen by the BVH builder - only lives for the duration of a
/// build.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BvhTriangle {
    /// Index of the triangle within the flattened index buffer (i.e. its
    /// vertices are at `indices[3 * triangle_index ..][..3]`)
    pub triangle_index: u32,
    pub bb: BoundingBox,
}

impl BvhTriangle {
    pub fn new(triangle_index: u32, [a, b, c]: [Vec3; 3]) -> Self {
        Self {
            triangle_index,
            bb: BoundingBox::from_triangle(a, b, c),
        }
    }
}
