use bytemuck::{Pod, Zeroable};
use glam::{vec4, Vec3, Vec4, Vec4Swizzles};

/// Node of the flattened BVH, as seen by the tracing program.
///
/// Layout:
///
/// ```text
/// d0 = (left_index, parent_index, min.x, min.y)
/// d1 = (min.z, max.x, max.y, max.z)
/// ```
///
/// Indices are stored as floats, so they're exact up to 2^24.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BvhNode {
    pub d0: Vec4,
    pub d1: Vec4,
}

impl BvhNode {
    pub const PIXELS: u32 = 2;
    pub const CHANNELS: u32 = 4;

    pub fn new(
        left_index: i32,
        parent_index: i32,
        min: Vec3,
        max: Vec3,
    ) -> Self {
        Self {
            d0: vec4(left_index as f32, parent_index as f32, min.x, min.y),
            d1: vec4(min.z, max.x, max.y, max.z),
        }
    }

    pub fn left_index(&self) -> i32 {
        self.d0.x as i32
    }

    pub fn parent_index(&self) -> i32 {
        self.d0.y as i32
    }

    pub fn is_leaf(&self) -> bool {
        self.left_index() < 0
    }

    /// Returns index of the triangle referenced by this leaf.
    pub fn triangle_index(&self) -> Option<u32> {
        if self.is_leaf() {
            Some((-self.left_index() - 1) as u32)
        } else {
            None
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.d0.z, self.d0.w, self.d1.x)
    }

    pub fn max(&self) -> Vec3 {
        self.d1.yzw()
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    fn leaf() {
        let node =
            BvhNode::new(-4, 7, vec3(1.0, 2.0, 3.0), vec3(4.0, 5.0, 6.0));

        assert!(node.is_leaf());
        assert_eq!(Some(3), node.triangle_index());
        assert_eq!(7, node.parent_index());
        assert_eq!(vec3(1.0, 2.0, 3.0), node.min());
        assert_eq!(vec3(4.0, 5.0, 6.0), node.max());
    }

    #[test]
    fn internal() {
        let node = BvhNode::new(0, -1, Vec3::ZERO, Vec3::ONE);

        assert!(!node.is_leaf());
        assert_eq!(None, node.triangle_index());
        assert_eq!(-1, node.parent_index());
    }
}
