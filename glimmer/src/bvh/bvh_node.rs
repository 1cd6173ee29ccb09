use super::BoundingBox;
use crate::gpu;

/// Node of the flattened BVH.
///
/// Children of an internal node always occupy two consecutive slots,
/// `left_index` and `left_index + 1`; a negative `left_index` marks a leaf
/// pointing at triangle `-left_index - 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BvhNode {
    pub left_index: i32,
    pub parent_index: i32,
    pub bb: BoundingBox,
}

impl BvhNode {
    pub fn leaf(triangle_index: u32, bb: BoundingBox) -> Self {
        Self {
            left_index: -(triangle_index as i32) - 1,
            parent_index: -1,
            bb,
        }
    }

    pub fn internal(left_index: i32, bb: BoundingBox) -> Self {
        Self {
            left_index,
            parent_index: -1,
            bb,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left_index < 0
    }

    pub fn triangle_index(&self) -> Option<u32> {
        self.is_leaf().then(|| (-self.left_index - 1) as u32)
    }

    /// Returns slots of both children, if this is an internal node.
    pub fn children(&self) -> Option<[usize; 2]> {
        if self.is_leaf() {
            None
        } else {
            let left = self.left_index as usize;

            Some([left, left + 1])
        }
    }

    pub fn serialize(&self) -> gpu::BvhNode {
        gpu::BvhNode::new(
            self.left_index,
            self.parent_index,
            self.bb.min(),
            self.bb.max(),
        )
    }
}
