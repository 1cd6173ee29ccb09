mod axis;
mod bounding_box;
mod builder;
mod bvh_node;
mod bvh_triangle;

use glam::Vec3;

pub use self::axis::*;
pub use self::bounding_box::*;
pub use self::bvh_node::*;
pub use self::bvh_triangle::*;
use crate::gpu;

/// Flattened bounding volume hierarchy.
///
/// The root is always the last node; an empty BVH has no nodes at all.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
}

impl Bvh {
    fn new(nodes: Vec<BvhNode>) -> Self {
        Self { nodes }
    }

    /// Builds BVH for triangles described by given vertex positions and
    /// triangle-list indices.
    ///
    /// Triangles referring to vertices past `positions` are left out of the
    /// tree (with a warning); the remaining ones keep their original indices.
    pub fn from_triangles(positions: &[Vec3], indices: &[u32]) -> Self {
        let triangles = indices
            .chunks_exact(3)
            .enumerate()
            .filter_map(|(triangle_index, tri)| {
                let vertex = |nth: usize| positions.get(tri[nth] as usize);

                match (vertex(0), vertex(1), vertex(2)) {
                    (Some(&a), Some(&b), Some(&c)) => {
                        let triangle_index = triangle_index as u32;

                        Some(BvhTriangle::new(triangle_index, [a, b, c]))
                    }

                    _ => {
                        log::warn!(
                            "Triangle {triangle_index} refers to a missing \
                             vertex; skipping it"
                        );

                        None
                    }
                }
            })
            .collect();

        Self::build(triangles)
    }

    pub fn build(triangles: Vec<BvhTriangle>) -> Self {
        builder::build(triangles)
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.nodes.last()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn serialize(&self) -> Vec<gpu::BvhNode> {
        self.nodes.iter().map(BvhNode::serialize).collect()
    }
}
