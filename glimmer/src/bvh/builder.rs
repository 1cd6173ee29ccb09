use super::{BoundingBox, Bvh, BvhNode, BvhTriangle};

/// Builds BVH by recursively splitting triangles at the spatial median of the
/// longest axis.
///
/// Nodes are emitted bottom-up (children always precede the node that points
/// at them), with the root pushed last.
pub fn build(mut triangles: Vec<BvhTriangle>) -> Bvh {
    if triangles.is_empty() {
        return Bvh::default();
    }

    let mut builder = Builder {
        nodes: Vec::with_capacity(2 * triangles.len() + 1),
    };

    let (left_index, bb) = builder.build(&mut triangles);

    builder.push(BvhNode::internal(left_index, bb));

    Bvh::new(builder.nodes)
}

struct Builder {
    nodes: Vec<BvhNode>,
}

impl Builder {
    /// Builds subtree for given triangles, returning the slot of its first
    /// child and its bounding box.
    fn build(&mut self, triangles: &mut [BvhTriangle]) -> (i32, BoundingBox) {
        match triangles {
            // Singletons get duplicated so that each internal node always has
            // two children slots
            [tri] => {
                let leaf = BvhNode::leaf(tri.triangle_index, tri.bb);

                (self.push_pair(leaf, leaf), tri.bb)
            }

            [a, b] => {
                let left = BvhNode::leaf(a.triangle_index, a.bb);
                let right = BvhNode::leaf(b.triangle_index, b.bb);

                (self.push_pair(left, right), a.bb + b.bb)
            }

            _ => {
                let bb = triangles[1..]
                    .iter()
                    .fold(triangles[0].bb, |bb, tri| bb + tri.bb);

                let axis = bb.longest_axis().index();

                triangles.sort_by(|a, b| {
                    a.bb.min()[axis].total_cmp(&b.bb.min()[axis])
                });

                let mid = (triangles.len() + 1) / 2;
                let (left, right) = triangles.split_at_mut(mid);
                let (left_index, left_bb) = self.build(left);
                let (right_index, right_bb) = self.build(right);

                let idx = self.push_pair(
                    BvhNode::internal(left_index, left_bb),
                    BvhNode::internal(right_index, right_bb),
                );

                (idx, left_bb + right_bb)
            }
        }
    }

    fn push_pair(&mut self, left: BvhNode, right: BvhNode) -> i32 {
        let idx = self.nodes.len();

        self.push(left);
        self.push(right);

        idx as i32
    }

    fn push(&mut self, node: BvhNode) {
        let idx = self.nodes.len() as i32;

        if let Some(children) = node.children() {
            for child in children {
                self.nodes[child].parent_index = idx;
            }
        }

        self.nodes.push(node);
    }
}
