use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TracePassParams {
    /// Number of the sample being produced, starting from one; the new sample
    /// is blended with the history using weight `1 / sample_count`
    pub sample_count: u32,
    pub max_depth: u32,
    pub seed: u32,
    pub triangle_count: u32,
    pub texture_count: u32,
    pub has_environment: u32,
    pub environment_intensity: f32,

    /// Index of BVH's root node; meaningless when there are no triangles
    pub bvh_root: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DisplayPassParams {
    pub sample_count: u32,
    pub apply_gamma: u32,
    pub exposure: f32,
    pub _pad0: u32,
}
