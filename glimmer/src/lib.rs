//! Progressive path-tracing core.
//!
//! Scenes are flattened into world-space triangle soup, indexed with a BVH,
//! packed into float textures and then traced one sample per frame, with each
//! frame blended into a running average - so the image converges for as long
//! as nothing changes.
//!
//! Rendering itself is driven by [`Renderer`], which is generic over a
//! [`Backend`]; [`WgpuBackend`] is the one that actually talks to the GPU.

mod accumulator;
mod atlas;
mod backend;
mod bvh;
mod camera;
mod config;
mod encoded_buffer;
mod error;
mod flattener;
mod material;
mod material_record;
mod mesh;
mod metrics;
mod packed_scene;
mod renderer;
mod scene;
mod texture;
mod wgpu_backend;

pub use glimmer_gpu as gpu;

pub use self::accumulator::*;
pub use self::atlas::*;
pub use self::backend::*;
pub use self::bvh::*;
pub use self::camera::*;
pub use self::config::*;
pub use self::encoded_buffer::*;
pub use self::error::*;
pub use self::flattener::*;
pub use self::material::*;
pub use self::material_record::*;
pub use self::mesh::*;
pub use self::packed_scene::*;
pub use self::renderer::*;
pub use self::scene::*;
pub use self::texture::*;
pub use self::wgpu_backend::*;
