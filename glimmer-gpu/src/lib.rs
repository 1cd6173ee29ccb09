//! Plain-old-data layouts shared by Glimmer's renderer and its GPU programs,
//! together with the grid addressing used to encode and decode them.

mod bvh_node;
mod camera;
mod grid;
mod material;
mod passes;
mod texture_info;

pub use self::bvh_node::*;
pub use self::camera::*;
pub use self::grid::*;
pub use self::material::*;
pub use self::passes::*;
pub use self::texture_info::*;
