use bytemuck::{Pod, Zeroable};
use glam::{vec4, Vec2, Vec4, Vec4Swizzles};

/// Describes where a texture lives within the atlas and how its UVs should be
/// transformed before sampling.
///
/// Layout:
///
/// ```text
/// d0 = (size.x, size.y, flip_y, rotation)
/// d1 = (repeat.x, repeat.y, offset.x, offset.y)
/// ```
///
/// `size` is relative to the atlas' layer size, since every texture occupies
/// the top-left corner of its own layer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TextureInfo {
    pub d0: Vec4,
    pub d1: Vec4,
}

impl TextureInfo {
    pub const PIXELS: u32 = 2;
    pub const CHANNELS: u32 = 4;

    pub fn new(
        size: Vec2,
        flip_y: bool,
        rotation: f32,
        repeat: Vec2,
        offset: Vec2,
    ) -> Self {
        Self {
            d0: vec4(size.x, size.y, flip_y as u32 as f32, rotation),
            d1: vec4(repeat.x, repeat.y, offset.x, offset.y),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.d0.xy()
    }

    pub fn flip_y(&self) -> bool {
        self.d0.z > 0.5
    }

    pub fn rotation(&self) -> f32 {
        self.d0.w
    }

    pub fn repeat(&self) -> Vec2 {
        self.d1.xy()
    }

    pub fn offset(&self) -> Vec2 {
        self.d1.zw()
    }
}
