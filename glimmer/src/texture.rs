use derivative::Derivative;
use glam::{uvec2, vec2, UVec2, Vec2};
use image::RgbaImage;

/// Already-decoded texture referenced by materials.
///
/// Textures are identified by their `Arc` - two materials pointing at the
/// same `Arc<Texture>` share a single atlas layer, while two textures with
/// equal pixels but separate allocations don't.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Texture {
    #[derivative(Debug = "ignore")]
    image: RgbaImage,
    flip_y: bool,
    rotation: f32,
    repeat: Vec2,
    offset: Vec2,
}

impl Texture {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            flip_y: true,
            rotation: 0.0,
            repeat: Vec2::ONE,
            offset: Vec2::ZERO,
        }
    }

    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    /// Sets rotation of UVs, in radians.
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_repeat(mut self, repeat: Vec2) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn size(&self) -> UVec2 {
        uvec2(self.image.width(), self.image.height())
    }

    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn repeat(&self) -> Vec2 {
        self.repeat
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Returns size of this texture relative to given atlas layer size.
    pub fn relative_size(&self, layer_size: UVec2) -> Vec2 {
        let size = self.size().as_vec2();

        vec2(size.x / layer_size.x as f32, size.y / layer_size.y as f32)
    }
}
