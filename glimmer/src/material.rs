use std::sync::Arc;

use glam::Vec3;

use crate::Texture;

/// Texture slots a material can fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Albedo,
    Roughness,
    Metalness,
    Normal,
    Emission,
    Opacity,
    Transmission,
}

impl TextureSlot {
    pub const COUNT: usize = 7;

    pub fn all() -> [Self; Self::COUNT] {
        [
            Self::Albedo,
            Self::Roughness,
            Self::Metalness,
            Self::Normal,
            Self::Emission,
            Self::Opacity,
            Self::Transmission,
        ]
    }

    pub fn index(self) -> usize {
        match self {
            Self::Albedo => 0,
            Self::Roughness => 1,
            Self::Metalness => 2,
            Self::Normal => 3,
            Self::Emission => 4,
            Self::Opacity => 5,
            Self::Transmission => 6,
        }
    }
}

/// Surface description, as authored.
///
/// Every property is optional - whatever's missing gets its default when the
/// scene is flattened (see [`crate::MaterialRecord`]).
///
/// Materials are identified by their `Arc`, so a material shared between many
/// drawables is stored just once.
#[derive(Clone, Debug, Default)]
pub struct Material {
    color: Option<Vec3>,
    opacity: Option<f32>,
    roughness: Option<f32>,
    metalness: Option<f32>,
    transmission: Option<f32>,
    ior: Option<f32>,
    emissive: Option<Vec3>,
    emissive_intensity: Option<f32>,
    textures: [Option<Arc<Texture>>; TextureSlot::COUNT],
}

impl Material {
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = Some(roughness);
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = Some(metalness);
        self
    }

    pub fn with_transmission(mut self, transmission: f32) -> Self {
        self.transmission = Some(transmission);
        self
    }

    pub fn with_ior(mut self, ior: f32) -> Self {
        self.ior = Some(ior);
        self
    }

    pub fn with_emissive(mut self, emissive: Vec3) -> Self {
        self.emissive = Some(emissive);
        self
    }

    pub fn with_emissive_intensity(mut self, emissive_intensity: f32) -> Self {
        self.emissive_intensity = Some(emissive_intensity);
        self
    }

    pub fn with_texture(
        mut self,
        slot: TextureSlot,
        texture: Arc<Texture>,
    ) -> Self {
        self.textures[slot.index()] = Some(texture);
        self
    }

    pub fn color(&self) -> Option<Vec3> {
        self.color
    }

    pub fn opacity(&self) -> Option<f32> {
        self.opacity
    }

    pub fn roughness(&self) -> Option<f32> {
        self.roughness
    }

    pub fn metalness(&self) -> Option<f32> {
        self.metalness
    }

    pub fn transmission(&self) -> Option<f32> {
        self.transmission
    }

    pub fn ior(&self) -> Option<f32> {
        self.ior
    }

    pub fn emissive(&self) -> Option<Vec3> {
        self.emissive
    }

    pub fn emissive_intensity(&self) -> Option<f32> {
        self.emissive_intensity
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<&Arc<Texture>> {
        self.textures[slot.index()].as_ref()
    }
}
