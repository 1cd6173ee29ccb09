use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4, Vec4Swizzles};

/// Material, as seen by the tracing program.
///
/// Layout (twenty floats, texture slots are `-1.0` when absent):
///
/// ```text
/// d0 = (albedo_tex, roughness_tex, metalness_tex, normal_tex)
/// d1 = (emission_tex, opacity_tex, transmission_tex, opacity)
/// d2 = (base_color.rgb, transmission)
/// d3 = (emissive.rgb, ior)
/// d4 = (roughness, metalness, -, -)
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Material {
    pub d0: Vec4,
    pub d1: Vec4,
    pub d2: Vec4,
    pub d3: Vec4,
    pub d4: Vec4,
}

impl Material {
    pub const PIXELS: u32 = 5;
    pub const CHANNELS: u32 = 4;

    pub fn albedo_texture(&self) -> Option<u32> {
        Self::texture(self.d0.x)
    }

    pub fn roughness_texture(&self) -> Option<u32> {
        Self::texture(self.d0.y)
    }

    pub fn metalness_texture(&self) -> Option<u32> {
        Self::texture(self.d0.z)
    }

    pub fn normal_texture(&self) -> Option<u32> {
        Self::texture(self.d0.w)
    }

    pub fn emission_texture(&self) -> Option<u32> {
        Self::texture(self.d1.x)
    }

    pub fn opacity_texture(&self) -> Option<u32> {
        Self::texture(self.d1.y)
    }

    pub fn transmission_texture(&self) -> Option<u32> {
        Self::texture(self.d1.z)
    }

    pub fn opacity(&self) -> f32 {
        self.d1.w
    }

    pub fn base_color(&self) -> Vec3 {
        self.d2.xyz()
    }

    pub fn transmission(&self) -> f32 {
        self.d2.w
    }

    pub fn emissive(&self) -> Vec3 {
        self.d3.xyz()
    }

    pub fn ior(&self) -> f32 {
        self.d3.w
    }

    pub fn roughness(&self) -> f32 {
        self.d4.x
    }

    pub fn metalness(&self) -> f32 {
        self.d4.y
    }

    /// Encodes an optional texture slot (`None` becomes `-1.0`).
    pub fn encode_texture(slot: Option<u32>) -> f32 {
        slot.map_or(-1.0, |slot| slot as f32)
    }

    fn texture(value: f32) -> Option<u32> {
        if value < 0.0 {
            None
        } else {
            Some(value as u32)
        }
    }
}
