use glam::{vec4, Vec3};

use crate::{gpu, Material, TextureSlot};

/// Material with all of its defaults applied and textures resolved into atlas
/// layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialRecord {
    pub textures: [Option<u32>; TextureSlot::COUNT],
    pub opacity: f32,
    pub base_color: Vec3,
    pub transmission: f32,
    pub emissive: Vec3,
    pub ior: f32,
    pub roughness: f32,
    pub metalness: f32,
}

impl MaterialRecord {
    /// Resolves given material, using `texture_id` to map its textures into
    /// atlas layers.
    pub fn new(
        material: &Material,
        mut texture_id: impl FnMut(TextureSlot) -> Option<u32>,
    ) -> Self {
        let default = Self::default();
        let mut textures = default.textures;

        for slot in TextureSlot::all() {
            textures[slot.index()] = texture_id(slot);
        }

        let emissive = material.emissive().unwrap_or(default.emissive)
            * material.emissive_intensity().unwrap_or(1.0);

        Self {
            textures,
            opacity: material.opacity().unwrap_or(default.opacity),
            base_color: material.color().unwrap_or(default.base_color),
            transmission: material
                .transmission()
                .unwrap_or(default.transmission),
            emissive,
            ior: material.ior().unwrap_or(default.ior),
            roughness: material.roughness().unwrap_or(default.roughness),
            metalness: material.metalness().unwrap_or(default.metalness),
        }
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<u32> {
        self.textures[slot.index()]
    }

    pub fn serialize(&self) -> gpu::Material {
        let tex =
            |slot| gpu::Material::encode_texture(self.texture(slot));

        gpu::Material {
            d0: vec4(
                tex(TextureSlot::Albedo),
                tex(TextureSlot::Roughness),
                tex(TextureSlot::Metalness),
                tex(TextureSlot::Normal),
            ),
            d1: vec4(
                tex(TextureSlot::Emission),
                tex(TextureSlot::Opacity),
                tex(TextureSlot::Transmission),
                self.opacity,
            ),
            d2: self.base_color.extend(self.transmission),
            d3: self.emissive.extend(self.ior),
            d4: vec4(self.roughness, self.metalness, 0.0, 0.0),
        }
    }
}

impl Default for MaterialRecord {
    fn default() -> Self {
        Self {
            textures: [None; TextureSlot::COUNT],
            opacity: 1.0,
            base_color: Vec3::ONE,
            transmission: 0.0,
            emissive: Vec3::ZERO,
            ior: 1.0,
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    fn defaults() {
        let record = MaterialRecord::new(&Material::default(), |_| None);

        assert_eq!(MaterialRecord::default(), record);

        let material = record.serialize();

        assert_eq!(None, material.albedo_texture());
        assert_eq!(None, material.transmission_texture());
        assert_eq!(1.0, material.opacity());
        assert_eq!(Vec3::ONE, material.base_color());
        assert_eq!(0.0, material.transmission());
        assert_eq!(Vec3::ZERO, material.emissive());
        assert_eq!(1.0, material.ior());
        assert_eq!(1.0, material.roughness());
        assert_eq!(0.0, material.metalness());
    }

    #[test]
    fn emission_is_scaled_by_intensity() {
        let material = Material::default()
            .with_emissive(vec3(1.0, 0.5, 0.25))
            .with_emissive_intensity(4.0);

        let record = MaterialRecord::new(&material, |_| None);

        assert_eq!(vec3(4.0, 2.0, 1.0), record.emissive);
    }

    #[test]
    fn serialize() {
        let material = Material::default()
            .with_color(vec3(0.1, 0.2, 0.3))
            .with_opacity(0.5)
            .with_roughness(0.25)
            .with_metalness(0.75)
            .with_transmission(0.125)
            .with_ior(1.5);

        let record = MaterialRecord::new(&material, |slot| match slot {
            TextureSlot::Albedo => Some(3),
            TextureSlot::Normal => Some(0),
            _ => None,
        });

        let material = record.serialize();

        assert_eq!(Some(3), material.albedo_texture());
        assert_eq!(None, material.roughness_texture());
        assert_eq!(None, material.metalness_texture());
        assert_eq!(Some(0), material.normal_texture());
        assert_eq!(None, material.emission_texture());
        assert_eq!(0.5, material.opacity());
        assert_eq!(vec3(0.1, 0.2, 0.3), material.base_color());
        assert_eq!(0.125, material.transmission());
        assert_eq!(1.5, material.ior());
        assert_eq!(0.25, material.roughness());
        assert_eq!(0.75, material.metalness());
    }
}
