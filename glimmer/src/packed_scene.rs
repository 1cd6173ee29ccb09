use std::sync::Arc;

use glam::UVec2;

use crate::{gpu, EncodedBuffer, FlattenedScene, Result, Texture};

/// Flattened scene encoded into float grids, ready to be uploaded.
#[derive(Clone, Debug)]
pub struct PackedScene {
    pub positions: EncodedBuffer,
    pub normals: EncodedBuffer,
    pub uvs: EncodedBuffer,
    pub tangents: EncodedBuffer,
    pub indices: EncodedBuffer,
    pub materials: EncodedBuffer,
    pub material_indices: EncodedBuffer,
    pub bvh: EncodedBuffer,
    pub texture_infos: EncodedBuffer,
    pub atlas: PackedAtlas,
    pub triangle_count: u32,

    /// Index of BVH's root node, if there are any triangles
    pub bvh_root: Option<u32>,
}

/// Textures of the scene, one per layer of an array texture.
#[derive(Clone, Debug)]
pub struct PackedAtlas {
    /// Size of each layer; every texture occupies the top-left corner of its
    /// layer
    pub layer_size: UVec2,

    pub layers: Vec<Arc<Texture>>,
}

impl PackedScene {
    pub fn new(scene: &FlattenedScene, max_row_width: u32) -> Result<Self> {
        let positions = EncodedBuffer::encode_pod(
            "positions",
            &scene.positions,
            1,
            3,
            max_row_width,
        )?;

        let normals = EncodedBuffer::encode_pod(
            "normals",
            &scene.normals,
            1,
            3,
            max_row_width,
        )?;

        let uvs =
            EncodedBuffer::encode_pod("uvs", &scene.uvs, 1, 2, max_row_width)?;

        let tangents = EncodedBuffer::encode_pod(
            "tangents",
            &scene.tangents,
            1,
            4,
            max_row_width,
        )?;

        let indices = EncodedBuffer::encode(
            "indices",
            scene.triangle_count(),
            1,
            3,
            max_row_width,
            scene.indices.iter().map(|&idx| idx as f32),
        )?;

        let materials = scene
            .materials
            .iter()
            .map(|material| material.serialize())
            .collect::<Vec<_>>();

        let materials = EncodedBuffer::encode_pod(
            "materials",
            &materials,
            gpu::Material::PIXELS,
            gpu::Material::CHANNELS,
            max_row_width,
        )?;

        let material_indices = EncodedBuffer::encode(
            "material_indices",
            scene.triangle_count(),
            1,
            1,
            max_row_width,
            scene.material_indices.iter().map(|&idx| idx as f32),
        )?;

        let bvh = EncodedBuffer::encode_pod(
            "bvh",
            &scene.bvh.serialize(),
            gpu::BvhNode::PIXELS,
            gpu::BvhNode::CHANNELS,
            max_row_width,
        )?;

        let texture_infos = EncodedBuffer::encode_pod(
            "texture_infos",
            &scene.atlas.describe(),
            gpu::TextureInfo::PIXELS,
            gpu::TextureInfo::CHANNELS,
            max_row_width,
        )?;

        let atlas = PackedAtlas {
            layer_size: scene.atlas.layer_size(),
            layers: scene.atlas.textures().to_vec(),
        };

        let bvh_root = scene.bvh.len().checked_sub(1).map(|idx| idx as u32);

        Ok(Self {
            positions,
            normals,
            uvs,
            tangents,
            indices,
            materials,
            material_indices,
            bvh,
            texture_infos,
            atlas,
            triangle_count: scene.triangle_count() as u32,
            bvh_root,
        })
    }

    /// Returns all buffers, in the order they are bound in.
    pub fn buffers(&self) -> [&EncodedBuffer; 9] {
        [
            &self.positions,
            &self.normals,
            &self.uvs,
            &self.tangents,
            &self.indices,
            &self.materials,
            &self.material_indices,
            &self.bvh,
            &self.texture_infos,
        ]
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec3, Affine3A};
    use image::RgbaImage;

    use super::*;
    use crate::{
        Drawable, Material, Mesh, Scene, SceneNode, TextureSlot,
    };

    fn scene() -> FlattenedScene {
        let mesh = Arc::new(Mesh::new(vec![
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
        ]));

        let material = Arc::new(
            Material::default()
                .with_color(vec3(0.5, 0.25, 0.125))
                .with_texture(
                    TextureSlot::Albedo,
                    Arc::new(Texture::new(RgbaImage::new(8, 4))),
                ),
        );

        let mut root = SceneNode::default();

        for i in 0..3 {
            root = root.with_child(
                SceneNode::new(Affine3A::from_translation(vec3(
                    i as f32 * 2.0,
                    0.0,
                    0.0,
                )))
                .with_drawable(
                    Drawable::new(Arc::clone(&mesh))
                        .with_material(Arc::clone(&material)),
                ),
            );
        }

        FlattenedScene::new(&Scene::new(root))
    }

    #[test]
    fn layout() {
        let target = PackedScene::new(&scene(), 4).unwrap();

        assert_eq!(uvec2(4, 3), target.positions.size());
        assert_eq!(3, target.positions.channels());
        assert_eq!(uvec2(4, 3), target.normals.size());
        assert_eq!(2, target.uvs.channels());
        assert_eq!(4, target.tangents.channels());
        assert_eq!(uvec2(3, 1), target.indices.size());
        assert_eq!(uvec2(4, 2), target.materials.size());
        assert_eq!(uvec2(3, 1), target.material_indices.size());
        assert_eq!(1, target.material_indices.channels());
        assert_eq!(uvec2(2, 1), target.texture_infos.size());
        assert_eq!(3, target.triangle_count);
        assert_eq!(uvec2(8, 4), target.atlas.layer_size);
        assert_eq!(1, target.atlas.layers.len());
    }

    #[test]
    fn contents() {
        let scene = scene();
        let target = PackedScene::new(&scene, 4).unwrap();

        assert_eq!(&[2.0, 0.0, 0.0], target.positions.pixel(3, 0));
        assert_eq!(&[6.0, 7.0, 8.0], target.indices.pixel(2, 0));
        assert_eq!(&[0.0], target.material_indices.pixel(1, 0));

        // base color + transmission
        assert_eq!(&[0.5, 0.25, 0.125, 0.0], target.materials.pixel(0, 2));

        // albedo texture lives in the first layer
        assert_eq!(0.0, target.materials.pixel(0, 0)[0]);

        let root = scene.bvh.root().unwrap().serialize();

        assert_eq!(
            bytemuck::cast_slice::<_, f32>(&[root.d0]),
            target.bvh.pixel(target.bvh_root.unwrap(), 0),
        );
    }

    #[test]
    fn empty_scene() {
        let target =
            PackedScene::new(&FlattenedScene::default(), 1024).unwrap();

        for buffer in target.buffers() {
            assert_eq!(uvec2(1, 1), buffer.size(), "{}", buffer.label());
        }

        assert_eq!(0, target.triangle_count);
        assert_eq!(None, target.bvh_root);
        assert!(target.atlas.layers.is_empty());
    }
}
