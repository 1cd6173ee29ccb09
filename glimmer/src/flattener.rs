use std::sync::Arc;

use fxhash::FxHashMap;
use glam::{Affine3A, Mat3, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::{
    Atlas, Bvh, Drawable, Material, MaterialRecord, Scene, TextureSlot,
};

/// Scene converted into flat arrays of world-space geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlattenedScene {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub tangents: Vec<Vec4>,

    /// Three indices per triangle, pointing into the vertex arrays above
    pub indices: Vec<u32>,

    /// One index per triangle, pointing into `materials`
    pub material_indices: Vec<u32>,

    pub materials: Vec<MaterialRecord>,
    pub atlas: Atlas,
    pub bvh: Bvh,
}

impl FlattenedScene {
    /// Flattens given scene; the scene itself is left untouched.
    pub fn new(scene: &Scene) -> Self {
        let mut flattener = Flattener::default();

        scene.traverse(|node, xform| {
            if let Some(drawable) = node.drawable() {
                flattener.add(drawable, xform);
            }
        });

        flattener.finish()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.material_indices.len()
    }
}

#[derive(Default)]
struct Flattener {
    scene: FlattenedScene,
    material_ids: FxHashMap<usize, u32>,
    default_material_id: Option<u32>,
}

impl Flattener {
    fn add(&mut self, drawable: &Drawable, xform: Affine3A) {
        let mesh = drawable.mesh().resolve();
        let vertex_count = mesh.positions.len();
        let vertex_offset = self.scene.positions.len() as u32;

        let material_ids: Vec<_> = drawable
            .materials()
            .iter()
            .map(|material| self.material_id(material))
            .collect();

        let normal_xform = Mat3::from(xform.matrix3).inverse().transpose();

        self.scene.positions.extend(
            mesh.positions.iter().map(|&pos| xform.transform_point3(pos)),
        );

        self.scene.normals.extend(
            mesh.normals
                .iter()
                .map(|&normal| (normal_xform * normal).normalize_or_zero()),
        );

        self.scene.uvs.extend(mesh.uvs.iter().copied());

        self.scene.tangents.extend(mesh.tangents.iter().map(|&tangent| {
            xform
                .transform_vector3(tangent.xyz())
                .normalize_or_zero()
                .extend(tangent.w)
        }));

        for (group_idx, group) in mesh.groups.iter().enumerate() {
            let slot = group.material_index.unwrap_or(group_idx as u32);

            let material_id = if drawable.materials().is_empty() {
                self.default_material_id()
            } else if let Some(&id) = material_ids.get(slot as usize) {
                id
            } else {
                log::warn!(
                    "Mesh group #{group_idx} refers to material #{slot}, but \
                     its drawable has only {} materials; using the default one",
                    material_ids.len(),
                );

                self.default_material_id()
            };

            let start = (group.start as usize).min(mesh.indices.len());

            let end = (group.start as usize + group.count as usize)
                .min(mesh.indices.len());

            for tri in mesh.indices[start..end].chunks_exact(3) {
                if tri.iter().any(|&idx| idx as usize >= vertex_count) {
                    log::warn!(
                        "Skipping triangle {tri:?} - it refers to vertices \
                         out of the mesh (which has {vertex_count} of them)"
                    );

                    continue;
                }

                self.scene
                    .indices
                    .extend(tri.iter().map(|&idx| vertex_offset + idx));

                self.scene.material_indices.push(material_id);
            }
        }
    }

    fn material_id(&mut self, material: &Arc<Material>) -> u32 {
        let key = Arc::as_ptr(material) as usize;

        if let Some(&id) = self.material_ids.get(&key) {
            return id;
        }

        let id = self.push_material(material);

        self.material_ids.insert(key, id);
        id
    }

    fn default_material_id(&mut self) -> u32 {
        if let Some(id) = self.default_material_id {
            return id;
        }

        let id = self.push_material(&Material::default());

        self.default_material_id = Some(id);
        id
    }

    fn push_material(&mut self, material: &Material) -> u32 {
        let atlas = &mut self.scene.atlas;

        let record = MaterialRecord::new(material, |slot: TextureSlot| {
            material.texture(slot).map(|texture| atlas.register(texture))
        });

        self.scene.materials.push(record);

        (self.scene.materials.len() - 1) as u32
    }

    fn finish(mut self) -> FlattenedScene {
        self.scene.bvh =
            Bvh::from_triangles(&self.scene.positions, &self.scene.indices);

        self.scene
    }
}

#[cfg(test)]
mod tests {
    use glam::{vec2, vec3};
    use image::RgbaImage;

    use super::*;
    use crate::{Mesh, MeshGroup, SceneNode, Texture};

    fn triangle() -> Arc<Mesh> {
        Arc::new(Mesh::new(vec![
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
        ]))
    }

    fn quad() -> Mesh {
        Mesh::new(vec![
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(1.0, 1.0, 0.0),
            vec3(0.0, 1.0, 0.0),
        ])
        .with_indices(vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn empty_scene() {
        let target = FlattenedScene::new(&Scene::default());

        assert_eq!(0, target.vertex_count());
        assert_eq!(0, target.triangle_count());
        assert!(target.materials.is_empty());
        assert!(target.bvh.is_empty());
    }

    #[test]
    fn offsets_and_transforms() {
        let mesh = triangle();

        let scene = Scene::new(
            SceneNode::default()
                .with_drawable(Drawable::new(Arc::clone(&mesh)))
                .with_child(
                    SceneNode::new(Affine3A::from_translation(vec3(
                        0.0, 0.0, -5.0,
                    )))
                    .with_drawable(Drawable::new(mesh)),
                ),
        );

        let target = FlattenedScene::new(&scene);

        assert_eq!(6, target.vertex_count());
        assert_eq!(vec![0, 1, 2, 3, 4, 5], target.indices);
        assert_eq!(vec![0, 0], target.material_indices);
        assert_eq!(1, target.materials.len());
        assert_eq!(MaterialRecord::default(), target.materials[0]);
        assert_eq!(vec3(1.0, 0.0, -5.0), target.positions[4]);
        assert_eq!(3, target.bvh.len());
    }

    #[test]
    fn normals_and_tangents_follow_transform() {
        let mesh = Arc::new(
            Mesh::new(vec![
                vec3(0.0, 0.0, 0.0),
                vec3(1.0, 0.0, 0.0),
                vec3(0.0, 1.0, 0.0),
            ])
            .with_normals(vec![Vec3::Z; 3])
            .with_tangents(vec![vec4_x(-1.0); 3]),
        );

        let scene = Scene::new(
            SceneNode::new(
                Affine3A::from_rotation_y(std::f32::consts::FRAC_PI_2)
                    * Affine3A::from_scale(vec3(4.0, 1.0, 1.0)),
            )
            .with_drawable(Drawable::new(mesh)),
        );

        let target = FlattenedScene::new(&scene);

        assert!(target.normals[0].abs_diff_eq(Vec3::X, 1e-5));
        assert!(target.tangents[0].xyz().abs_diff_eq(-Vec3::Z, 1e-5));
        assert_eq!(-1.0, target.tangents[0].w);
    }

    fn vec4_x(w: f32) -> Vec4 {
        Vec3::X.extend(w)
    }

    #[test]
    fn groups() {
        let red = Arc::new(Material::default().with_color(vec3(1.0, 0.0, 0.0)));
        let blue = Arc::new(Material::default().with_color(vec3(0.0, 0.0, 1.0)));

        let mesh = quad()
            .with_group(MeshGroup {
                start: 0,
                count: 3,
                material_index: Some(1),
            })
            .with_group(MeshGroup {
                start: 3,
                count: 3,
                material_index: None,
            });

        let scene = Scene::new(
            SceneNode::default().with_drawable(
                Drawable::new(Arc::new(mesh))
                    .with_material(Arc::clone(&red))
                    .with_material(blue),
            ),
        );

        let target = FlattenedScene::new(&scene);

        assert_eq!(2, target.materials.len());
        assert_eq!(vec3(1.0, 0.0, 0.0), target.materials[0].base_color);
        assert_eq!(vec3(0.0, 0.0, 1.0), target.materials[1].base_color);
        assert_eq!(vec![1, 1], target.material_indices);
    }

    #[test]
    fn group_with_unknown_material_falls_back_to_default() {
        let mesh = quad().with_group(MeshGroup {
            start: 0,
            count: 6,
            material_index: Some(7),
        });

        let scene = Scene::new(SceneNode::default().with_drawable(
            Drawable::new(Arc::new(mesh)).with_material(Arc::new(
                Material::default().with_roughness(0.25),
            )),
        ));

        let target = FlattenedScene::new(&scene);

        assert_eq!(2, target.materials.len());
        assert_eq!(MaterialRecord::default(), target.materials[1]);
        assert_eq!(vec![1, 1], target.material_indices);
    }

    #[test]
    fn shared_materials_and_textures() {
        let texture = Arc::new(Texture::new(RgbaImage::new(2, 2)));

        let a = Arc::new(
            Material::default()
                .with_texture(TextureSlot::Albedo, Arc::clone(&texture)),
        );

        let b = Arc::new(
            Material::default()
                .with_texture(TextureSlot::Normal, Arc::clone(&texture))
                .with_texture(
                    TextureSlot::Emission,
                    Arc::new(Texture::new(RgbaImage::new(4, 4))),
                ),
        );

        let scene = Scene::new(
            SceneNode::default()
                .with_drawable(
                    Drawable::new(triangle()).with_material(Arc::clone(&a)),
                )
                .with_child(SceneNode::default().with_drawable(
                    Drawable::new(triangle()).with_material(Arc::clone(&b)),
                ))
                .with_child(
                    SceneNode::default()
                        .with_drawable(Drawable::new(triangle()).with_material(a)),
                ),
        );

        let target = FlattenedScene::new(&scene);

        assert_eq!(2, target.materials.len());
        assert_eq!(vec![0, 1, 0], target.material_indices);
        assert_eq!(2, target.atlas.len());
        assert_eq!(Some(0), target.materials[0].texture(TextureSlot::Albedo));
        assert_eq!(Some(0), target.materials[1].texture(TextureSlot::Normal));
        assert_eq!(Some(1), target.materials[1].texture(TextureSlot::Emission));
    }

    #[test]
    fn out_of_range_triangles_are_skipped() {
        let mesh = Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
            .with_indices(vec![0, 1, 2, 0, 1, 9]);

        let scene = Scene::new(
            SceneNode::default().with_drawable(Drawable::new(Arc::new(mesh))),
        );

        let target = FlattenedScene::new(&scene);

        assert_eq!(vec![0, 1, 2], target.indices);
        assert_eq!(1, target.triangle_count());
    }

    #[test]
    fn missing_uvs_are_zeroed() {
        let scene = Scene::new(
            SceneNode::default().with_drawable(Drawable::new(triangle())),
        );

        let target = FlattenedScene::new(&scene);

        assert_eq!(vec![vec2(0.0, 0.0); 3], target.uvs);
    }
}
