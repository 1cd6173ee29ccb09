use std::sync::Arc;

use derivative::Derivative;
use glam::{Affine3A, UVec2};
use image::Rgba32FImage;

use crate::{Material, Mesh};

/// Snapshot of a scene, as seen by the renderer.
///
/// Renderer never mutates nor retains it - it's read once when the renderer
/// gets primed and then the produced buffers live on their own.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    root: SceneNode,
    environment: Option<Arc<Environment>>,
}

impl Scene {
    pub fn new(root: SceneNode) -> Self {
        Self {
            root,
            environment: None,
        }
    }

    pub fn with_environment(mut self, environment: Arc<Environment>) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_deref()
    }

    /// Visits all nodes depth-first (parents before children, children in
    /// order), passing each node's world transform along.
    pub fn traverse(&self, mut f: impl FnMut(&SceneNode, Affine3A)) {
        let mut pending = vec![(&self.root, Affine3A::IDENTITY)];

        while let Some((node, parent_xform)) = pending.pop() {
            let xform = parent_xform * node.transform;

            f(node, xform);

            pending.extend(
                node.children.iter().rev().map(|child| (child, xform)),
            );
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    transform: Affine3A,
    drawable: Option<Drawable>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(transform: Affine3A) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    pub fn with_drawable(mut self, drawable: Drawable) -> Self {
        self.drawable = Some(drawable);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns transform relative to the parent node.
    pub fn transform(&self) -> Affine3A {
        self.transform
    }

    pub fn drawable(&self) -> Option<&Drawable> {
        self.drawable.as_ref()
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }
}

/// Mesh together with materials its groups refer to.
#[derive(Clone, Debug)]
pub struct Drawable {
    mesh: Arc<Mesh>,
    materials: Vec<Arc<Material>>,
}

impl Drawable {
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self {
            mesh,
            materials: Default::default(),
        }
    }

    pub fn with_material(mut self, material: Arc<Material>) -> Self {
        self.materials.push(material);
        self
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Returns materials; when empty, the whole mesh is drawn with the
    /// default material.
    pub fn materials(&self) -> &[Arc<Material>] {
        &self.materials
    }
}

/// Equirectangular, linear, HDR environment map.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Environment {
    #[derivative(Debug = "ignore")]
    image: Rgba32FImage,
    intensity: f32,
}

impl Environment {
    pub fn new(image: Rgba32FImage) -> Self {
        Self {
            image,
            intensity: 1.0,
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn image(&self) -> &Rgba32FImage {
        &self.image
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.image.width(), self.image.height())
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }
}

#[cfg(test)]
mod tests {
    use glam::{vec3, Vec3};

    use super::*;

    #[test]
    fn traverse() {
        let scene = Scene::new(
            SceneNode::new(Affine3A::from_translation(vec3(1.0, 0.0, 0.0)))
                .with_child(
                    SceneNode::new(Affine3A::from_translation(vec3(
                        0.0, 2.0, 0.0,
                    )))
                    .with_child(SceneNode::new(
                        Affine3A::from_translation(vec3(0.0, 0.0, 3.0)),
                    )),
                )
                .with_child(SceneNode::new(Affine3A::from_scale(Vec3::splat(
                    2.0,
                )))),
        );

        let mut origins = Vec::new();

        scene.traverse(|_, xform| {
            origins.push(xform.transform_point3(Vec3::ZERO));
        });

        assert_eq!(
            vec![
                vec3(1.0, 0.0, 0.0),
                vec3(1.0, 2.0, 0.0),
                vec3(1.0, 2.0, 3.0),
                vec3(1.0, 0.0, 0.0),
            ],
            origins
        );
    }
}
