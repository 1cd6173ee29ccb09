use std::sync::Arc;

use derivative::Derivative;
use fxhash::FxHashMap;
use glam::UVec2;

use crate::{gpu, Texture};

/// Registry of textures used by a scene; each distinct texture becomes a
/// single layer of an array texture.
#[derive(Clone, Default, Derivative)]
#[derivative(Debug)]
pub struct Atlas {
    textures: Vec<Arc<Texture>>,
    #[derivative(Debug = "ignore")]
    layers: FxHashMap<usize, u32>,
}

impl Atlas {
    /// Registers given texture and returns its layer; registering the same
    /// texture (by identity) twice yields the same layer.
    pub fn register(&mut self, texture: &Arc<Texture>) -> u32 {
        *self.layers.entry(Arc::as_ptr(texture) as usize).or_insert_with(|| {
            self.textures.push(Arc::clone(texture));

            (self.textures.len() - 1) as u32
        })
    }

    pub fn textures(&self) -> &[Arc<Texture>] {
        &self.textures
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Returns size of a single layer, big enough to fit the largest texture
    /// in each dimension (at least 1x1).
    pub fn layer_size(&self) -> UVec2 {
        self.textures
            .iter()
            .fold(UVec2::ONE, |size, texture| size.max(texture.size()))
    }

    /// Returns descriptors of all layers, in order.
    pub fn describe(&self) -> Vec<gpu::TextureInfo> {
        let layer_size = self.layer_size();

        self.textures
            .iter()
            .map(|texture| {
                gpu::TextureInfo::new(
                    texture.relative_size(layer_size),
                    texture.flip_y(),
                    texture.rotation(),
                    texture.repeat(),
                    texture.offset(),
                )
            })
            .collect()
    }
}

impl PartialEq for Atlas {
    fn eq(&self, other: &Self) -> bool {
        self.textures.len() == other.textures.len()
            && self
                .textures
                .iter()
                .zip(&other.textures)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}
