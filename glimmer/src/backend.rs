use glam::UVec2;

use crate::{gpu, Camera, Environment, PackedScene, Result, Scene};

/// Graphics API the renderer drives.
///
/// Renderer itself only decides *when* things happen (what to allocate, when
/// to re-upload the scene, which target to read and which to write); backend
/// decides *how*.
pub trait Backend {
    /// Float render target used for accumulation
    type Target;

    /// Uploaded scene (all of its encoded buffers, atlas, camera etc.)
    type SceneBuffers;

    /// Whatever frames get presented onto
    type Output: ?Sized;

    /// Maximum width of the float grids, usually the largest 2D texture a
    /// device supports.
    fn max_row_width(&self) -> u32;

    fn create_target(&mut self, size: UVec2) -> Result<Self::Target>;

    fn destroy_target(&mut self, target: &Self::Target);

    fn upload_scene(
        &mut self,
        scene: &PackedScene,
        camera: &gpu::Camera,
        environment: Option<&Environment>,
    ) -> Result<Self::SceneBuffers>;

    fn release_scene(&mut self, buffers: Self::SceneBuffers);

    /// Draws the scene using a fast, non-progressive technique.
    fn rasterize(&mut self, scene: &Scene, camera: &Camera, output: &Self::Output);

    /// Renders a single sample into `target`, blending it with `history`.
    fn trace(
        &mut self,
        scene: &Self::SceneBuffers,
        history: &Self::Target,
        target: &Self::Target,
        params: gpu::TracePassParams,
    );

    /// Presents `source` onto `output`.
    fn display(
        &mut self,
        source: &Self::Target,
        output: &Self::Output,
        params: gpu::DisplayPassParams,
    );
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Error;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        CreateTarget(u32, UVec2),
        DestroyTarget(u32),
        UploadScene {
            id: u64,
            triangle_count: u32,
            has_environment: bool,
        },
        ReleaseScene(u64),
        Rasterize,
        Trace {
            scene: u64,
            history: u32,
            target: u32,
            sample_count: u32,
        },
        Display {
            source: u32,
            sample_count: u32,
        },
    }

    /// Backend that only records what it's been asked to do.
    #[derive(Debug, Default)]
    pub struct MockBackend {
        pub calls: Vec<Call>,
        pub fail_uploads: bool,
        pub widest_buffer: u32,
        pub last_trace: Option<gpu::TracePassParams>,
        next_target: u32,
        next_scene: u64,
    }

    impl MockBackend {
        pub fn take_calls(&mut self) -> Vec<Call> {
            std::mem::take(&mut self.calls)
        }
    }

    impl Backend for MockBackend {
        type Target = u32;
        type SceneBuffers = u64;
        type Output = ();

        fn max_row_width(&self) -> u32 {
            64
        }

        fn create_target(&mut self, size: UVec2) -> Result<u32> {
            let id = self.next_target;

            self.next_target += 1;
            self.calls.push(Call::CreateTarget(id, size));

            Ok(id)
        }

        fn destroy_target(&mut self, target: &u32) {
            self.calls.push(Call::DestroyTarget(*target));
        }

        fn upload_scene(
            &mut self,
            scene: &PackedScene,
            _: &gpu::Camera,
            environment: Option<&Environment>,
        ) -> Result<u64> {
            if self.fail_uploads {
                return Err(Error::TooManyTextures {
                    count: scene.atlas.layers.len(),
                    limit: 0,
                });
            }

            let id = self.next_scene;

            self.next_scene += 1;

            self.widest_buffer = scene
                .buffers()
                .into_iter()
                .map(|buffer| buffer.width())
                .max()
                .unwrap_or_default();

            self.calls.push(Call::UploadScene {
                id,
                triangle_count: scene.triangle_count,
                has_environment: environment.is_some(),
            });

            Ok(id)
        }

        fn release_scene(&mut self, buffers: u64) {
            self.calls.push(Call::ReleaseScene(buffers));
        }

        fn rasterize(&mut self, _: &Scene, _: &Camera, _: &()) {
            self.calls.push(Call::Rasterize);
        }

        fn trace(
            &mut self,
            scene: &u64,
            history: &u32,
            target: &u32,
            params: gpu::TracePassParams,
        ) {
            self.last_trace = Some(params);
            self.calls.push(Call::Trace {
                scene: *scene,
                history: *history,
                target: *target,
                sample_count: params.sample_count,
            });
        }

        fn display(
            &mut self,
            source: &u32,
            _: &(),
            params: gpu::DisplayPassParams,
        ) {
            self.calls.push(Call::Display {
                source: *source,
                sample_count: params.sample_count,
            });
        }
    }
}
