use std::mem;

use glam::UVec2;
use rand::Rng;

use crate::metrics::measure;
use crate::{
    gpu, Accumulator, Backend, Camera, Error, FlattenedScene, PackedScene,
    RendererConfig, Result, Scene,
};

/// What the user asked the renderer to produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Raster,
    Trace,
}

/// Where the renderer is within its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendererState {
    /// Frames are rasterized; no scene buffers are alive
    Raster,

    /// Next frame flattens, packs and uploads the scene before tracing it
    Priming,

    /// Each frame adds one sample to the running average
    Accumulating,
}

/// What the most recent [`Renderer::render()`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Rasterized,
    Traced { sample_count: u32 },
}

/// Scene buffers produced by a single priming.
#[derive(Debug)]
pub struct SceneGeneration<T> {
    id: u64,
    buffers: T,
    triangle_count: u32,
    texture_count: u32,
    bvh_root: u32,
    environment_intensity: Option<f32>,
}

impl<T> SceneGeneration<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn buffers(&self) -> &T {
        &self.buffers
    }

    pub fn triangle_count(&self) -> u32 {
        self.triangle_count
    }
}

#[derive(Debug)]
enum State<T> {
    Raster,
    Priming,
    Accumulating { generation: SceneGeneration<T> },
}

/// Progressive renderer.
///
/// Starts in the raster mode, where each frame is drawn by the backend's
/// rasterizer; once switched into the trace mode, it snapshots the scene into
/// GPU buffers (priming) and then keeps adding one path-traced sample per
/// frame, converging to a noise-free image for as long as nothing changes.
///
/// Any change to the scene or camera must be reported via
/// [`Self::scene_changed()`] - the renderer doesn't track the scene on its own.
pub struct Renderer<B>
where
    B: Backend,
{
    backend: B,
    config: RendererConfig,
    accumulator: Accumulator<B::Target>,
    state: State<B::SceneBuffers>,
    sample_count: u32,
    next_generation_id: u64,
}

impl<B> Renderer<B>
where
    B: Backend,
{
    pub fn new(
        mut backend: B,
        size: UVec2,
        config: RendererConfig,
    ) -> Result<Self> {
        log::info!("Initializing renderer; size={size}, config={config:?}");

        Self::validate_size(size)?;

        if let Some(0) = config.max_row_width {
            return Err(Error::InvalidRowWidth(0));
        }

        let accumulator = Accumulator::new(&mut backend, size)?;

        Ok(Self {
            backend,
            config,
            accumulator,
            state: State::Raster,
            sample_count: 0,
            next_generation_id: 0,
        })
    }

    /// Switches into the trace mode; the next frame primes the renderer.
    ///
    /// Does nothing if the renderer is already tracing.
    pub fn start_trace(&mut self) {
        if let State::Raster = self.state {
            log::info!("Starting trace");

            self.state = State::Priming;
        }
    }

    /// Switches back into the raster mode, releasing current scene buffers.
    pub fn stop_trace(&mut self) {
        if let State::Raster = self.state {
            return;
        }

        log::info!("Stopping trace; sample_count={}", self.sample_count);

        self.release_generation();
        self.state = State::Raster;
        self.sample_count = 0;
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        match mode {
            RenderMode::Raster => self.stop_trace(),
            RenderMode::Trace => self.start_trace(),
        }
    }

    /// Discards everything accumulated so far, so that the next frame
    /// re-primes the renderer.
    ///
    /// Must be called whenever the scene or camera changes; does nothing in
    /// the raster mode.
    pub fn scene_changed(&mut self) {
        if let State::Raster = self.state {
            return;
        }

        self.release_generation();
        self.state = State::Priming;
        self.sample_count = 0;
    }

    /// Reallocates the accumulator for given size; when tracing, the next
    /// frame re-primes the renderer.
    pub fn set_size(&mut self, size: UVec2) -> Result<()> {
        Self::validate_size(size)?;

        log::debug!("Resizing; {} -> {size}", self.accumulator.size());

        let accumulator = Accumulator::new(&mut self.backend, size)?;

        mem::replace(&mut self.accumulator, accumulator)
            .destroy(&mut self.backend);

        self.scene_changed();

        Ok(())
    }

    /// Renders a single frame onto `output`.
    ///
    /// When priming fails, the error is returned and the next frame retries.
    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        output: &B::Output,
    ) -> Result<FrameOutcome> {
        if let State::Priming = self.state {
            let generation = self.prime(scene, camera)?;

            self.state = State::Accumulating { generation };
            self.sample_count = 0;
        }

        let State::Accumulating { generation } = &self.state else {
            self.backend.rasterize(scene, camera, output);

            return Ok(FrameOutcome::Rasterized);
        };

        self.sample_count += 1;

        let trace_params = gpu::TracePassParams {
            sample_count: self.sample_count,
            max_depth: self.config.max_depth,
            seed: rand::thread_rng().gen(),
            triangle_count: generation.triangle_count,
            texture_count: generation.texture_count,
            has_environment: generation.environment_intensity.is_some()
                as u32,
            environment_intensity: generation
                .environment_intensity
                .unwrap_or_default(),
            bvh_root: generation.bvh_root,
        };

        self.backend.trace(
            &generation.buffers,
            self.accumulator.offscreen_texture(),
            self.accumulator.target(),
            trace_params,
        );

        let display_params = gpu::DisplayPassParams {
            sample_count: self.sample_count,
            // Depends on the output, so it's up to the backend
            apply_gamma: 0,
            exposure: self.config.exposure,
            _pad0: 0,
        };

        self.backend.display(
            self.accumulator.screen_texture(),
            output,
            display_params,
        );

        self.accumulator.swap();

        Ok(FrameOutcome::Traced {
            sample_count: self.sample_count,
        })
    }

    /// Returns number of samples accumulated so far; zero in the raster mode
    /// and right after any change.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn mode(&self) -> RenderMode {
        match self.state {
            State::Raster => RenderMode::Raster,
            _ => RenderMode::Trace,
        }
    }

    pub fn state(&self) -> RendererState {
        match self.state {
            State::Raster => RendererState::Raster,
            State::Priming => RendererState::Priming,
            State::Accumulating { .. } => RendererState::Accumulating,
        }
    }

    /// Returns scene buffers currently being traced, if any.
    pub fn generation(&self) -> Option<&SceneGeneration<B::SceneBuffers>> {
        match &self.state {
            State::Accumulating { generation } => Some(generation),
            _ => None,
        }
    }

    pub fn size(&self) -> UVec2 {
        self.accumulator.size()
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn prime(
        &mut self,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<SceneGeneration<B::SceneBuffers>> {
        let id = self.next_generation_id;

        log::info!("Priming; generation={id}");

        if scene.environment().is_none() {
            log::warn!(
                "Scene has no environment map - only emissive surfaces will \
                 light it"
            );
        }

        let max_row_width = {
            let limit = self.backend.max_row_width();

            self.config
                .max_row_width
                .map_or(limit, |width| width.min(limit))
        };

        let flattened =
            measure("Flattening scene", || FlattenedScene::new(scene));

        let packed = measure("Packing scene", || {
            PackedScene::new(&flattened, max_row_width)
        })?;

        log::debug!(
            "Scene packed; vertices={}, triangles={}, materials={}, \
             textures={}, bvh-nodes={}",
            flattened.vertex_count(),
            flattened.triangle_count(),
            flattened.materials.len(),
            flattened.atlas.len(),
            flattened.bvh.len(),
        );

        let camera = camera.serialize(self.accumulator.size());

        let buffers = measure("Uploading scene", || {
            self.backend
                .upload_scene(&packed, &camera, scene.environment())
        })?;

        self.next_generation_id += 1;

        Ok(SceneGeneration {
            id,
            buffers,
            triangle_count: packed.triangle_count,
            texture_count: packed.atlas.layers.len() as u32,
            bvh_root: packed.bvh_root.unwrap_or_default(),
            environment_intensity: scene
                .environment()
                .map(|environment| environment.intensity()),
        })
    }

    fn release_generation(&mut self) {
        let state = mem::replace(&mut self.state, State::Priming);

        if let State::Accumulating { generation } = state {
            log::debug!("Releasing generation {}", generation.id);

            self.backend.release_scene(generation.buffers);
        } else {
            self.state = state;
        }
    }

    fn validate_size(size: UVec2) -> Result<()> {
        if size.x == 0 || size.y == 0 {
            return Err(Error::InvalidSize {
                width: size.x,
                height: size.y,
            });
        }

        Ok(())
    }
}

impl<B> Drop for Renderer<B>
where
    B: Backend,
{
    fn drop(&mut self) {
        self.release_generation();
        self.accumulator.destroy(&mut self.backend);
    }
}
