mod display_pass;
mod layout;
mod rasterizer;
mod scene_buffers;
mod shaders;
mod texture;
mod trace_pass;
mod uniform_buffer;

use std::sync::Arc;

use derivative::Derivative;
use glam::UVec2;

pub use self::display_pass::*;
pub use self::rasterizer::*;
pub use self::scene_buffers::*;
pub use self::shaders::*;
pub use self::texture::*;
pub use self::trace_pass::*;
pub use self::uniform_buffer::*;
use crate::{
    gpu, Backend, Camera, Environment, Error, PackedScene, RendererConfig,
    Result, Scene,
};

/// [`Backend`] running on top of `wgpu`.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    trace_pass: TracePass,
    display_pass: DisplayPass,
    #[derivative(Debug = "ignore")]
    rasterizer: Box<dyn Rasterizer>,
}

impl WgpuBackend {
    /// Creates backend using the bundled shaders.
    ///
    /// `output_format` is the format of views frames get presented onto.
    pub fn new(
        adapter: &wgpu::Adapter,
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        output_format: wgpu::TextureFormat,
        config: &RendererConfig,
    ) -> Result<Self> {
        Self::with_shaders(
            adapter,
            device,
            queue,
            output_format,
            config,
            &ShaderSources::default(),
        )
    }

    pub fn with_shaders(
        adapter: &wgpu::Adapter,
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        output_format: wgpu::TextureFormat,
        config: &RendererConfig,
        sources: &ShaderSources,
    ) -> Result<Self> {
        log::info!("Initializing wgpu backend; adapter={:?}", adapter.get_info());

        check_capabilities(adapter)?;

        let shaders = Shaders::new(&device, sources)?;
        let trace_pass = TracePass::new(&device, &shaders)?;
        let display_pass = DisplayPass::new(&device, &shaders, output_format)?;

        Ok(Self {
            device,
            queue,
            trace_pass,
            display_pass,
            rasterizer: Box::new(ClearRasterizer::new(config.clear_color)),
        })
    }

    /// Replaces the rasterizer used outside of the trace mode.
    pub fn with_rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.rasterizer = Box::new(rasterizer);
        self
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

impl Backend for WgpuBackend {
    type Target = GpuTexture;
    type SceneBuffers = WgpuSceneBuffers;
    type Output = wgpu::TextureView;

    fn max_row_width(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn create_target(&mut self, size: UVec2) -> Result<GpuTexture> {
        let limits = self.device.limits();

        if size.x > limits.max_texture_dimension_2d
            || size.y > limits.max_texture_dimension_2d
        {
            return Err(Error::InvalidSize {
                width: size.x,
                height: size.y,
            });
        }

        Ok(GpuTexture::builder("accumulator")
            .with_size(size)
            .with_format(TracePass::TARGET_FORMAT)
            .with_usage(wgpu::TextureUsages::RENDER_ATTACHMENT)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .build(&self.device))
    }

    fn destroy_target(&mut self, target: &GpuTexture) {
        target.destroy();
    }

    fn upload_scene(
        &mut self,
        scene: &PackedScene,
        camera: &gpu::Camera,
        environment: Option<&Environment>,
    ) -> Result<WgpuSceneBuffers> {
        WgpuSceneBuffers::new(
            &self.device,
            &self.queue,
            &self.trace_pass,
            scene,
            camera,
            environment,
        )
    }

    fn release_scene(&mut self, buffers: WgpuSceneBuffers) {
        buffers.destroy();
    }

    fn rasterize(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        output: &wgpu::TextureView,
    ) {
        self.rasterizer.render(RasterContext {
            device: &self.device,
            queue: &self.queue,
            output,
            scene,
            camera,
        });
    }

    fn trace(
        &mut self,
        scene: &WgpuSceneBuffers,
        history: &GpuTexture,
        target: &GpuTexture,
        params: gpu::TracePassParams,
    ) {
        self.trace_pass.run(
            &self.device,
            &self.queue,
            scene,
            history,
            target,
            params,
        );
    }

    fn display(
        &mut self,
        source: &GpuTexture,
        output: &wgpu::TextureView,
        params: gpu::DisplayPassParams,
    ) {
        self.display_pass
            .run(&self.device, &self.queue, source, output, params);
    }
}

fn check_capabilities(adapter: &wgpu::Adapter) -> Result<()> {
    let format = TracePass::TARGET_FORMAT;
    let features = adapter.get_texture_format_features(format);

    for (usage, reason) in [
        (
            wgpu::TextureUsages::RENDER_ATTACHMENT,
            "cannot be rendered into",
        ),
        (wgpu::TextureUsages::TEXTURE_BINDING, "cannot be sampled"),
    ] {
        if !features.allowed_usages.contains(usage) {
            return Err(Error::MissingCapability { format, reason });
        }
    }

    Ok(())
}
