use std::borrow::Cow;

use glam::UVec2;

use crate::wgpu_backend::{GpuTexture, TracePass, UniformBuffer};
use crate::{
    gpu, EncodedBuffer, Environment, Error, PackedScene, PixelFormat, Result,
};

/// Scene uploaded onto the GPU, bound together as the trace pass' first bind
/// group.
#[derive(Debug)]
pub struct WgpuSceneBuffers {
    buffers: Vec<GpuTexture>,
    atlas: GpuTexture,
    environment: GpuTexture,
    camera: UniformBuffer<gpu::Camera>,
    bind_group: wgpu::BindGroup,
}

impl WgpuSceneBuffers {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pass: &TracePass,
        scene: &PackedScene,
        camera: &gpu::Camera,
        environment: Option<&Environment>,
    ) -> Result<Self> {
        check_limits(scene, environment, &device.limits())?;

        let buffers: Vec<_> = scene
            .buffers()
            .into_iter()
            .map(|buffer| upload_buffer(device, queue, buffer))
            .collect();

        let atlas = GpuTexture::builder("atlas")
            .with_size(scene.atlas.layer_size)
            .with_layers(scene.atlas.layers.len().max(1) as u32)
            .with_format(wgpu::TextureFormat::Rgba8Unorm)
            .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
            .with_usage(wgpu::TextureUsages::COPY_DST)
            .build(device);

        for (layer, texture) in scene.atlas.layers.iter().enumerate() {
            let size = texture.size();

            if size.x == 0 || size.y == 0 {
                continue;
            }

            atlas.write(queue, layer as u32, size, 4, texture.image().as_raw());
        }

        let atlas_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("glimmer_atlas_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let environment = upload_environment(device, queue, environment);
        let camera_buffer = UniformBuffer::new(device, "camera");

        camera_buffer.write(queue, camera);

        let mut entries: Vec<_> = buffers
            .iter()
            .enumerate()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(buffer.view()),
            })
            .collect();

        entries.extend([
            wgpu::BindGroupEntry {
                binding: TracePass::BUFFERS,
                resource: wgpu::BindingResource::TextureView(atlas.view()),
            },
            wgpu::BindGroupEntry {
                binding: TracePass::BUFFERS + 1,
                resource: wgpu::BindingResource::Sampler(&atlas_sampler),
            },
            wgpu::BindGroupEntry {
                binding: TracePass::BUFFERS + 2,
                resource: wgpu::BindingResource::TextureView(
                    environment.view(),
                ),
            },
            wgpu::BindGroupEntry {
                binding: TracePass::BUFFERS + 3,
                resource: camera_buffer.as_binding(),
            },
        ]);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glimmer_trace_scene"),
            layout: pass.scene_layout(),
            entries: &entries,
        });

        Ok(Self {
            buffers,
            atlas,
            environment,
            camera: camera_buffer,
            bind_group,
        })
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn destroy(&self) {
        for buffer in &self.buffers {
            buffer.destroy();
        }

        self.atlas.destroy();
        self.environment.destroy();
        self.camera.destroy();
    }
}

/// Makes sure the scene fits within the device, so that its upload doesn't
/// trip a validation error.
fn check_limits(
    scene: &PackedScene,
    environment: Option<&Environment>,
    limits: &wgpu::Limits,
) -> Result<()> {
    if scene.atlas.layers.len() > limits.max_texture_array_layers as usize {
        return Err(Error::TooManyTextures {
            count: scene.atlas.layers.len(),
            limit: limits.max_texture_array_layers,
        });
    }

    for buffer in scene.buffers() {
        check_size(buffer.size(), limits)?;
    }

    check_size(scene.atlas.layer_size, limits)?;

    if let Some(environment) = environment {
        check_size(environment.size(), limits)?;
    }

    Ok(())
}

fn check_size(size: UVec2, limits: &wgpu::Limits) -> Result<()> {
    let max = limits.max_texture_dimension_2d;

    if size.x > max || size.y > max {
        return Err(Error::InvalidSize {
            width: size.x,
            height: size.y,
        });
    }

    Ok(())
}

fn upload_buffer(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    buffer: &EncodedBuffer,
) -> GpuTexture {
    // There's no three-channel float format, so those get widened
    let (format, data): (_, Cow<'_, [f32]>) = match buffer.format() {
        PixelFormat::R32Float => {
            (wgpu::TextureFormat::R32Float, Cow::Borrowed(buffer.data()))
        }
        PixelFormat::Rg32Float => {
            (wgpu::TextureFormat::Rg32Float, Cow::Borrowed(buffer.data()))
        }
        PixelFormat::Rgb32Float => {
            (wgpu::TextureFormat::Rgba32Float, Cow::Owned(buffer.to_rgba()))
        }
        PixelFormat::Rgba32Float => {
            (wgpu::TextureFormat::Rgba32Float, Cow::Borrowed(buffer.data()))
        }
    };

    let channels = match format {
        wgpu::TextureFormat::R32Float => 1,
        wgpu::TextureFormat::Rg32Float => 2,
        _ => 4,
    };

    let texture = GpuTexture::builder(buffer.label())
        .with_size(buffer.size())
        .with_format(format)
        .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
        .with_usage(wgpu::TextureUsages::COPY_DST)
        .build(device);

    texture.write(
        queue,
        0,
        buffer.size(),
        channels * 4,
        bytemuck::cast_slice::<f32, u8>(&data),
    );

    texture
}

fn upload_environment(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    environment: Option<&Environment>,
) -> GpuTexture {
    let size = environment.map_or(UVec2::ONE, |environment| {
        environment.size().max(UVec2::ONE)
    });

    let texture = GpuTexture::builder("environment")
        .with_size(size)
        .with_format(wgpu::TextureFormat::Rgba32Float)
        .with_usage(wgpu::TextureUsages::TEXTURE_BINDING)
        .with_usage(wgpu::TextureUsages::COPY_DST)
        .build(device);

    match environment {
        Some(environment) if environment.size() == size => {
            texture.write(
                queue,
                0,
                size,
                16,
                bytemuck::cast_slice::<f32, u8>(environment.image().as_raw()),
            );
        }

        _ => {
            texture.write(
                queue,
                0,
                size,
                16,
                bytemuck::cast_slice::<f32, u8>(&[0.0; 4]),
            );
        }
    }

    texture
}
