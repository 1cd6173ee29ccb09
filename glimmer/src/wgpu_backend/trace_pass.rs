use crate::wgpu_backend::shaders::validated;
use crate::wgpu_backend::{layout, GpuTexture, Shaders, UniformBuffer, WgpuSceneBuffers};
use crate::{gpu, Error, Result};

/// Renders a single path-traced sample, blended with the history.
#[derive(Debug)]
pub struct TracePass {
    scene_layout: wgpu::BindGroupLayout,
    frame_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    params: UniformBuffer<gpu::TracePassParams>,
}

impl TracePass {
    pub const TARGET_FORMAT: wgpu::TextureFormat =
        wgpu::TextureFormat::Rgba32Float;

    /// Number of encoded buffers bound before the atlas.
    pub const BUFFERS: u32 = 9;

    pub fn new(device: &wgpu::Device, shaders: &Shaders) -> Result<Self> {
        log::debug!("Initializing pass: trace");

        let mut scene_entries: Vec<_> =
            (0..Self::BUFFERS).map(layout::texture).collect();

        scene_entries.extend([
            layout::texture_array(Self::BUFFERS),
            layout::sampler(Self::BUFFERS + 1),
            layout::texture(Self::BUFFERS + 2),
            layout::uniform(Self::BUFFERS + 3),
        ]);

        let scene_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("glimmer_trace_scene_layout"),
                entries: &scene_entries,
            });

        let frame_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("glimmer_trace_frame_layout"),
                entries: &[layout::texture(0), layout::uniform(1)],
            });

        let pipeline = validated(device, || {
            let pipeline_layout = device.create_pipeline_layout(
                &wgpu::PipelineLayoutDescriptor {
                    label: Some("glimmer_trace_pipeline_layout"),
                    bind_group_layouts: &[&scene_layout, &frame_layout],
                    push_constant_ranges: &[],
                },
            );

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("glimmer_trace_pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shaders.trace,
                    entry_point: "main_vs",
                    buffers: &[],
                },
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shaders.trace,
                    entry_point: "main_fs",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: Self::TARGET_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
            })
        })
        .map_err(|diagnostic| Error::PipelineLink {
            label: "trace".into(),
            diagnostic,
        })?;

        let params = UniformBuffer::new(device, "trace_params");

        Ok(Self {
            scene_layout,
            frame_layout,
            pipeline,
            params,
        })
    }

    pub fn scene_layout(&self) -> &wgpu::BindGroupLayout {
        &self.scene_layout
    }

    pub fn run(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &WgpuSceneBuffers,
        history: &GpuTexture,
        target: &GpuTexture,
        params: gpu::TracePassParams,
    ) {
        self.params.write(queue, &params);

        let frame = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glimmer_trace_frame"),
            layout: &self.frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(
                        history.view(),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.params.as_binding(),
                },
            ],
        });

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("glimmer_trace"),
            });

        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("glimmer_trace_pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: target.view(),
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(
                                    wgpu::Color::TRANSPARENT,
                                ),
                                store: true,
                            },
                        },
                    )],
                    depth_stencil_attachment: None,
                });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, scene.bind_group(), &[]);
            pass.set_bind_group(1, &frame, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit([encoder.finish()]);
    }
}
