use crate::wgpu_backend::shaders::validated;
use crate::wgpu_backend::{layout, GpuTexture, Shaders, UniformBuffer};
use crate::{gpu, Error, Result};

/// Tone-maps accumulated radiance onto the output.
#[derive(Debug)]
pub struct DisplayPass {
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    params: UniformBuffer<gpu::DisplayPassParams>,
    output_format: wgpu::TextureFormat,
}

impl DisplayPass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &Shaders,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        log::debug!("Initializing pass: display; format={output_format:?}");

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("glimmer_display_layout"),
                entries: &[layout::texture(0), layout::uniform(1)],
            });

        let pipeline = validated(device, || {
            let pipeline_layout = device.create_pipeline_layout(
                &wgpu::PipelineLayoutDescriptor {
                    label: Some("glimmer_display_pipeline_layout"),
                    bind_group_layouts: &[&layout],
                    push_constant_ranges: &[],
                },
            );

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("glimmer_display_pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shaders.display,
                    entry_point: "main_vs",
                    buffers: &[],
                },
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shaders.display,
                    entry_point: "main_fs",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: output_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
            })
        })
        .map_err(|diagnostic| Error::PipelineLink {
            label: "display".into(),
            diagnostic,
        })?;

        let params = UniformBuffer::new(device, "display_params");

        Ok(Self {
            layout,
            pipeline,
            params,
            output_format,
        })
    }

    pub fn run(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &GpuTexture,
        output: &wgpu::TextureView,
        mut params: gpu::DisplayPassParams,
    ) {
        // sRGB outputs get gamma-corrected by the hardware
        params.apply_gamma = !self.output_format.is_srgb() as u32;

        self.params.write(queue, &params);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glimmer_display"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(
                        source.view(),
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
                label: Some("glimmer_display"),
            });

        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("glimmer_display_pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: output,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                store: true,
                            },
                        },
                    )],
                    depth_stencil_attachment: None,
                });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit([encoder.finish()]);
    }
}
