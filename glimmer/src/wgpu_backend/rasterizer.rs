use glam::Vec4;

use crate::{Camera, Scene};

/// Everything a rasterizer gets to draw a frame.
pub struct RasterContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub output: &'a wgpu::TextureView,
    pub scene: &'a Scene,
    pub camera: &'a Camera,
}

/// Fast, non-progressive renderer used outside of the trace mode.
pub trait Rasterizer {
    fn render(&mut self, ctxt: RasterContext<'_>);
}

/// Rasterizer that only clears the output.
#[derive(Clone, Copy, Debug)]
pub struct ClearRasterizer {
    color: wgpu::Color,
}

impl ClearRasterizer {
    pub fn new(color: Vec4) -> Self {
        Self {
            color: wgpu::Color {
                r: color.x as f64,
                g: color.y as f64,
                b: color.z as f64,
                a: color.w as f64,
            },
        }
    }
}

impl Rasterizer for ClearRasterizer {
    fn render(&mut self, ctxt: RasterContext<'_>) {
        let mut encoder = ctxt.device.create_command_encoder(
            &wgpu::CommandEncoderDescriptor {
                label: Some("glimmer_clear"),
            },
        );

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("glimmer_clear_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctxt.output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.color),
                    store: true,
                },
            })],
            depth_stencil_attachment: None,
        });

        ctxt.queue.submit([encoder.finish()]);
    }
}
