use std::marker::PhantomData;
use std::{any, mem, slice};

use bytemuck::Pod;

#[derive(Debug)]
pub struct UniformBuffer<T> {
    buffer: wgpu::Buffer,
    _marker: PhantomData<T>,
}

impl<T> UniformBuffer<T>
where
    T: Pod,
{
    pub fn new(device: &wgpu::Device, label: impl AsRef<str>) -> Self {
        let label = format!("glimmer_{}", label.as_ref());
        let size = (mem::size_of::<T>() + 15) & !15;

        log::debug!(
            "Allocating uniform buffer `{label}`; ty={}, size={} (padded to \
             {size})",
            any::type_name::<T>(),
            mem::size_of::<T>(),
        );

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&label),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
            size: size as _,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            _marker: PhantomData,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, data: &T) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(slice::from_ref(data)),
        );
    }

    pub fn as_binding(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}
