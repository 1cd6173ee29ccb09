use glam::UVec2;

/// Texture together with its default view.
#[derive(Debug)]
pub struct GpuTexture {
    tex: wgpu::Texture,
    view: wgpu::TextureView,
    size: UVec2,
    format: wgpu::TextureFormat,
}

impl GpuTexture {
    pub fn builder(label: impl AsRef<str>) -> GpuTextureBuilder {
        GpuTextureBuilder::new(label)
    }

    pub fn tex(&self) -> &wgpu::Texture {
        &self.tex
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Writes given pixels into the specified array layer, starting from its
    /// top-left corner.
    pub fn write(
        &self,
        queue: &wgpu::Queue,
        layer: u32,
        size: UVec2,
        bytes_per_pixel: u32,
        data: &[u8],
    ) {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.tex,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer,
                },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(size.x * bytes_per_pixel),
                rows_per_image: Some(size.y),
            },
            wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
        );
    }

    pub fn destroy(&self) {
        self.tex.destroy();
    }
}

#[derive(Debug)]
pub struct GpuTextureBuilder {
    label: String,
    size: UVec2,
    layers: u32,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
    view_dimension: wgpu::TextureViewDimension,
}

impl GpuTextureBuilder {
    fn new(label: impl AsRef<str>) -> Self {
        Self {
            label: format!("glimmer_{}", label.as_ref()),
            size: UVec2::ONE,
            layers: 1,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::empty(),
            view_dimension: wgpu::TextureViewDimension::D2,
        }
    }

    pub fn with_size(mut self, size: UVec2) -> Self {
        self.size = size;
        self
    }

    /// Turns this texture into an array texture with given number of layers.
    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self.view_dimension = wgpu::TextureViewDimension::D2Array;
        self
    }

    pub fn with_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_usage(mut self, usage: wgpu::TextureUsages) -> Self {
        self.usage |= usage;
        self
    }

    pub fn build(self, device: &wgpu::Device) -> GpuTexture {
        log::debug!(
            "Allocating texture `{}`; size={:?}, layers={}, format={:?}",
            self.label,
            self.size,
            self.layers,
            self.format,
        );

        assert!(self.size.x > 0);
        assert!(self.size.y > 0);
        assert!(self.layers > 0);

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&self.label),
            size: wgpu::Extent3d {
                width: self.size.x,
                height: self.size.y,
                depth_or_array_layers: self.layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: self.usage,
            view_formats: &[],
        });

        let view = tex.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{}_view", self.label)),
            dimension: Some(self.view_dimension),
            ..Default::default()
        });

        GpuTexture {
            tex,
            view,
            size: self.size,
            format: self.format,
        }
    }
}
