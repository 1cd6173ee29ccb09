use glam::{vec4, Vec4};

#[derive(Clone, Debug, PartialEq)]
pub struct RendererConfig {
    /// Maximum number of bounces each traced path can make
    pub max_depth: u32,

    /// Maximum row width of encoded scene buffers; must be positive, defaults
    /// to (and is capped at) the largest 2D texture the backend supports
    pub max_row_width: Option<u32>,

    /// Color the default raster path clears the output to
    pub clear_color: Vec4,

    /// Multiplier applied to the accumulated radiance before tone mapping
    pub exposure: f32,
}

impl RendererConfig {
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_row_width(mut self, max_row_width: u32) -> Self {
        self.max_row_width = Some(max_row_width);
        self
    }

    pub fn with_clear_color(mut self, clear_color: Vec4) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn with_exposure(mut self, exposure: f32) -> Self {
        self.exposure = exposure;
        self
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_row_width: None,
            clear_color: vec4(0.0, 0.0, 0.0, 1.0),
            exposure: 1.0,
        }
    }
}
