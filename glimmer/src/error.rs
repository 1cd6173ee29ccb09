use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The device can't provide something the renderer cannot work without
    /// (e.g. floating-point render targets).
    #[error("missing GPU capability: {format:?} {reason}")]
    MissingCapability {
        format: wgpu::TextureFormat,
        reason: &'static str,
    },

    #[error("couldn't compile shader `{label}`:\n{diagnostic}")]
    ShaderCompilation { label: String, diagnostic: String },

    #[error("couldn't link pipeline `{label}`:\n{diagnostic}")]
    PipelineLink { label: String, diagnostic: String },

    #[error("invalid channel count: {0} (expected 1..=4)")]
    InvalidChannelCount(u32),

    #[error("invalid row width: {0} (must be positive)")]
    InvalidRowWidth(u32),

    #[error("invalid size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("too many textures: {count} (device supports up to {limit})")]
    TooManyTextures { count: usize, limit: u32 },
}
