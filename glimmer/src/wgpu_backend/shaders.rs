use std::borrow::Cow;

use crate::{Error, Result};

/// Sources of the programs the backend runs.
#[derive(Clone, Debug)]
pub struct ShaderSources {
    pub trace: Cow<'static, str>,
    pub display: Cow<'static, str>,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            trace: Cow::Borrowed(include_str!("../../shaders/trace.wgsl")),
            display: Cow::Borrowed(include_str!("../../shaders/display.wgsl")),
        }
    }
}

#[derive(Debug)]
pub struct Shaders {
    pub trace: wgpu::ShaderModule,
    pub display: wgpu::ShaderModule,
}

impl Shaders {
    pub fn new(device: &wgpu::Device, sources: &ShaderSources) -> Result<Self> {
        Ok(Self {
            trace: compile(device, "trace", &sources.trace)?,
            display: compile(device, "display", &sources.display)?,
        })
    }
}

fn compile(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> Result<wgpu::ShaderModule> {
    log::debug!("Compiling shader `{label}`");

    let module = validated(device, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("glimmer_{label}")),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
        })
    });

    module.map_err(|diagnostic| Error::ShaderCompilation {
        label: label.into(),
        diagnostic,
    })
}

/// Runs `f` inside a validation error scope, returning the validation
/// message if anything went wrong.
pub(super) fn validated<T>(
    device: &wgpu::Device,
    f: impl FnOnce() -> T,
) -> Result<T, String> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let val = f();

    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(err.to_string()),
        None => Ok(val),
    }
}
