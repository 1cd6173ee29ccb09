use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4, Vec4Swizzles};

/// Camera, as seen by the tracing program.
///
/// Rays are generated for pixel `(x, y)` from `origin + x * step_x + y *
/// step_y`, i.e. `origin` is the center of the bottom-left pixel projected on
/// the focus plane.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Camera {
    /// xyz: first pixel's position on the focus plane; w: defocus radius
    pub origin: Vec4,
    pub step_x: Vec4,
    pub step_y: Vec4,
    pub right: Vec4,
    pub up: Vec4,
    pub look_from: Vec4,
}

impl Camera {
    pub fn defocus_radius(&self) -> f32 {
        self.origin.w
    }

    /// Returns the point on the focus plane that pixel's ray passes through.
    pub fn pixel_target(&self, x: f32, y: f32) -> Vec3 {
        self.origin.xyz() + x * self.step_x.xyz() + y * self.step_y.xyz()
    }
}
