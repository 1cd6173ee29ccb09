use glam::{UVec2, Vec2, Vec3};

use crate::gpu;

/// Pinhole camera with an optional thin-lens defocus.
///
/// `right`, `up` and `forward` are expected to be an orthonormal basis, with
/// `forward` pointing where the camera looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,

    /// Distance to the plane that stays in focus
    pub focus_distance: f32,

    /// Radius of the lens; zero means no defocus blur
    pub defocus_radius: f32,

    /// Vertical field of view, in radians
    pub vertical_fov: f32,
}

impl Camera {
    /// Creates a camera at `position` looking at `target`, focused on it.
    pub fn looking_at(
        position: Vec3,
        target: Vec3,
        up: Vec3,
        vertical_fov: f32,
    ) -> Self {
        let forward = (target - position).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        Self {
            position,
            right,
            up,
            forward,
            focus_distance: position.distance(target),
            defocus_radius: 0.0,
            vertical_fov,
        }
    }

    pub fn with_focus_distance(mut self, focus_distance: f32) -> Self {
        self.focus_distance = focus_distance;
        self
    }

    pub fn with_defocus_radius(mut self, defocus_radius: f32) -> Self {
        self.defocus_radius = defocus_radius;
        self
    }

    /// Returns size of the view at the focus plane.
    pub fn view_size(&self, aspect_ratio: f32) -> Vec2 {
        let height =
            2.0 * self.focus_distance * (0.5 * self.vertical_fov).tan();

        Vec2::new(height * aspect_ratio, height)
    }

    pub fn serialize(&self, viewport_size: UVec2) -> gpu::Camera {
        let viewport_size = viewport_size.max(UVec2::ONE).as_vec2();
        let view_size = self.view_size(viewport_size.x / viewport_size.y);

        let step_x = self.right * view_size.x / viewport_size.x;
        let step_y = self.up * view_size.y / viewport_size.y;

        let origin = self.position - self.right * view_size.x / 2.0
            + self.forward * self.focus_distance
            - self.up * view_size.y / 2.0
            + step_x / 2.0
            + step_y / 2.0;

        gpu::Camera {
            origin: origin.extend(self.defocus_radius),
            step_x: step_x.extend(0.0),
            step_y: step_y.extend(0.0),
            right: self.right.extend(0.0),
            up: self.up.extend(0.0),
            look_from: self.position.extend(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use approx::assert_relative_eq;
    use glam::{uvec2, vec3};

    use super::*;

    fn camera() -> Camera {
        Camera::looking_at(Vec3::ZERO, vec3(0.0, 0.0, -1.0), Vec3::Y, FRAC_PI_2)
    }

    #[test]
    fn looking_at() {
        let target = camera();

        assert!(target.right.abs_diff_eq(Vec3::X, 1e-6));
        assert!(target.up.abs_diff_eq(Vec3::Y, 1e-6));
        assert!(target.forward.abs_diff_eq(-Vec3::Z, 1e-6));
        assert_relative_eq!(1.0, target.focus_distance);
    }

    #[test]
    fn view_size() {
        let size = camera().view_size(2.0);

        assert_relative_eq!(4.0, size.x, epsilon = 1e-5);
        assert_relative_eq!(2.0, size.y, epsilon = 1e-5);
    }

    #[test]
    fn serialize() {
        let target = camera().with_defocus_radius(0.25).serialize(uvec2(2, 2));

        assert_relative_eq!(0.25, target.defocus_radius());

        assert!(target
            .pixel_target(0.0, 0.0)
            .abs_diff_eq(vec3(-0.5, -0.5, -1.0), 1e-5));

        assert!(target
            .pixel_target(1.0, 1.0)
            .abs_diff_eq(vec3(0.5, 0.5, -1.0), 1e-5));
    }
}
