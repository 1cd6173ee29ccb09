use std::ops::Add;

use glam::Vec3;

use super::Axis;

/// Axis-aligned bounding box.
///
/// Boxes are never thinner than [`Self::MIN_EXTENT`] along any axis - flat
/// boxes (e.g. of an axis-aligned triangle) would otherwise break sorting by
/// axis and make slab tests on the GPU unreliable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    min: Vec3,
    max: Vec3,
}

impl BoundingBox {
    pub const MIN_EXTENT: f32 = 2e-5;

    pub fn new(min: Vec3, max: Vec3) -> Self {
        let mut this = Self { min, max };

        for axis in Axis::all() {
            let axis = axis.index();

            if this.max[axis] - this.min[axis] < Self::MIN_EXTENT {
                this.min[axis] -= Self::MIN_EXTENT / 2.0;
                this.max[axis] += Self::MIN_EXTENT / 2.0;
            }
        }

        this
    }

    pub fn from_triangle(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self::new(a.min(b).min(c), a.max(b).max(c))
    }

    pub fn merge(a: Self, b: Self) -> Self {
        Self::new(a.min.min(b.min), a.max.max(b.max))
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn extent(&self) -> Vec3 {
        self.max() - self.min()
    }

    /// Returns the axis along which this box is the longest; ties prefer x
    /// over y and y over z.
    pub fn longest_axis(&self) -> Axis {
        let extent = self.extent();

        if extent.x >= extent.y && extent.x >= extent.z {
            Axis::X
        } else if extent.y >= extent.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }
}

impl Add<Self> for BoundingBox {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::merge(self, rhs)
    }
}
