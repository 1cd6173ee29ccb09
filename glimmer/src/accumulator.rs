use glam::UVec2;

use crate::Backend;

/// Pair of float targets the progressive renderer ping-pongs between.
///
/// Each frame writes into [`Self::target()`] while reading the previous
/// average from [`Self::offscreen_texture()`]; the freshly written target is
/// then presented as [`Self::screen_texture()`] and the roles get swapped.
#[derive(Debug)]
pub struct Accumulator<T> {
    targets: [T; 2],
    current: usize,
    size: UVec2,
}

impl<T> Accumulator<T> {
    pub fn new<B>(backend: &mut B, size: UVec2) -> crate::Result<Self>
    where
        B: Backend<Target = T>,
    {
        log::debug!("Allocating accumulator; size={size}");

        let a = backend.create_target(size)?;

        let b = match backend.create_target(size) {
            Ok(b) => b,
            Err(err) => {
                backend.destroy_target(&a);
                return Err(err);
            }
        };

        Ok(Self {
            targets: [a, b],
            current: 0,
            size,
        })
    }

    /// Returns the target the next sample gets written into.
    pub fn target(&self) -> &T {
        &self.targets[self.current]
    }

    /// Returns the target holding the most recent average, i.e. the one to
    /// present.
    pub fn screen_texture(&self) -> &T {
        &self.targets[self.current]
    }

    /// Returns the target holding the average from before the most recent
    /// sample.
    pub fn offscreen_texture(&self) -> &T {
        &self.targets[1 - self.current]
    }

    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn destroy<B>(&self, backend: &mut B)
    where
        B: Backend<Target = T>,
    {
        log::debug!("Releasing accumulator; size={}", self.size);

        for target in &self.targets {
            backend.destroy_target(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;
    use crate::backend::tests::{Call, MockBackend};

    #[test]
    fn swap() {
        let mut backend = MockBackend::default();
        let mut target = Accumulator::new(&mut backend, uvec2(4, 4)).unwrap();

        assert_eq!(0, *target.target());
        assert_eq!(0, *target.screen_texture());
        assert_eq!(1, *target.offscreen_texture());

        target.swap();

        assert_eq!(1, *target.target());
        assert_eq!(1, *target.screen_texture());
        assert_eq!(0, *target.offscreen_texture());

        target.swap();

        assert_eq!(0, *target.target());
    }

    #[test]
    fn destroy() {
        let mut backend = MockBackend::default();
        let target = Accumulator::new(&mut backend, uvec2(4, 4)).unwrap();

        target.destroy(&mut backend);

        assert_eq!(
            vec![
                Call::CreateTarget(0, uvec2(4, 4)),
                Call::CreateTarget(1, uvec2(4, 4)),
                Call::DestroyTarget(0),
                Call::DestroyTarget(1),
            ],
            backend.calls,
        );
    }
}
