use glam::{uvec2, UVec2};

/// Returns the size of a grid holding `elements` items, each spanning
/// `pixels_per_element` consecutive pixels, with rows at most `max_width`
/// pixels wide.
///
/// Every program that reads an encoded buffer must compute the same size,
/// otherwise [`element_position()`] would address different pixels on both
/// sides.
///
/// An empty buffer still occupies a single pixel, since zero-sized textures
/// cannot be created.
pub fn grid_size(elements: u32, pixels_per_element: u32, max_width: u32) -> UVec2 {
    assert!(max_width > 0, "max_width must be positive");

    let pixels = elements * pixels_per_element;

    if pixels == 0 {
        return UVec2::ONE;
    }

    let width = max_width.min(pixels);
    let height = (pixels + width - 1) / width;

    uvec2(width, height)
}

/// Maps a linear pixel index into its position within a grid of given width.
pub fn grid_position(pixel: u32, width: u32) -> UVec2 {
    uvec2(pixel % width, pixel / width)
}

/// Maps `nth` pixel of `element` into its position within a grid of given
/// width.
pub fn element_position(
    element: u32,
    nth: u32,
    pixels_per_element: u32,
    width: u32,
) -> UVec2 {
    grid_position(element * pixels_per_element + nth, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size() {
        assert_eq!(uvec2(4, 2), grid_size(5, 1, 4));
        assert_eq!(uvec2(3, 1), grid_size(3, 1, 4));
        assert_eq!(uvec2(4, 1), grid_size(4, 1, 4));
        assert_eq!(uvec2(8, 2), grid_size(5, 2, 8));
        assert_eq!(uvec2(4096, 3), grid_size(4097, 2, 4096));
    }

    #[test]
    fn size_of_empty_grid() {
        assert_eq!(UVec2::ONE, grid_size(0, 1, 4));
        assert_eq!(UVec2::ONE, grid_size(0, 5, 4096));
    }

    #[test]
    fn positions_cover_grid_without_overlapping() {
        for (elements, pixels_per_element, max_width) in
            [(5, 1, 4), (17, 2, 8), (33, 5, 16), (1, 2, 4096)]
        {
            let size = grid_size(elements, pixels_per_element, max_width);
            let mut seen = vec![false; (size.x * size.y) as usize];

            for element in 0..elements {
                for nth in 0..pixels_per_element {
                    let pos =
                        element_position(element, nth, pixels_per_element, size.x);

                    assert!(pos.x < size.x);
                    assert!(pos.y < size.y);

                    let idx = (pos.y * size.x + pos.x) as usize;

                    assert!(!seen[idx], "pixel {pos} addressed twice");

                    seen[idx] = true;
                }
            }
        }
    }

    #[test]
    fn position() {
        assert_eq!(uvec2(0, 0), grid_position(0, 4));
        assert_eq!(uvec2(3, 0), grid_position(3, 4));
        assert_eq!(uvec2(0, 1), grid_position(4, 4));
        assert_eq!(uvec2(1, 2), element_position(4, 1, 2, 4));
    }
}
