use derivative::Derivative;
use glam::UVec2;

use crate::{gpu, Error, Result};

/// Pixel format of an encoded buffer; always 32-bit floats, differing only in
/// the number of channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    R32Float,
    Rg32Float,
    Rgb32Float,
    Rgba32Float,
}

impl PixelFormat {
    pub fn from_channels(channels: u32) -> Result<Self> {
        match channels {
            1 => Ok(Self::R32Float),
            2 => Ok(Self::Rg32Float),
            3 => Ok(Self::Rgb32Float),
            4 => Ok(Self::Rgba32Float),
            _ => Err(Error::InvalidChannelCount(channels)),
        }
    }

    pub fn channels(self) -> u32 {
        match self {
            Self::R32Float => 1,
            Self::Rg32Float => 2,
            Self::Rgb32Float => 3,
            Self::Rgba32Float => 4,
        }
    }
}

/// Flat array of floats reshaped into a 2D grid of pixels, ready to be
/// uploaded as a texture.
///
/// Each element occupies `pixels_per_element` consecutive pixels (wrapping
/// across rows); see [`gpu::grid_size()`] for how the grid's size is chosen.
/// Cells past the last element stay zeroed.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct EncodedBuffer {
    label: &'static str,
    size: UVec2,
    format: PixelFormat,
    elements: u32,
    pixels_per_element: u32,
    #[derivative(Debug = "ignore")]
    data: Vec<f32>,
}

impl EncodedBuffer {
    /// Allocates a zeroed buffer for `elements` items.
    pub fn new(
        label: &'static str,
        elements: usize,
        pixels_per_element: u32,
        channels: u32,
        max_row_width: u32,
    ) -> Result<Self> {
        let format = PixelFormat::from_channels(channels)?;

        if max_row_width == 0 {
            return Err(Error::InvalidRowWidth(max_row_width));
        }

        let elements = elements as u32;
        let size =
            gpu::grid_size(elements, pixels_per_element, max_row_width);

        let data = vec![0.0; (size.x * size.y * channels) as usize];

        Ok(Self {
            label,
            size,
            format,
            elements,
            pixels_per_element,
            data,
        })
    }

    /// Allocates a buffer for `elements` items and fills it with `values`,
    /// starting from the first cell.
    ///
    /// # Panics
    ///
    /// Panics if there are more values than the elements can hold.
    pub fn encode(
        label: &'static str,
        elements: usize,
        pixels_per_element: u32,
        channels: u32,
        max_row_width: u32,
        values: impl IntoIterator<Item = f32>,
    ) -> Result<Self> {
        let mut this = Self::new(
            label,
            elements,
            pixels_per_element,
            channels,
            max_row_width,
        )?;

        let capacity = this.elements as usize * this.floats_per_element();
        let mut len = 0;

        for value in values {
            assert!(
                len < capacity,
                "buffer `{label}` overflowed its {capacity} floats"
            );

            this.data[len] = value;
            len += 1;
        }

        Ok(this)
    }

    /// Encodes a slice of plain-old-data elements (e.g. `Vec3`s or
    /// [`gpu::BvhNode`]s), each of which must consist of exactly
    /// `pixels_per_element * channels` floats.
    pub fn encode_pod<T>(
        label: &'static str,
        items: &[T],
        pixels_per_element: u32,
        channels: u32,
        max_row_width: u32,
    ) -> Result<Self>
    where
        T: bytemuck::Pod,
    {
        assert_eq!(
            std::mem::size_of::<T>(),
            (pixels_per_element * channels) as usize * std::mem::size_of::<f32>(),
            "element of buffer `{label}` doesn't match its layout",
        );

        let values: &[f32] = bytemuck::cast_slice(items);

        Self::encode(
            label,
            items.len(),
            pixels_per_element,
            channels,
            max_row_width,
            values.iter().copied(),
        )
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.x
    }

    pub fn height(&self) -> u32 {
        self.size.y
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn channels(&self) -> u32 {
        self.format.channels()
    }

    pub fn elements(&self) -> u32 {
        self.elements
    }

    pub fn pixels_per_element(&self) -> u32 {
        self.pixels_per_element
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the `nth` pixel of given element, locating it the same way
    /// shaders do.
    pub fn pixel(&self, element: u32, nth: u32) -> &[f32] {
        let pos = gpu::element_position(
            element,
            nth,
            self.pixels_per_element,
            self.size.x,
        );

        let channels = self.channels() as usize;
        let offset = (pos.y * self.size.x + pos.x) as usize * channels;

        &self.data[offset..][..channels]
    }

    /// Returns the data padded to four channels per pixel.
    ///
    /// Used for uploading three-channel buffers, which don't have a matching
    /// texture format.
    pub fn to_rgba(&self) -> Vec<f32> {
        let channels = self.channels() as usize;

        if channels == 4 {
            return self.data.clone();
        }

        self.data
            .chunks_exact(channels)
            .flat_map(|pixel| {
                let mut out = [0.0; 4];

                out[..channels].copy_from_slice(pixel);
                out
            })
            .collect()
    }

    fn floats_per_element(&self) -> usize {
        (self.pixels_per_element * self.channels()) as usize
    }
}

#[cfg(test)]
mod tests {
    use glam::{vec3, Vec3};

    use super::*;

    #[test]
    fn five_elements_in_rows_of_four() {
        let target =
            EncodedBuffer::encode("test", 5, 1, 1, 4, [1.0, 2.0, 3.0, 4.0, 5.0])
                .unwrap();

        assert_eq!(4, target.width());
        assert_eq!(2, target.height());
        assert_eq!(PixelFormat::R32Float, target.format());

        assert_eq!(
            &[1.0f32, 2.0, 3.0, 4.0, 5.0, 0.0, 0.0, 0.0],
            target.data()
        );
    }

    #[test]
    fn narrow_buffer() {
        let target = EncodedBuffer::new("test", 3, 2, 4, 4096).unwrap();

        assert_eq!(6, target.width());
        assert_eq!(1, target.height());
        assert_eq!(24, target.data().len());
    }

    #[test]
    fn empty_buffer() {
        let target = EncodedBuffer::new("test", 0, 1, 3, 4096).unwrap();

        assert_eq!(1, target.width());
        assert_eq!(1, target.height());
        assert_eq!(&[0.0f32, 0.0, 0.0], target.data());
    }

    #[test]
    fn invalid_channel_count() {
        for channels in [0, 5, 16] {
            assert!(matches!(
                EncodedBuffer::new("test", 1, 1, channels, 4096),
                Err(Error::InvalidChannelCount(c)) if c == channels,
            ));
        }
    }

    #[test]
    fn zero_row_width() {
        assert!(matches!(
            EncodedBuffer::new("test", 4, 1, 1, 0),
            Err(Error::InvalidRowWidth(0)),
        ));
    }

    #[test]
    fn round_trip() {
        let items: Vec<Vec3> = (0..37)
            .map(|idx| vec3(idx as f32, -(idx as f32), 0.5 * idx as f32))
            .collect();

        for max_row_width in [1, 4, 7, 64] {
            let target =
                EncodedBuffer::encode_pod("test", &items, 1, 3, max_row_width)
                    .unwrap();

            for (idx, item) in items.iter().enumerate() {
                assert_eq!(&item.to_array(), target.pixel(idx as u32, 0));
            }
        }
    }

    #[test]
    fn round_trip_of_multi_pixel_elements() {
        let items: Vec<[f32; 8]> = (0..11)
            .map(|idx| {
                let idx = idx as f32;

                [idx, idx + 0.1, idx + 0.2, idx + 0.3, -idx, 1.0, 2.0, 3.0]
            })
            .collect();

        let target = EncodedBuffer::encode_pod("test", &items, 2, 4, 5).unwrap();

        assert_eq!(5, target.width());
        assert_eq!(5, target.height());

        for (idx, item) in items.iter().enumerate() {
            assert_eq!(&item[..4], target.pixel(idx as u32, 0));
            assert_eq!(&item[4..], target.pixel(idx as u32, 1));
        }
    }

    #[test]
    fn to_rgba() {
        let target = EncodedBuffer::encode(
            "test",
            2,
            1,
            3,
            4,
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();

        assert_eq!(
            vec![1.0f32, 2.0, 3.0, 0.0, 4.0, 5.0, 6.0, 0.0],
            target.to_rgba()
        );
    }

    #[test]
    #[should_panic(expected = "overflowed")]
    fn overflow() {
        _ = EncodedBuffer::encode("test", 1, 1, 2, 4, [1.0, 2.0, 3.0]);
    }
}
