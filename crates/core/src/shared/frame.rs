use ndarray::{s, ArrayView3, ArrayViewMut3};

use crate::shared::region::Region;

/// Pixel layout of a [`Frame`] buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Bgr8,
    Gray8,
    /// Little-endian 16-bit depth in millimetres.
    Depth16,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
            PixelFormat::Gray8 => 1,
            PixelFormat::Depth16 => 2,
        }
    }
}

/// A single sensor frame: contiguous bytes in row-major order.
///
/// Conversion to library-specific matrices happens in the adapters; the
/// domain layer only needs dimensions, format and raw bytes.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: PixelFormat, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * format.bytes_per_pixel(),
            "data length must equal width * height * bytes per pixel"
        );
        Self {
            data,
            width,
            height,
            format,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Returns an RGB copy, swapping channels for BGR input and
    /// replicating the single channel for grayscale input.
    ///
    /// Depth frames have no color representation and yield `None`.
    pub fn to_rgb(&self) -> Option<Frame> {
        let data = match self.format {
            PixelFormat::Rgb8 => self.data.clone(),
            PixelFormat::Bgr8 => self
                .data
                .chunks_exact(3)
                .flat_map(|px| [px[2], px[1], px[0]])
                .collect(),
            PixelFormat::Gray8 => self.data.iter().flat_map(|&v| [v, v, v]).collect(),
            PixelFormat::Depth16 => return None,
        };
        Some(Frame::new(
            data,
            self.width,
            self.height,
            PixelFormat::Rgb8,
            self.index,
        ))
    }

    /// Returns a single-channel luma copy (ITU-R BT.601 weights, fixed point).
    ///
    /// Depth frames yield `None`.
    pub fn to_grayscale(&self) -> Option<Frame> {
        let data = match self.format {
            PixelFormat::Gray8 => self.data.clone(),
            PixelFormat::Rgb8 => self
                .data
                .chunks_exact(3)
                .map(|px| luma(px[0], px[1], px[2]))
                .collect(),
            PixelFormat::Bgr8 => self
                .data
                .chunks_exact(3)
                .map(|px| luma(px[2], px[1], px[0]))
                .collect(),
            PixelFormat::Depth16 => return None,
        };
        Some(Frame::new(
            data,
            self.width,
            self.height,
            PixelFormat::Gray8,
            self.index,
        ))
    }

    /// Copies the part of the frame covered by `region`.
    ///
    /// The region is clamped to the frame first; an empty intersection
    /// yields `None`.
    pub fn crop(&self, region: &Region) -> Option<Frame> {
        let r = region.clamp_to(self.width, self.height)?;
        let (x, y) = (r.x as usize, r.y as usize);
        let (w, h) = (r.width as usize, r.height as usize);
        let view = self.as_ndarray();
        let data: Vec<u8> = view.slice(s![y..y + h, x..x + w, ..]).iter().copied().collect();
        Some(Frame::new(
            data,
            r.width as u32,
            r.height as u32,
            self.format,
            self.index,
        ))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.format.bytes_per_pixel(),
        )
    }
}

pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    // 0.299, 0.587, 0.114 scaled by 2^14
    let y = (r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << 13)) >> 14;
    y.min(255) as u8
}
