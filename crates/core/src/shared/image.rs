use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Pixel, Rgb, RgbImage};
use ndarray::ArrayView3;

/// How the pixel bytes of an [`Image`] are interpreted.
///
/// Three channels select the color path; every other channel count is read
/// as grayscale, so an unusual layout never fails extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    Color,
    Grayscale,
}

/// A single input image: contiguous 8-bit pixels in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Image {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    pub fn from_rgb(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height, 3)
    }

    pub fn from_gray(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height, 1)
    }

    /// Keeps 8-bit luma images single-channel; everything else becomes RGB.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(gray) => Self::from_gray(gray),
            other => Self::from_rgb(other.to_rgb8()),
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

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn layout(&self) -> PixelLayout {
        if self.channels == 3 {
            PixelLayout::Color
        } else {
            PixelLayout::Grayscale
        }
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Image data length must match dimensions")
    }

    /// Brings the buffer into one of the two supported layouts.
    ///
    /// Color and single-channel images are borrowed unchanged. Any other
    /// channel count is reduced to one channel holding the first channel of
    /// each pixel.
    pub fn normalized(&self) -> Cow<'_, Image> {
        if self.channels == 3 || self.channels == 1 {
            return Cow::Borrowed(self);
        }
        let stride = self.channels.max(1) as usize;
        let data = self.data.iter().step_by(stride).copied().collect();
        Cow::Owned(Image::new(data, self.width, self.height, 1))
    }

    /// Uniformly resized copy; each side becomes `round(side * scale)`,
    /// never less than one pixel.
    ///
    /// Expects a normalized (1- or 3-channel) image.
    pub fn resized(&self, scale: f64) -> Image {
        if self.width == 0 || self.height == 0 {
            return self.clone();
        }
        let nw = ((self.width as f64 * scale).round() as u32).max(1);
        let nh = ((self.height as f64 * scale).round() as u32).max(1);

        match self.layout() {
            PixelLayout::Color => {
                let view: ImageBuffer<Rgb<u8>, &[u8]> =
                    ImageBuffer::from_raw(self.width, self.height, &self.data[..])
                        .expect("Image data length must match dimensions");
                Image::from_rgb(imageops::resize(&view, nw, nh, FilterType::Triangle))
            }
            PixelLayout::Grayscale => {
                let gray = self.to_luma();
                Image::from_gray(imageops::resize(&gray, nw, nh, FilterType::Triangle))
            }
        }
    }

    /// Pixel intensity at column `x`, row `y`: luma for color images, the
    /// first channel otherwise.
    pub fn intensity(&self, x: u32, y: u32) -> u8 {
        intensity_at(&self.as_ndarray(), self.layout(), y as usize, x as usize)
    }

    pub fn to_luma(&self) -> GrayImage {
        if self.channels == 1 {
            return GrayImage::from_raw(self.width, self.height, self.data.clone())
                .expect("Image data length must match dimensions");
        }
        let arr = self.as_ndarray();
        let layout = self.layout();
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([intensity_at(&arr, layout, y as usize, x as usize)])
        })
    }

    /// RGB copy for drawing; grayscale intensities are replicated.
    pub fn to_rgb(&self) -> RgbImage {
        match self.layout() {
            PixelLayout::Color => RgbImage::from_raw(self.width, self.height, self.data.clone())
                .expect("Image data length must match dimensions"),
            PixelLayout::Grayscale => {
                let arr = self.as_ndarray();
                RgbImage::from_fn(self.width, self.height, |x, y| {
                    let v = intensity_at(&arr, PixelLayout::Grayscale, y as usize, x as usize);
                    Rgb([v, v, v])
                })
            }
        }
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

fn intensity_at(arr: &ArrayView3<'_, u8>, layout: PixelLayout, row: usize, col: usize) -> u8 {
    match layout {
        PixelLayout::Color => {
            Rgb([arr[[row, col, 0]], arr[[row, col, 1]], arr[[row, col, 2]]]).to_luma()[0]
        }
        PixelLayout::Grayscale => arr[[row, col, 0]],
    }
}
