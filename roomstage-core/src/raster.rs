//! Raster image and binary mask primitives

use crate::error::{Error, Result};
use crate::geometry::PixelRect;
use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};

/// Threshold separating background from object when binarizing oracle masks.
pub const DEFAULT_BINARIZE_THRESHOLD: u8 = 128;

/// An immutable RGBA raster. Derived images are always new values.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    inner: RgbaImage,
}

impl RasterImage {
    /// Create an opaque black raster
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            inner: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
        }
    }

    pub fn from_rgba(inner: RgbaImage) -> Self {
        Self { inner }
    }

    pub fn from_rgb(rgb: image::RgbImage) -> Self {
        let (width, height) = rgb.dimensions();
        let mut inner = RgbaImage::new(width, height);
        for (x, y, px) in rgb.enumerate_pixels() {
            inner.put_pixel(x, y, Rgba([px[0], px[1], px[2], 255]));
        }
        Self { inner }
    }

    /// Build from a raw interleaved buffer with 3 or 4 channels
    pub fn from_pixels(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let pixels = width as usize * height as usize;
        if pixels == 0 {
            return Err(Error::InvalidRaster("zero-sized raster".to_string()));
        }
        if data.len() == pixels * 4 {
            let buf = RgbaImage::from_raw(width, height, data.to_vec())
                .ok_or_else(|| Error::InvalidRaster("buffer length mismatch".to_string()))?;
            Ok(Self { inner: buf })
        } else if data.len() == pixels * 3 {
            let rgb = image::RgbImage::from_raw(width, height, data.to_vec())
                .ok_or_else(|| Error::InvalidRaster("buffer length mismatch".to_string()))?;
            Ok(Self::from_rgb(rgb))
        } else {
            Err(Error::InvalidRaster(format!(
                "expected {} (RGB) or {} (RGBA) bytes, got {}",
                pixels * 3,
                pixels * 4,
                data.len()
            )))
        }
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.inner
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.inner
    }

    /// Resample to the given dimensions (bilinear). Returns a new value;
    /// a same-size request is a cheap clone.
    pub fn resize_to(&self, width: u32, height: u32) -> RasterImage {
        if (width, height) == self.inner.dimensions() {
            return self.clone();
        }
        Self {
            inner: imageops::resize(&self.inner, width, height, imageops::FilterType::Triangle),
        }
    }

    /// Resample without interpolation. Used for color-coded mask images
    /// where blending adjacent object colors would invent new objects.
    pub fn resize_nearest(&self, width: u32, height: u32) -> RasterImage {
        if (width, height) == self.inner.dimensions() {
            return self.clone();
        }
        Self {
            inner: imageops::resize(&self.inner, width, height, imageops::FilterType::Nearest),
        }
    }

    /// Crop a sub-rectangle; the rect must lie within the raster
    pub fn crop(&self, rect: PixelRect) -> Result<RasterImage> {
        if rect.is_empty() || rect.right() > self.width() || rect.bottom() > self.height() {
            return Err(Error::InvalidGeometry(format!(
                "crop rect {}x{}+{}+{} outside {}x{} raster",
                rect.width,
                rect.height,
                rect.x,
                rect.y,
                self.width(),
                self.height()
            )));
        }
        Ok(Self {
            inner: imageops::crop_imm(&self.inner, rect.x, rect.y, rect.width, rect.height)
                .to_image(),
        })
    }

    /// Produce an RGBA cutout: mask value becomes the alpha channel
    pub fn apply_alpha_mask(&self, mask: &BinaryMask) -> Result<RasterImage> {
        self.check_mask_dims(mask)?;
        let mut out = self.inner.clone();
        for (x, y, px) in out.enumerate_pixels_mut() {
            px[3] = mask.value_at(x, y);
        }
        Ok(Self { inner: out })
    }

    /// Clear masked pixels to full transparency (background extraction)
    pub fn clear_masked(&self, mask: &BinaryMask) -> Result<RasterImage> {
        self.check_mask_dims(mask)?;
        let mut out = self.inner.clone();
        for (x, y, px) in out.enumerate_pixels_mut() {
            if mask.value_at(x, y) != 0 {
                *px = Rgba([0, 0, 0, 0]);
            }
        }
        Ok(Self { inner: out })
    }

    fn check_mask_dims(&self, mask: &BinaryMask) -> Result<()> {
        if (mask.width(), mask.height()) != self.inner.dimensions() {
            return Err(Error::DimensionMismatch {
                expected_width: self.width(),
                expected_height: self.height(),
                actual_width: mask.width(),
                actual_height: mask.height(),
            });
        }
        Ok(())
    }
}

/// A width x height grid of {0, 255} values
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl BinaryMask {
    /// All-zero mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    /// Build from raw data that is already strictly {0, 255}
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if data.len() != width as usize * height as usize {
            return Err(Error::InvalidRaster(format!(
                "mask buffer length {} does not match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        if data.iter().any(|&v| v != 0 && v != 255) {
            return Err(Error::InvalidRaster(
                "mask values must be exactly 0 or 255".to_string(),
            ));
        }
        Ok(Self { width, height, data })
    }

    /// Binarize a grayscale image: values >= threshold become 255
    pub fn binarize(gray: &GrayImage, threshold: u8) -> Self {
        let (width, height) = gray.dimensions();
        let data = gray
            .pixels()
            .map(|p| if p[0] >= threshold { 255 } else { 0 })
            .collect();
        Self { width, height, data }
    }

    /// Binarize a color raster through its luma
    pub fn binarize_raster(raster: &RasterImage, threshold: u8) -> Self {
        let (width, height) = raster.dimensions();
        let mut gray = GrayImage::new(width, height);
        for (x, y, px) in raster.as_rgba().enumerate_pixels() {
            let luma =
                (px[0] as u32 * 299 + px[1] as u32 * 587 + px[2] as u32 * 114) / 1000;
            gray.put_pixel(x, y, Luma([luma as u8]));
        }
        Self::binarize(&gray, threshold)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw value at (x, y): 0 or 255. Out-of-bounds reads are 0.
    pub fn value_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.value_at(x, y) != 0
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x < self.width && y < self.height {
            self.data[y as usize * self.width as usize + x as usize] =
                if on { 255 } else { 0 };
        }
    }

    /// Number of non-zero pixels
    pub fn pixel_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Non-zero pixel count over total pixels
    pub fn area_fraction(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.pixel_count() as f32 / self.data.len() as f32
    }

    /// Tight bounding box of non-zero pixels, None for an empty mask
    pub fn bounding_box(&self) -> Option<PixelRect> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0u32;
        let mut max_y = 0u32;
        let mut any = false;
        for y in 0..self.height {
            let row = &self.data
                [y as usize * self.width as usize..(y as usize + 1) * self.width as usize];
            for (x, &v) in row.iter().enumerate() {
                if v != 0 {
                    let x = x as u32;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                    any = true;
                }
            }
        }
        if !any {
            return None;
        }
        Some(PixelRect::new(
            min_x,
            min_y,
            max_x - min_x + 1,
            max_y - min_y + 1,
        ))
    }

    /// Set every pixel inside the rect (clamped to the mask bounds)
    pub fn fill_rect(&mut self, rect: PixelRect) {
        let right = rect.right().min(self.width);
        let bottom = rect.bottom().min(self.height);
        for y in rect.y.min(self.height)..bottom {
            let row_start = y as usize * self.width as usize;
            for x in rect.x.min(self.width)..right {
                self.data[row_start + x as usize] = 255;
            }
        }
    }

    /// Nearest-neighbor resample; stays strictly binary
    pub fn resize_to(&self, width: u32, height: u32) -> BinaryMask {
        if (width, height) == (self.width, self.height) {
            return self.clone();
        }
        let resized = imageops::resize(
            &self.to_gray(),
            width,
            height,
            imageops::FilterType::Nearest,
        );
        Self::binarize(&resized, DEFAULT_BINARIZE_THRESHOLD)
    }

    pub fn crop(&self, rect: PixelRect) -> Result<BinaryMask> {
        if rect.is_empty() || rect.right() > self.width || rect.bottom() > self.height {
            return Err(Error::InvalidGeometry(format!(
                "crop rect {}x{}+{}+{} outside {}x{} mask",
                rect.width, rect.height, rect.x, rect.y, self.width, self.height
            )));
        }
        let mut out = BinaryMask::new(rect.width, rect.height);
        for y in 0..rect.height {
            for x in 0..rect.width {
                out.set(x, y, self.is_set(rect.x + x, rect.y + y));
            }
        }
        Ok(out)
    }

    /// Merge another mask of identical dimensions into this one
    pub fn union_with(&mut self, other: &BinaryMask) -> Result<()> {
        if (other.width, other.height) != (self.width, self.height) {
            return Err(Error::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                actual_width: other.width,
                actual_height: other.height,
            });
        }
        for (dst, &src) in self.data.iter_mut().zip(other.data.iter()) {
            if src != 0 {
                *dst = 255;
            }
        }
        Ok(())
    }

    pub fn to_gray(&self) -> GrayImage {
        GrayImage::from_raw(self.width, self.height, self.data.clone())
            .expect("mask buffer length is width * height by construction")
    }
}
