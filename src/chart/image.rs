//! Grayscale intensity images packed into RGBA pixels.

use crate::error::{FigureError, Result};
use crate::setting::Settings;
use crate::source::{shared, ColumnDataSource, SharedSource};
use super::figure::Figure;

pub const IMAGE_COLUMN: &str = "image";

/// Row-major grid of intensity codes
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityImage {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl IntensityImage {
    /// Image from equal-length rows, top row first
    pub fn from_rows<R: AsRef<[i64]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(FigureError::ImageShape(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Image from a flat row-major buffer
    pub fn from_flat(data: Vec<i64>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(FigureError::ImageShape(format!(
                "{} values do not fill {}x{}",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }
}

/// Packed little-endian RGBA pixels, bottom row first
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    pub rows: usize,
    pub cols: usize,
    pub pixels: Vec<u32>,
}

impl RgbaImage {
    pub fn pixel(&self, row: usize, col: usize) -> Option<u32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.pixels.get(row * self.cols + col).copied()
    }

    /// Pixels as `[r, g, b, a]` bytes, top row first, for texture upload
    pub fn to_rgba_bytes_top_down(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for row in self.pixels.chunks(self.cols.max(1)).rev() {
            for pixel in row {
                bytes.extend_from_slice(&pixel.to_le_bytes());
            }
        }
        bytes
    }
}

/// Pack intensity codes of the given bit depth into gray RGBA pixels.
///
/// `gray = 255 - round(value / (2^bits - 1) * 255)`, written to the red,
/// green and blue lanes with alpha 255. Values outside the code range are
/// not clamped; the gray level wraps into the byte. The output is flipped
/// vertically so the input's last row becomes row 0.
pub fn pack_grayscale(image: &IntensityImage, bits: u32) -> Result<RgbaImage> {
    if !(1..=16).contains(&bits) {
        return Err(FigureError::InvalidBitDepth(bits));
    }
    let divisor = ((1u32 << bits) - 1) as f64;

    let mut pixels = Vec::with_capacity(image.rows * image.cols);
    for row in (0..image.rows).rev() {
        let start = row * image.cols;
        for &value in &image.data[start..start + image.cols] {
            let level = (value as f64 / divisor * 255.0).round() as i64;
            let gray = 255i64.wrapping_sub(level) as u8;
            pixels.push(u32::from_le_bytes([gray, gray, gray, 255]));
        }
    }

    Ok(RgbaImage {
        rows: image.rows,
        cols: image.cols,
        pixels,
    })
}

#[derive(Debug, Clone)]
pub struct GrayscaleOptions {
    pub bits: u32,
}

impl Default for GrayscaleOptions {
    fn default() -> Self {
        Self { bits: 4 }
    }
}

impl GrayscaleOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bits: settings
                .get_int("grayscale.bits")
                .and_then(|b| u32::try_from(b).ok())
                .unwrap_or(4),
        }
    }
}

impl Figure {
    /// Draw `image` as a grayscale picture spanning `0..cols` by `0..rows`
    pub fn grayscale(&mut self, image: &IntensityImage, options: GrayscaleOptions) -> Result<SharedSource> {
        let packed = pack_grayscale(image, options.bits)?;
        let (rows, cols) = (packed.rows, packed.cols);

        let mut data = ColumnDataSource::new();
        data.insert(IMAGE_COLUMN, packed.pixels);
        let source = shared(data);

        self.image_rgba(IMAGE_COLUMN, cols, rows, 0.0, 0.0, cols as f64, rows as f64, source.clone());
        tracing::debug!("grayscale plotted: {}x{} at {} bits", rows, cols, options.bits);
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::glyph::Glyph;
    use crate::source::read_source;

    fn lanes(pixel: u32) -> [u8; 4] {
        pixel.to_le_bytes()
    }

    #[test]
    fn test_zero_is_white() {
        let image = IntensityImage::from_rows(&[[0i64; 8]; 8]).unwrap();
        let packed = pack_grayscale(&image, 4).unwrap();
        assert_eq!(packed.pixels.len(), 64);
        assert!(packed.pixels.iter().all(|&p| lanes(p) == [255, 255, 255, 255]));
    }

    #[test]
    fn test_max_intensity_is_black() {
        let image = IntensityImage::from_rows(&[[15i64, 15], [15, 15]]).unwrap();
        let packed = pack_grayscale(&image, 4).unwrap();
        assert!(packed.pixels.iter().all(|&p| lanes(p) == [0, 0, 0, 255]));

        let image = IntensityImage::from_rows(&[[255i64]]).unwrap();
        assert_eq!(lanes(pack_grayscale(&image, 8).unwrap().pixels[0]), [0, 0, 0, 255]);
    }

    #[test]
    fn test_rows_are_flipped() {
        let image = IntensityImage::from_rows(&[vec![0i64, 0], vec![15, 15], vec![5, 10]]).unwrap();
        let packed = pack_grayscale(&image, 4).unwrap();
        // Input row 2 becomes output row 0
        assert_eq!(lanes(packed.pixel(0, 0).unwrap())[0], 170);
        assert_eq!(lanes(packed.pixel(0, 1).unwrap())[0], 85);
        assert_eq!(lanes(packed.pixel(1, 0).unwrap())[0], 0);
        assert_eq!(lanes(packed.pixel(2, 1).unwrap())[0], 255);
    }

    #[test]
    fn test_out_of_range_wraps() {
        let image = IntensityImage::from_rows(&[[16i64, -1]]).unwrap();
        let packed = pack_grayscale(&image, 4).unwrap();
        // 255 - 272 = -17 wraps to 239; 255 + 17 = 272 wraps to 16
        assert_eq!(lanes(packed.pixels[0]), [239, 239, 239, 255]);
        assert_eq!(lanes(packed.pixels[1]), [16, 16, 16, 255]);
    }

    #[test]
    fn test_extreme_codes_wrap_without_overflow() {
        let image = IntensityImage::from_rows(&[[-100_000_000_000_000_000i64, 100_000_000_000_000_000]]).unwrap();
        let packed = pack_grayscale(&image, 1).unwrap();
        // Levels saturate to i64::MIN / i64::MAX before wrapping into the byte
        assert_eq!(lanes(packed.pixels[0]), [255, 255, 255, 255]);
        assert_eq!(lanes(packed.pixels[1]), [0, 0, 0, 255]);
    }

    #[test]
    fn test_bad_shapes_and_bits() {
        assert!(matches!(
            IntensityImage::from_rows(&[vec![1i64, 2], vec![3]]),
            Err(FigureError::ImageShape(_))
        ));
        assert!(matches!(
            IntensityImage::from_flat(vec![1, 2, 3], 2, 2),
            Err(FigureError::ImageShape(_))
        ));
        let image = IntensityImage::from_rows(&[[1i64]]).unwrap();
        assert!(matches!(pack_grayscale(&image, 0), Err(FigureError::InvalidBitDepth(0))));
        assert!(matches!(pack_grayscale(&image, 17), Err(FigureError::InvalidBitDepth(17))));
    }

    #[test]
    fn test_top_down_bytes() {
        let image = IntensityImage::from_rows(&[[0i64], [15]]).unwrap();
        let packed = pack_grayscale(&image, 4).unwrap();
        assert_eq!(packed.to_rgba_bytes_top_down(), vec![255, 255, 255, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn test_figure_grayscale() {
        let digits: Vec<i64> = (0..64).map(|i| i % 16).collect();
        let image = IntensityImage::from_flat(digits, 8, 8).unwrap();
        let mut fig = Figure::default();
        let source = fig.grayscale(&image, GrayscaleOptions::default()).unwrap();

        assert_eq!(read_source(&source).unwrap().get(IMAGE_COLUMN).map(|c| c.len()), Some(64));
        assert!(matches!(
            fig.renderers()[0].glyph(),
            Glyph::ImageRgba { cols: 8, rows: 8, dw, dh, .. } if *dw == 8.0 && *dh == 8.0
        ));
        assert!(fig.validate().is_ok());
    }
}
