//! Raster codecs.
//!
//! [`ImageFormat`] is the closed set of formats the pipeline can name;
//! [`RasterCodec`] is the decode/encode seam. [`ImageCrateCodec`] implements
//! it on top of the `image` crate.

use core::fmt;
use core::str::FromStr;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageDecoder, ImageEncoder, RgbaImage};

use crate::error::{Error, Result};
use crate::rendering_buffer::RasterBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    WebP,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 5] = [
        ImageFormat::Png,
        ImageFormat::Jpeg,
        ImageFormat::Gif,
        ImageFormat::Bmp,
        ImageFormat::WebP,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::WebP => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Whether the format stores an alpha channel.
    pub fn has_alpha(self) -> bool {
        !matches!(self, ImageFormat::Jpeg | ImageFormat::Bmp)
    }

    fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::WebP => image::ImageFormat::WebP,
        }
    }

    fn from_image_format(f: image::ImageFormat) -> Option<Self> {
        match f {
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            image::ImageFormat::Gif => Some(ImageFormat::Gif),
            image::ImageFormat::Bmp => Some(ImageFormat::Bmp),
            image::ImageFormat::WebP => Some(ImageFormat::WebP),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Accepts extensions (`"jpg"`, `".png"`) and MIME types (`"image/webp"`).
impl FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().trim_start_matches('.').to_ascii_lowercase();
        let key = key.strip_prefix("image/").unwrap_or(&key);
        match key {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" | "jpe" => Ok(ImageFormat::Jpeg),
            "gif" => Ok(ImageFormat::Gif),
            "bmp" | "x-ms-bmp" => Ok(ImageFormat::Bmp),
            "webp" => Ok(ImageFormat::WebP),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

// ============================================================================
// Codec seam
// ============================================================================

/// Decode bytes into a [`RasterBuffer`] and encode it back.
pub trait RasterCodec {
    fn decode(&self, bytes: &[u8]) -> Result<(RasterBuffer, ImageFormat)>;

    /// `quality` (1..=100) applies to lossy formats, `compression` (0..=9)
    /// to PNG. Other formats ignore them.
    fn encode(&self, buf: &RasterBuffer, format: ImageFormat, quality: u8, compression: u8) -> Result<Vec<u8>>;

    fn can_write(&self, format: ImageFormat) -> bool;

    /// EXIF orientation tag (1-8) stored in `bytes`, if any.
    fn exif_orientation(&self, _bytes: &[u8]) -> Option<u8> {
        None
    }
}

/// [`RasterCodec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateCodec;

fn codec_error(e: image::ImageError) -> Error {
    Error::Codec(e.to_string())
}

fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

impl RasterCodec for ImageCrateCodec {
    fn decode(&self, bytes: &[u8]) -> Result<(RasterBuffer, ImageFormat)> {
        let guessed = image::guess_format(bytes).map_err(codec_error)?;
        let format = ImageFormat::from_image_format(guessed)
            .ok_or_else(|| Error::UnsupportedFormat(format!("{guessed:?}")))?;
        let img = image::load_from_memory_with_format(bytes, guessed)
            .map_err(codec_error)?
            .to_rgba8();
        let (w, h) = img.dimensions();
        let buf = RasterBuffer::from_raw(w, h, img.into_raw())
            .ok_or_else(|| Error::Codec("decoded pixel data has the wrong size".into()))?;
        Ok((buf, format))
    }

    fn encode(&self, buf: &RasterBuffer, format: ImageFormat, quality: u8, compression: u8) -> Result<Vec<u8>> {
        if buf.is_empty() {
            return Err(Error::Codec("cannot encode an empty raster".into()));
        }
        let (w, h) = (buf.width(), buf.height());
        let mut out = Cursor::new(Vec::new());
        match format {
            ImageFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut out,
                    png_compression(compression),
                    FilterType::Adaptive,
                );
                encoder
                    .write_image(buf.data(), w, h, ExtendedColorType::Rgba8)
                    .map_err(codec_error)?;
            }
            ImageFormat::Jpeg => {
                let rgb: Vec<u8> = buf
                    .data()
                    .chunks_exact(4)
                    .flat_map(|px| [px[0], px[1], px[2]])
                    .collect();
                let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
                encoder
                    .encode(&rgb, w, h, ExtendedColorType::Rgb8)
                    .map_err(codec_error)?;
            }
            ImageFormat::Gif | ImageFormat::Bmp | ImageFormat::WebP => {
                let img = RgbaImage::from_raw(w, h, buf.data().to_vec())
                    .ok_or_else(|| Error::Codec("raster size mismatch".into()))?;
                let img = if format.has_alpha() {
                    image::DynamicImage::ImageRgba8(img)
                } else {
                    image::DynamicImage::ImageRgb8(image::DynamicImage::ImageRgba8(img).to_rgb8())
                };
                img.write_to(&mut out, format.to_image_format())
                    .map_err(codec_error)?;
            }
        }
        Ok(out.into_inner())
    }

    fn can_write(&self, _format: ImageFormat) -> bool {
        true
    }

    fn exif_orientation(&self, bytes: &[u8]) -> Option<u8> {
        let mut decoder = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .ok()?
            .into_decoder()
            .ok()?;
        decoder.orientation().ok().map(|o| o.to_exif())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;
    use crate::pixfmt_rgba::Raster;

    fn sample() -> RasterBuffer {
        let mut buf = RasterBuffer::filled(6, 4, Rgba8::new_opaque(10, 120, 240));
        buf.put(1, 1, Rgba8::new(255, 0, 0, 128));
        buf
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!(".jpeg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!("image/webp".parse::<ImageFormat>().unwrap(), ImageFormat::WebP);
        assert!(matches!(
            "tiff".parse::<ImageFormat>(),
            Err(Error::UnsupportedFormat(_))
        ));
        for f in ImageFormat::ALL {
            assert_eq!(f.extension().parse::<ImageFormat>().unwrap(), f);
            assert_eq!(f.mime_type().parse::<ImageFormat>().unwrap(), f);
        }
    }

    #[test]
    fn test_png_is_lossless() {
        let codec = ImageCrateCodec;
        let buf = sample();
        let bytes = codec.encode(&buf, ImageFormat::Png, 90, 6).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let (decoded, format) = codec.decode(&bytes).unwrap();
        assert_eq!(format, ImageFormat::Png);
        assert_eq!(decoded, buf);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let codec = ImageCrateCodec;
        let bytes = codec.encode(&sample(), ImageFormat::Jpeg, 85, 0).unwrap();
        let (decoded, format) = codec.decode(&bytes).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
        assert_eq!((decoded.width(), decoded.height()), (6, 4));
        assert!(decoded.pixel(4, 2).is_opaque());
    }

    #[test]
    fn test_other_formats_encode() {
        let codec = ImageCrateCodec;
        for f in [ImageFormat::Gif, ImageFormat::Bmp, ImageFormat::WebP] {
            let bytes = codec.encode(&sample(), f, 80, 6).unwrap();
            let (decoded, format) = codec.decode(&bytes).unwrap();
            assert_eq!(format, f);
            assert_eq!(decoded.width(), 6);
        }
    }

    #[test]
    fn test_exif_orientation_defaults_to_identity() {
        let codec = ImageCrateCodec;
        let bytes = codec.encode(&sample(), ImageFormat::Png, 90, 6).unwrap();
        assert_eq!(codec.exif_orientation(&bytes), Some(1));
        assert_eq!(codec.exif_orientation(b"garbage"), None);
    }

    #[test]
    fn test_failures() {
        let codec = ImageCrateCodec;
        assert!(codec.decode(b"definitely not an image").is_err());
        assert!(codec.encode(&RasterBuffer::new(0, 0), ImageFormat::Png, 90, 6).is_err());
    }
}
