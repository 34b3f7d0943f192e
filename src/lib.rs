//! # captcha-raster
//!
//! Procedural CAPTCHA image synthesis and a staged raster transform pipeline.
//!
//! A CAPTCHA is built in layers:
//!
//! 1. **Challenge**: a short random string over a look-alike-free alphabet
//!    ([`generate_challenge`]), checked later with [`compare_challenge`]
//! 2. **Layout**: a jittered grid of cells, some holding glyphs and some
//!    holding debris figures, over a random-walk gradient background
//! 3. **Painting**: glyph outlines and debris polygons rasterized with
//!    anti-aliasing in colors contrasting with the background below them
//! 4. **Post-processing**: a stack blur and PNG encoding
//!
//! The transform pipeline ([`transform_image`]) runs rotate, crop, resize,
//! watermark and format selection over one raster, skipping re-encoding
//! when nothing changed.
//!
//! All randomized operations take an explicit `rand::Rng` so results can be
//! replayed from a seed.

// Foundation types & math
pub mod basics;
pub mod color;
pub mod color_hsv;
pub mod error;
pub mod geometry;

// Pixel storage & rasterization
pub mod blur;
pub mod path_storage;
pub mod pixfmt_rgba;
pub mod polygon;
pub mod rasterizer;
pub mod rendering_buffer;
pub mod stroke;

// Fills & text
pub mod font_engine;
pub mod gradient;

// CAPTCHA
pub mod captcha;
pub mod captcha_layout;
pub mod challenge;
pub mod debris;

// Image I/O & transforms
pub mod codec;
pub mod image_transform;
pub mod orientation;

pub use captcha::{make_captcha_image, make_captcha_image_with_rng, render_captcha, CaptchaOptions};
pub use challenge::{compare_challenge, generate_challenge, generate_challenge_with_rng, DEFAULT_ALPHABET};
pub use codec::{ImageCrateCodec, ImageFormat, RasterCodec};
pub use color::{parse_color, ColorRgba, Rgba8};
pub use error::{Error, Result};
pub use image_transform::{transform_image, CropSpec, Rotation, TransformParams, WatermarkSpec};
pub use rendering_buffer::RasterBuffer;
