use captcha_raster::image_transform::{run_pipeline, Output};
use captcha_raster::pixfmt_rgba::Raster;
use captcha_raster::{
    transform_image, CropSpec, ImageCrateCodec, ImageFormat, RasterBuffer, RasterCodec, Rgba8,
    Rotation, TransformParams, WatermarkSpec,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Left half red, right half blue.
fn two_tone(w: u32, h: u32) -> RasterBuffer {
    let mut buf = RasterBuffer::filled(w, h, Rgba8::new_opaque(0, 0, 255));
    for y in 0..h as i32 {
        for x in 0..(w / 2) as i32 {
            buf.put(x, y, Rgba8::new_opaque(255, 0, 0));
        }
    }
    buf
}

#[test]
fn test_source_within_limits_is_untouched() {
    init_logger();
    let codec = ImageCrateCodec;
    let bytes = codec.encode(&two_tone(64, 48), ImageFormat::Png, 90, 6).unwrap();
    let (source, format) = codec.decode(&bytes).unwrap();

    let params = TransformParams {
        max_width: Some(640),
        max_height: Some(480),
        formats: vec![ImageFormat::Png, ImageFormat::Jpeg],
        source_format: Some(format),
        ..TransformParams::default()
    };
    let outcome = run_pipeline(&codec, &source, &params).unwrap();
    assert_eq!(outcome.output, Output::PassThrough);
    assert!(!outcome.modified);

    let (buf, ok) = transform_image(source.clone(), &params);
    assert!(ok);
    assert_eq!(buf, source);
}

#[test]
fn test_full_pipeline_encodes_result() {
    init_logger();
    let codec = ImageCrateCodec;
    let source = two_tone(300, 100);
    let params = TransformParams {
        rotate: Some(Rotation::Degrees(180.0)),
        crop: Some(CropSpec::Auto {
            ratio: "1:1".into(),
            offset: (0.0, 0.5),
        }),
        max_width: Some(50),
        max_height: Some(50),
        watermark: Some(WatermarkSpec {
            image: RasterBuffer::filled(4, 2, Rgba8::new_opaque(255, 255, 255)),
            size: 0.5,
            position: (1.0, 1.0),
            opacity: 1.0,
        }),
        formats: vec![ImageFormat::WebP, ImageFormat::Png],
        source_format: Some(ImageFormat::Jpeg),
        ..TransformParams::default()
    };

    let outcome = run_pipeline(&codec, &source, &params).unwrap();
    assert!(outcome.modified);
    assert_eq!((outcome.buffer.width(), outcome.buffer.height()), (50, 50));
    // After the half turn the blue half is on the left; the crop keeps it.
    assert_eq!(outcome.buffer.pixel(5, 5), Rgba8::new_opaque(0, 0, 255));
    // Watermark: 25x13 in the bottom-right corner.
    assert_eq!(outcome.buffer.pixel(45, 45), Rgba8::new_opaque(255, 255, 255));

    let Output::Encoded { format, bytes } = outcome.output else {
        panic!("expected an encoded result");
    };
    assert_eq!(format, ImageFormat::WebP);
    let (decoded, decoded_format) = codec.decode(&bytes).unwrap();
    assert_eq!(decoded_format, ImageFormat::WebP);
    assert_eq!((decoded.width(), decoded.height()), (50, 50));
}

#[test]
fn test_destination_change_forces_encoding() {
    let codec = ImageCrateCodec;
    let source = two_tone(10, 10);
    let params = TransformParams {
        source_format: Some(ImageFormat::Png),
        destination_differs: true,
        ..TransformParams::default()
    };
    let outcome = run_pipeline(&codec, &source, &params).unwrap();
    assert!(!outcome.modified);
    assert!(matches!(outcome.output, Output::Encoded { format: ImageFormat::Png, .. }));
}

#[test]
fn test_bad_crop_ratio_leaves_image_alone() {
    let source = two_tone(40, 20);
    let params = TransformParams {
        crop: Some(CropSpec::Auto {
            ratio: "square-ish".into(),
            offset: (0.5, 0.5),
        }),
        ..TransformParams::default()
    };
    let (buf, ok) = transform_image(source.clone(), &params);
    assert!(ok);
    assert_eq!(buf, source);
}
