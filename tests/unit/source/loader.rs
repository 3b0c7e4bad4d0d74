use std::cell::{Cell, RefCell};
use std::io::Cursor;

use super::*;
use crate::source::decode::{FrameFormat, FrameSamples};

/// Scripted decoder: fails with a profile error until `ignore_color_profile`
/// is set (or always, if `always_corrupt`), recording every call's options.
struct ProfileTrap {
    calls: RefCell<Vec<DecodeOptions>>,
    always_corrupt: bool,
}

impl ProfileTrap {
    fn new(always_corrupt: bool) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            always_corrupt,
        }
    }
}

impl FrameDecoder for ProfileTrap {
    fn decode(&self, _encoded: &[u8], opts: DecodeOptions) -> PixsurfResult<DecodedFrame> {
        self.calls.borrow_mut().push(opts);
        if self.always_corrupt || !opts.ignore_color_profile {
            return Err(PixsurfError::color_profile("bad tag table"));
        }
        DecodedFrame::packed(
            2,
            3,
            FrameFormat::Rgb8,
            FrameSamples::U8(vec![200; 2 * 3 * 3]),
        )
    }
}

struct NotAnImage {
    calls: Cell<u32>,
}

impl FrameDecoder for NotAnImage {
    fn decode(&self, _encoded: &[u8], _opts: DecodeOptions) -> PixsurfResult<DecodedFrame> {
        self.calls.set(self.calls.get() + 1);
        Err(PixsurfError::invalid_image_data("unknown format"))
    }
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(image::RgbImage::new(w, h))
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn corrupt_profile_is_retried_once_with_profile_ignored() {
    let loader = SourceLoader::with_decoder(ProfileTrap::new(false), LoadOptions::default()).unwrap();
    let mut s = loader.load_bytes(vec![1u8, 2, 3]).unwrap().unwrap();

    let calls = loader.decoder.calls.borrow().clone();
    assert_eq!(
        calls,
        vec![
            DecodeOptions::default(),
            DecodeOptions {
                ignore_color_profile: true
            }
        ]
    );
    assert_eq!((s.width(), s.height()), (2, 3));
    let px = s.lock().unwrap().get(1, 2).unwrap();
    assert_eq!(px, crate::Color::rgba(200, 200, 200, 255));
}

#[test]
fn persistent_profile_failure_becomes_invalid_image_data() {
    let loader = SourceLoader::with_decoder(ProfileTrap::new(true), LoadOptions::default()).unwrap();
    let err = loader.load_bytes(vec![1u8]).unwrap_err();
    assert!(matches!(err, PixsurfError::InvalidImageData(_)), "{err}");
    assert_eq!(loader.decoder.calls.borrow().len(), 2);
}

#[test]
fn retry_can_be_disabled() {
    let opts = LoadOptions {
        retry_ignoring_color_profile: false,
        ..LoadOptions::default()
    };
    let loader = SourceLoader::with_decoder(ProfileTrap::new(false), opts).unwrap();
    let err = loader.load_bytes(vec![1u8]).unwrap_err();
    assert!(matches!(err, PixsurfError::InvalidImageData(_)));
    assert_eq!(loader.decoder.calls.borrow().len(), 1);
}

#[test]
fn other_decode_failures_are_not_retried() {
    let loader = SourceLoader::with_decoder(
        NotAnImage {
            calls: Cell::new(0),
        },
        LoadOptions::default(),
    )
    .unwrap();
    let err = loader.load_bytes(vec![0x00u8, 0x01]).unwrap_err();
    assert!(matches!(err, PixsurfError::InvalidImageData(_)));
    assert_eq!(loader.decoder.calls.get(), 1);
}

#[test]
fn empty_bytes_produce_no_surface_without_decoding() {
    let loader = SourceLoader::with_decoder(
        NotAnImage {
            calls: Cell::new(0),
        },
        LoadOptions::default(),
    )
    .unwrap();
    assert!(loader.load_bytes(Vec::<u8>::new()).unwrap().is_none());
    assert_eq!(loader.decoder.calls.get(), 0);
}

#[test]
fn loaded_bytes_are_retained_until_dispose() {
    let bytes = png_bytes(3, 2);
    let loader = SourceLoader::new(LoadOptions::default()).unwrap();
    let mut s = loader.load_bytes(bytes.clone()).unwrap().unwrap();
    assert_eq!(s.source_bytes().unwrap(), Some(bytes.as_slice()));

    s.dispose();
    assert!(s.source_bytes().is_err());
}

#[test]
fn missing_file_is_an_io_error() {
    let loader = SourceLoader::new(LoadOptions::default()).unwrap();
    let err = loader
        .load_path("target/pixsurf-does-not-exist/nothing.png")
        .unwrap_err();
    assert!(matches!(err, PixsurfError::Other(_)));
    assert!(err.to_string().contains("read image"));
}

#[test]
fn blank_uses_configured_alignment() {
    let loader = SourceLoader::new(LoadOptions {
        row_alignment: 32,
        ..LoadOptions::default()
    })
    .unwrap();
    let s = loader.blank(3, 3).unwrap();
    assert_eq!(s.stride(), 32);
    assert!(matches!(
        loader.blank(0, 3),
        Err(PixsurfError::InvalidDimensions { .. })
    ));
}

#[test]
fn options_json_defaults_and_validation() {
    let opts = LoadOptions::from_json_str("{}").unwrap();
    assert_eq!(opts, LoadOptions::default());

    let opts =
        LoadOptions::from_json_str(r#"{"row_alignment": 64, "limits": {"max_width": 100}}"#)
            .unwrap();
    assert_eq!(opts.row_alignment, 64);
    assert_eq!(opts.limits.max_width, Some(100));
    assert!(opts.retry_ignoring_color_profile);

    let bad = LoadOptions::from_json_str(r#"{"row_alignment": 12}"#).unwrap_err();
    assert!(matches!(bad, PixsurfError::Validation(_)));

    assert!(LoadOptions::from_json_str("not json").is_err());
    assert!(
        SourceLoader::new(LoadOptions {
            row_alignment: 0,
            ..LoadOptions::default()
        })
        .is_err()
    );
}
