// ============================================================================
// Decoder Strategy Tests
// ============================================================================

use super::{Decoder, DecoderRegistry, IdentityDecoder, Yuv420Decoder};
use crate::media::{
    error::PipeError,
    types::{FrameFormat, OutputLayout, PixelEncoding},
};

fn bgra_format(width: u32, height: u32) -> FrameFormat {
    FrameFormat {
        encoding: PixelEncoding::Bgra,
        width,
        height,
        stride: width,
        pitch: width * 4,
        bpp: 32,
    }
}

fn yuv_format(width: u32, height: u32) -> FrameFormat {
    FrameFormat {
        encoding: PixelEncoding::Yuv420,
        width,
        height,
        stride: width,
        pitch: width,
        bpp: 12,
    }
}

// ------------------------------------------------------------------------
// IdentityDecoder Tests
// ------------------------------------------------------------------------

#[test]
fn test_identity_copies_packed_frame() {
    let mut decoder = IdentityDecoder::new();
    decoder.initialize(&bgra_format(4, 4)).unwrap();

    let raw: Vec<u8> = (0u8..64).collect();
    decoder.decode(&raw, 16).unwrap();

    assert_eq!(decoder.output_layout(), OutputLayout::PackedBgra);
    assert_eq!(decoder.frame_pitch(), 16);
    assert_eq!(decoder.buffer().unwrap(), raw.as_slice());
}

#[test]
fn test_identity_strips_source_padding() {
    let mut decoder = IdentityDecoder::new();
    decoder.initialize(&bgra_format(2, 2)).unwrap();

    // 8 row bytes plus 4 bytes of padding per source row
    let mut raw = vec![0u8; 20];
    raw[0..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
    raw[12..20].copy_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]);

    decoder.decode(&raw, 12).unwrap();
    assert_eq!(
        decoder.buffer().unwrap(),
        &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]
    );
}

#[test]
fn test_identity_not_ready_before_decode() {
    let mut decoder = IdentityDecoder::new();
    decoder.initialize(&bgra_format(4, 4)).unwrap();

    assert!(matches!(decoder.buffer(), Err(PipeError::NotReady)));
}

#[test]
fn test_identity_rejects_short_frame() {
    let mut decoder = IdentityDecoder::new();
    decoder.initialize(&bgra_format(4, 4)).unwrap();

    let raw = vec![0u8; 10];
    assert!(matches!(
        decoder.decode(&raw, 16),
        Err(PipeError::DecodeFailed(_))
    ));
    assert!(matches!(decoder.buffer(), Err(PipeError::NotReady)));
}

#[test]
fn test_identity_rejects_odd_bpp() {
    let mut decoder = IdentityDecoder::new();
    let mut format = bgra_format(4, 4);
    format.bpp = 13;

    assert!(matches!(
        decoder.initialize(&format),
        Err(PipeError::InitFailed(_))
    ));
}

#[test]
fn test_identity_reuses_buffer_across_frames() {
    let mut decoder = IdentityDecoder::new();
    decoder.initialize(&bgra_format(4, 4)).unwrap();

    decoder.decode(&[0xAAu8; 64], 16).unwrap();
    decoder.decode(&[0x55u8; 64], 16).unwrap();
    assert_eq!(decoder.buffer().unwrap(), &[0x55u8; 64]);
}

// ------------------------------------------------------------------------
// Yuv420Decoder Tests
// ------------------------------------------------------------------------

#[test]
fn test_yuv420_repacks_unpadded_frame() {
    let mut decoder = Yuv420Decoder::new();
    decoder.initialize(&yuv_format(4, 4)).unwrap();

    // 16 luma bytes, then 4 U bytes, then 4 V bytes
    let raw: Vec<u8> = (0u8..24).collect();
    decoder.decode(&raw, 4).unwrap();

    assert_eq!(decoder.output_layout(), OutputLayout::PlanarYuv420);
    assert_eq!(decoder.frame_pitch(), 6);
    assert_eq!(decoder.buffer().unwrap(), raw.as_slice());
}

#[test]
fn test_yuv420_strips_plane_padding() {
    let mut decoder = Yuv420Decoder::new();
    decoder.initialize(&yuv_format(2, 2)).unwrap();

    // luma pitch 4 (2 real + 2 pad), chroma pitch 2 (1 real + 1 pad)
    let raw = [
        1, 2, 0, 0, // Y row 0
        3, 4, 0, 0, // Y row 1
        5, 0, // U
        6, 0, // V
    ];
    decoder.decode(&raw, 4).unwrap();

    assert_eq!(decoder.buffer().unwrap(), &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_yuv420_rejects_odd_dimensions() {
    let mut decoder = Yuv420Decoder::new();
    assert!(matches!(
        decoder.initialize(&yuv_format(3, 4)),
        Err(PipeError::InitFailed(_))
    ));
    assert!(matches!(
        decoder.initialize(&yuv_format(4, 5)),
        Err(PipeError::InitFailed(_))
    ));
}

#[test]
fn test_yuv420_rejects_short_frame() {
    let mut decoder = Yuv420Decoder::new();
    decoder.initialize(&yuv_format(4, 4)).unwrap();

    assert!(matches!(
        decoder.decode(&[0u8; 20], 4),
        Err(PipeError::DecodeFailed(_))
    ));
}

// ------------------------------------------------------------------------
// DecoderRegistry Tests
// ------------------------------------------------------------------------

#[test]
fn test_registry_defaults() {
    let registry = DecoderRegistry::with_defaults();

    let decoder = registry.create(PixelEncoding::Bgra).unwrap();
    assert_eq!(decoder.name(), "identity");

    let decoder = registry.create(PixelEncoding::Yuv420).unwrap();
    assert_eq!(decoder.name(), "yuv420");
}

#[test]
fn test_registry_unknown_tag() {
    let registry = DecoderRegistry::new();
    assert!(matches!(
        registry.create(PixelEncoding::Bgra),
        Err(PipeError::UnsupportedFormat(PixelEncoding::Bgra))
    ));
}

#[test]
fn test_registry_extension() {
    struct NamedDecoder;

    impl Decoder for NamedDecoder {
        fn name(&self) -> &'static str {
            "custom"
        }
        fn initialize(&mut self, _format: &FrameFormat) -> crate::media::error::Result<()> {
            Ok(())
        }
        fn decode(&mut self, _raw: &[u8], _src_pitch: usize) -> crate::media::error::Result<()> {
            Ok(())
        }
        fn output_layout(&self) -> OutputLayout {
            OutputLayout::PackedBgra
        }
        fn frame_pitch(&self) -> usize {
            0
        }
        fn buffer(&self) -> crate::media::error::Result<&[u8]> {
            Err(PipeError::NotReady)
        }
    }

    let mut registry = DecoderRegistry::new();
    registry.register(PixelEncoding::Bgra, || {
        Ok(Box::new(NamedDecoder) as Box<dyn Decoder>)
    });

    let decoder = registry.create(PixelEncoding::Bgra).unwrap();
    assert_eq!(decoder.name(), "custom");
}

#[test]
fn test_registry_creation_failure_propagates() {
    let mut registry = DecoderRegistry::new();
    registry.register(PixelEncoding::Bgra, || Err(PipeError::AllocationFailed));

    assert!(matches!(
        registry.create(PixelEncoding::Bgra),
        Err(PipeError::AllocationFailed)
    ));
}
