use super::*;

#[test]
fn radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = blur_bgra8_premul(&src, 1, 2, 4, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn constant_image_is_identity() {
    let (w, h) = (4u32, 3u32);
    let px = [10u8, 20u8, 30u8, 40u8];
    let src = px.repeat((w * h) as usize);
    let out = blur_bgra8_premul(&src, w, h, w as usize * 4, 3, 2.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn spreads_energy_from_single_pixel() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_bgra8_premul(&src, w, h, w as usize * 4, 1, 1.0).unwrap();
    assert!(out[center] < 255);
    assert!(out[center - 4] > 0);
    assert!(out[center + (w as usize) * 4] > 0);
}

#[test]
fn padding_is_ignored_and_zeroed() {
    let (w, h, stride) = (2u32, 2u32, 16usize);
    let mut src = vec![0xaau8; stride * h as usize];
    for y in 0..h as usize {
        src[y * stride..y * stride + 8].copy_from_slice(&[9, 9, 9, 9, 9, 9, 9, 9]);
    }
    let out = blur_bgra8_premul(&src, w, h, stride, 2, 1.5).unwrap();
    for y in 0..h as usize {
        assert!(out[y * stride..y * stride + 8].iter().all(|&b| b == 9));
        assert!(out[y * stride + 8..(y + 1) * stride].iter().all(|&b| b == 0));
    }
}

#[test]
fn rejects_mismatched_buffers_and_bad_sigma() {
    assert!(blur_bgra8_premul(&[0u8; 15], 2, 2, 8, 1, 1.0).is_err());
    assert!(blur_bgra8_premul(&[0u8; 8], 2, 2, 4, 1, 1.0).is_err());
    assert!(matches!(
        blur_bgra8_premul(&[0u8; 16], 2, 2, 8, 1, 0.0),
        Err(PixsurfError::Validation(_))
    ));
}

#[test]
fn oversized_radius_fails_before_allocating() {
    let src = [0u8; 4];
    assert!(matches!(
        blur_bgra8_premul(&src, 1, 1, 4, u32::MAX, 1.0),
        Err(PixsurfError::Validation(_))
    ));
    assert!(blur_bgra8_premul(&src, 1, 1, 4, MAX_BLUR_RADIUS, 1.0).is_ok());
}

#[test]
fn kernel_sums_to_one() {
    for radius in [1, 3, 17] {
        let taps = kernel_taps(radius, 2.5).unwrap();
        assert_eq!(taps.len(), 2 * radius as usize + 1);
        assert_eq!(taps.iter().sum::<u32>(), ONE_Q16);
    }
}
