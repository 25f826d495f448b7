use super::*;

#[test]
fn blur_sigma_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = blur_rgba8_premul(&src, 1, 2, 0.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_constant_image_is_identity() {
    let (w, h) = (4u32, 3u32);
    let px = [10u8, 20u8, 30u8, 40u8];
    let src = px.repeat((w * h) as usize);
    let out = blur_rgba8_premul(&src, w, h, 1.5).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (7u32, 7u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((3 * w + 3) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8_premul(&src, w, h, 1.0).unwrap();

    let nonzero = out.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);

    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 8);
}

#[test]
fn wider_sigma_softens_more() {
    let (w, h) = (21u32, 1u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = (10 * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let narrow = blur_rgba8_premul(&src, w, h, 0.5).unwrap();
    let wide = blur_rgba8_premul(&src, w, h, 2.0).unwrap();
    assert!(wide[center] < narrow[center]);
}

#[test]
fn kernel_radius_tracks_sigma() {
    assert_eq!(kernel_radius(0.0), 0);
    assert_eq!(kernel_radius(f32::NAN), 0);
    assert_eq!(kernel_radius(0.4), 2);
    assert_eq!(kernel_radius(2.0), 6);
}

#[test]
fn blur_rejects_mismatched_length() {
    assert!(blur_rgba8_premul(&[0u8; 12], 2, 2, 1.0).is_err());
}

#[test]
fn gaussian_kernel_is_symmetric_and_normalized() {
    assert!(Kernel::gaussian(0.0).is_none());
    for sigma in [0.4f32, 1.0, 2.5, 120.0] {
        let k = Kernel::gaussian(sigma).unwrap();
        assert_eq!(k.radius(), i64::from(kernel_radius(sigma)));
        assert_eq!(k.taps.iter().sum::<u32>(), Q16_ONE);
        let mirrored: Vec<u32> = k.taps.iter().rev().copied().collect();
        assert_eq!(k.taps, mirrored);
    }
}

#[test]
fn vertical_pass_only_mixes_within_columns() {
    let (w, h) = (2u32, 5u32);
    let src: Vec<u8> = (0..h)
        .flat_map(|_| [200u8, 0, 0, 255, 0, 0, 200, 255])
        .collect();
    let out = blur_rgba8_premul(&src, w, h, 1.0).unwrap();
    // Columns are constant top to bottom, so only the horizontal pass can change them.
    for row in out.chunks_exact(8) {
        assert_eq!(row[3], 255);
        assert_eq!(row[7], 255);
        assert!(row[0] < 200 && row[0] > 0);
        assert_eq!(row[0], row[6]);
        assert_eq!(row[2], row[4]);
    }
}
