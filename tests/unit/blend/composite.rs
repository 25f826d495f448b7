use super::*;

#[test]
fn multiply_screen_overlay_match_formulas() {
    assert_eq!(multiply(255.0, 77.0), 77.0);
    assert_eq!(multiply(0.0, 200.0), 0.0);
    assert_eq!(screen(0.0, 77.0), 77.0);
    assert_eq!(screen(255.0, 10.0), 255.0);
    assert!((overlay(100.0, 200.0) - 2.0 * 100.0 * 200.0 / 255.0).abs() < 1e-4);
    assert!((overlay(200.0, 100.0) - (255.0 - 2.0 * 55.0 * 155.0 / 255.0)).abs() < 1e-4);
}

#[test]
fn overlay_switches_on_destination_at_128() {
    let below = overlay(127.0, 128.0);
    let above = overlay(128.0, 128.0);
    assert!((below - 2.0 * 127.0 * 128.0 / 255.0).abs() < 1e-4);
    assert!((above - (255.0 - 2.0 * 127.0 * 127.0 / 255.0)).abs() < 1e-4);
}

#[test]
fn blend_outputs_stay_in_range() {
    for d in [0.0f32, 1.0, 64.0, 127.0, 128.0, 200.0, 255.0] {
        for s in [0.0f32, 1.0, 64.0, 127.0, 128.0, 200.0, 255.0] {
            for mode in [
                BlendMode::Normal,
                BlendMode::Multiply,
                BlendMode::Screen,
                BlendMode::Overlay,
            ] {
                let v = mode.blend_channel(d, s);
                assert!((0.0..=255.0).contains(&v), "{mode:?}({d},{s}) = {v}");
            }
        }
    }
}

#[test]
fn composite_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(composite_px(dst, src, BlendMode::Normal, 0.0), dst);
}

#[test]
fn composite_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(composite_px(dst, src, BlendMode::Screen, 1.0), dst);
}

#[test]
fn composite_normal_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(composite_px(dst, src, BlendMode::Normal, 1.0), src);
}

#[test]
fn composite_half_opacity_mixes_halfway() {
    let dst = [0, 100, 200, 255];
    let src = [200, 100, 0, 255];
    assert_eq!(
        composite_px(dst, src, BlendMode::Normal, 0.5),
        [100, 100, 100, 255]
    );
}

#[test]
fn composite_multiply_black_at_alpha_darkens_proportionally() {
    let dst = [200, 100, 50, 255];
    let src = [0, 0, 0, 255];
    assert_eq!(
        composite_px(dst, src, BlendMode::Multiply, 0.25),
        [150, 75, 38, 255]
    );
}

#[test]
fn composite_non_finite_opacity_is_noop() {
    let dst = [9, 9, 9, 255];
    let src = [255, 255, 255, 255];
    assert_eq!(composite_px(dst, src, BlendMode::Normal, f32::NAN), dst);
}

#[test]
fn composite_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    let src = vec![0u8; 4];
    assert!(composite_in_place(&mut dst, &src, BlendMode::Normal, 1.0).is_err());
}

#[test]
fn composite_uniform_matches_per_pixel_kernel_for_every_mode() {
    let base = vec![10u8, 60, 130, 255, 240, 128, 0, 255, 90, 200, 45, 120];
    let color = [128, 200, 30, 200];
    for mode in [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
    ] {
        let expected: Vec<u8> = base
            .chunks_exact(4)
            .flat_map(|d| composite_px([d[0], d[1], d[2], d[3]], color, mode, 0.4))
            .collect();
        let mut dst = base.clone();
        composite_uniform_in_place(&mut dst, color, mode, 0.4).unwrap();
        assert_eq!(dst, expected, "{mode:?}");

        let layer: Vec<u8> = color.repeat(3);
        let mut from_slice = base.clone();
        composite_in_place(&mut from_slice, &layer, mode, 0.4).unwrap();
        assert_eq!(from_slice, expected, "{mode:?}");
    }
}
