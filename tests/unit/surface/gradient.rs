use super::*;

fn black_ramp() -> RadialGradient {
    RadialGradient {
        center: (50.0, 50.0),
        inner_radius: 10.0,
        outer_radius: 30.0,
        start: ColorStop::new(0.0, [0, 0, 0, 0]),
        end: ColorStop::new(1.0, [0, 0, 0, 200]),
    }
}

#[test]
fn inside_inner_radius_uses_start_stop() {
    let g = black_ramp();
    assert_eq!(g.sample(50.0, 50.0), [0, 0, 0, 0]);
    assert_eq!(g.sample(55.0, 50.0), [0, 0, 0, 0]);
}

#[test]
fn beyond_outer_radius_uses_end_stop() {
    let g = black_ramp();
    assert_eq!(g.sample(0.0, 0.0), [0, 0, 0, 200]);
    assert_eq!(g.sample(90.0, 50.0), [0, 0, 0, 200]);
}

#[test]
fn midway_interpolates_linearly() {
    let g = black_ramp();
    assert_eq!(g.position_at(70.0, 50.0), 0.5);
    assert_eq!(g.sample(70.0, 50.0), [0, 0, 0, 100]);
}

#[test]
fn degenerate_ring_is_a_hard_edge() {
    let g = RadialGradient {
        inner_radius: 20.0,
        outer_radius: 20.0,
        ..black_ramp()
    };
    assert_eq!(g.position_at(50.0, 50.0), 0.0);
    assert_eq!(g.position_at(50.0, 75.0), 1.0);
}

#[test]
fn rasterize_is_radially_symmetric() {
    let (w, h) = (8u32, 6u32);
    let g = RadialGradient {
        center: (4.0, 3.0),
        inner_radius: 0.5,
        outer_radius: 5.0,
        start: ColorStop::new(0.0, [255, 255, 255, 0]),
        end: ColorStop::new(1.0, [255, 255, 255, 255]),
    };
    let mut buf = vec![0u8; (w * h * 4) as usize];
    g.rasterize_into(&mut buf, w, h);
    let at = |x: u32, y: u32| buf[((y * w + x) * 4 + 3) as usize];
    assert_eq!(at(0, 0), at(w - 1, h - 1));
    assert_eq!(at(0, h - 1), at(w - 1, 0));
    assert!(at(0, 0) > at(3, 2));
}
