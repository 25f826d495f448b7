use super::*;

fn gradient_image(w: u32, h: u32) -> RasterBuffer {
    RasterBuffer::from_fn(w, h, |x, y| {
        [
            (x * 255 / w.max(1)) as u8,
            (y * 255 / h.max(1)) as u8,
            ((x + y) * 7 % 256) as u8,
            255,
        ]
    })
}

#[test]
fn neutral_settings_are_identity() {
    let img = gradient_image(13, 9);
    let out = render(&img, &Settings::default()).unwrap();
    assert_eq!(out, img);
}

#[test]
fn empty_source_is_invalid_input() {
    let img = RasterBuffer::filled(0, 4, [0, 0, 0, 255]);
    assert!(matches!(
        render(&img, &Settings::default()),
        Err(GradeError::InvalidInput(_))
    ));
}

#[test]
fn non_finite_setting_is_invalid_input() {
    let img = gradient_image(2, 2);
    let s = Settings {
        clarity: f32::INFINITY,
        ..Settings::default()
    };
    assert!(matches!(render(&img, &s), Err(GradeError::InvalidInput(_))));
}

#[test]
fn out_of_range_settings_are_clamped_and_reported() {
    let img = gradient_image(4, 4);
    let wild = Settings {
        exposure: 400.0,
        sharpness: -20.0,
        ..Settings::default()
    };
    let tame = Settings {
        exposure: 100.0,
        ..Settings::default()
    };
    let mut r = Renderer::new(RenderOpts::default()).unwrap();
    let (out, stats) = r.render_with_stats(&img, &wild, None).unwrap();
    assert_eq!(out, render(&img, &tame).unwrap());
    assert_eq!(stats.clamped.len(), 2);
    assert!(stats.stages_skipped.contains(&Stage::Sharpness));
}

#[test]
fn contrast_on_mid_gray_is_noop() {
    let img = RasterBuffer::filled(2, 2, [128, 128, 128, 255]);
    let s = Settings {
        contrast: 50.0,
        ..Settings::default()
    };
    assert_eq!(render(&img, &s).unwrap(), img);
}

#[test]
fn exposure_doubles_and_later_stages_stay_quiet() {
    let img = RasterBuffer::filled(3, 2, [100, 100, 100, 255]);
    let s = Settings {
        exposure: 100.0,
        ..Settings::default()
    };
    let mut r = Renderer::new(RenderOpts::default()).unwrap();
    let (out, stats) = r.render_with_stats(&img, &s, None).unwrap();
    assert_eq!(out, RasterBuffer::filled(3, 2, [200, 200, 200, 255]));
    assert_eq!(stats.stages_run, vec![Stage::Tone]);
    assert_eq!(stats.stages_skipped, Stage::POST_ORDER.to_vec());
}

#[test]
fn cancelled_render_returns_no_image() {
    let img = gradient_image(8, 8);
    let cancel = CancelFlag::new();
    cancel.cancel();
    let mut r = Renderer::new(RenderOpts::default()).unwrap();
    let res = r.render_with_cancel(&img, &Settings::default(), &cancel);
    assert!(matches!(res, Err(GradeError::Cancelled)));

    let fresh = CancelFlag::new();
    assert!(r.render_with_cancel(&img, &Settings::default(), &fresh).is_ok());
}

#[test]
fn cancel_flag_is_shared_between_clones() {
    let a = CancelFlag::new();
    let b = a.clone();
    assert!(!b.is_cancelled());
    a.cancel();
    assert!(b.is_cancelled());
}

#[test]
fn renderer_reuses_scratch_surfaces() {
    let img = gradient_image(16, 16);
    let s = Settings {
        sharpness: 40.0,
        vignette: 30.0,
        ..Settings::default()
    };
    let mut r = Renderer::new(RenderOpts::default()).unwrap();
    let first = r.render(&img, &s).unwrap();
    let (second, stats) = r.render_with_stats(&img, &s, None).unwrap();
    assert_eq!(first, second);
    // The second call picks the retained scratch up as its working surface.
    assert_eq!(stats.pool.alloc_surfaces, 3);
}

#[test]
fn parallel_tone_matches_serial() {
    let img = gradient_image(31, 17);
    let s = Settings {
        exposure: 30.0,
        temp: 20.0,
        shadows: 15.0,
        saturation: 25.0,
        vignette: 20.0,
        ..Settings::default()
    };
    let serial = render(&img, &s).unwrap();
    let mut r = Renderer::new(RenderOpts {
        parallel: true,
        threads: Some(3),
        ..RenderOpts::default()
    })
    .unwrap();
    assert_eq!(r.render(&img, &s).unwrap(), serial);
}

#[test]
fn zero_threads_is_rejected() {
    let res = Renderer::new(RenderOpts {
        parallel: true,
        threads: Some(0),
        ..RenderOpts::default()
    });
    assert!(res.is_err());
}

#[test]
fn max_dimension_downscales_preserving_aspect() {
    assert_eq!(fit_within(400, 200, Some(100)), (100, 50));
    assert_eq!(fit_within(200, 400, Some(100)), (50, 100));
    assert_eq!(fit_within(80, 60, Some(100)), (80, 60));
    assert_eq!(fit_within(80, 60, None), (80, 60));
    assert_eq!(fit_within(1000, 1, Some(10)), (10, 1));

    let img = gradient_image(40, 20);
    let mut r = Renderer::new(RenderOpts {
        max_dimension: Some(10),
        ..RenderOpts::default()
    })
    .unwrap();
    let s = Settings {
        clarity: -40.0,
        ..Settings::default()
    };
    let out = r.render(&img, &s).unwrap();
    assert_eq!((out.width(), out.height()), (10, 5));
}

#[test]
fn post_effect_order_matters() {
    let img = RasterBuffer::from_fn(24, 24, |x, y| {
        if (x / 3 + y / 3) % 2 == 0 {
            [220, 190, 60, 255]
        } else {
            [30, 60, 140, 255]
        }
    });
    let s = Settings {
        clarity: -50.0,
        sharpness: 50.0,
        vignette: 40.0,
        ..Settings::default()
    };
    let run = |order: &[Stage]| {
        let mut surface = Surface::new(24, 24).unwrap();
        surface.draw_scaled(&img, 24, 24).unwrap();
        apply_stages_in(&mut surface, &img, &s, order).unwrap();
        surface.into_buffer()
    };

    let forward = run(&Stage::POST_ORDER);
    let mut reversed = Stage::POST_ORDER;
    reversed.reverse();
    let backward = run(&reversed);
    assert_ne!(forward, backward);

    let full = render(&img, &s).unwrap();
    assert_eq!(full, forward);
}

#[test]
fn stage_names_are_stable() {
    let names: Vec<_> = Stage::ORDER.iter().map(|s| s.to_string()).collect();
    assert_eq!(names, ["tone", "clarity", "sharpness", "vignette"]);
}
