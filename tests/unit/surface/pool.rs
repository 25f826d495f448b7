use super::*;

#[test]
fn pool_honors_bucket_cap() {
    let mut p = SurfacePool::new(SurfacePoolOpts {
        max_pool_bytes: 1 << 30,
        max_surfaces_per_bucket: 1,
    });

    let a = p.borrow(8, 8).unwrap();
    let b = p.borrow(8, 8).unwrap();
    p.release(a);
    p.release(b);

    let st = p.stats();
    assert_eq!(st.retained_surfaces, 1);
    assert_eq!(st.alloc_surfaces, 2);
}

#[test]
fn pool_honors_global_byte_cap() {
    let bytes_8x8 = SurfaceKey { w: 8, h: 8 }.byte_len();
    let mut p = SurfacePool::new(SurfacePoolOpts {
        max_pool_bytes: bytes_8x8,
        max_surfaces_per_bucket: 8,
    });

    let a = p.borrow(8, 8).unwrap();
    let b = p.borrow(8, 8).unwrap();
    p.release(a);
    p.release(b);

    let st = p.stats();
    assert_eq!(st.retained_bytes, bytes_8x8);
    assert_eq!(st.retained_surfaces, 1);
    assert!(st.dropped_on_release >= 1);
}

#[test]
fn released_surfaces_are_reused_by_size() {
    let mut p = SurfacePool::new(SurfacePoolOpts::default());
    let a = p.borrow(4, 2).unwrap();
    p.release(a);

    let again = p.borrow(4, 2).unwrap();
    assert_eq!((again.width(), again.height()), (4, 2));
    assert_eq!(p.stats().alloc_surfaces, 1);

    let other = p.borrow(2, 4).unwrap();
    assert_eq!((other.width(), other.height()), (2, 4));
    assert_eq!(p.stats().alloc_surfaces, 2);
}

#[test]
fn zero_area_borrow_fails() {
    let mut p = SurfacePool::new(SurfacePoolOpts::default());
    assert!(p.borrow(0, 3).is_err());
}
