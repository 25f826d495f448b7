use std::io::Cursor;
use std::path::PathBuf;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_keeps_straight_alpha() {
    let bytes = png_bytes(1, 1, vec![100, 50, 200, 128]);
    let buf = decode_image(&bytes).unwrap();
    assert_eq!((buf.width(), buf.height()), (1, 1));
    assert_eq!(buf.data(), &[100, 50, 200, 128]);
}

#[test]
fn decode_image_rejects_garbage() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(err.to_string().contains("decode image"));
}

#[test]
fn save_then_load_png() {
    let dir = PathBuf::from("target").join("unit_assets_decode");
    let path = dir.join("nested").join("out.png");
    let _ = std::fs::remove_file(&path);

    let src = RasterBuffer::from_fn(3, 2, |x, y| [x as u8 * 40, y as u8 * 90, 7, 255 - x as u8]);
    save_png(&path, &src).unwrap();
    let back = load_image(&path).unwrap();
    assert_eq!(back, src);
}

#[test]
fn load_image_reports_path() {
    let err = load_image("target/unit_assets_decode/missing.png").unwrap_err();
    assert!(err.to_string().contains("missing.png"));
}
