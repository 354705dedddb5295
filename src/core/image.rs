use crate::domain::model::Opacity;
use crate::utils::error::Result;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Logo width relative to the base media width.
const LOGO_WIDTH_RATIO: f32 = 0.20;
/// Gap between the logo and the bottom edge, in pixels.
const BOTTOM_MARGIN: u32 = 20;
const JPEG_QUALITY: u8 = 90;

/// Composite `logo` onto `src` at bottom-center and write a JPEG to `dst`.
/// The source arrives with an opaque temp extension, so its format is sniffed
/// from content.
pub fn composite_image(src: &Path, dst: &Path, logo: &Path, opacity: Opacity) -> Result<()> {
    let base = image::ImageReader::open(src)?
        .with_guessed_format()?
        .decode()?
        .to_rgba8();
    let logo = image::open(logo)?.to_rgba8();

    let scaled = scale_logo(&logo, base.width());
    let stamped = apply_opacity(scaled, opacity);
    let (x, y) = placement(base.dimensions(), stamped.dimensions());

    let mut canvas = base;
    image::imageops::overlay(&mut canvas, &stamped, x, y);

    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let file = File::create(dst)?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;
    Ok(())
}

fn scale_logo(logo: &RgbaImage, base_width: u32) -> RgbaImage {
    let target_w = ((base_width as f32 * LOGO_WIDTH_RATIO) as u32).max(1);
    let ratio = target_w as f32 / logo.width() as f32;
    let target_h = ((logo.height() as f32 * ratio) as u32).max(1);
    image::imageops::resize(logo, target_w, target_h, FilterType::Lanczos3)
}

/// Every visible logo pixel gets the chosen alpha; fully transparent pixels
/// stay transparent.
fn apply_opacity(mut logo: RgbaImage, opacity: Opacity) -> RgbaImage {
    let alpha = opacity.alpha255();
    for pixel in logo.pixels_mut() {
        if pixel[3] > 0 {
            pixel[3] = alpha;
        }
    }
    logo
}

/// Bottom-center, 20px above the bottom edge. Clamped so a logo taller than
/// the base still lands inside the frame.
fn placement((base_w, base_h): (u32, u32), (logo_w, logo_h): (u32, u32)) -> (i64, i64) {
    let x = (i64::from(base_w) - i64::from(logo_w)) / 2;
    let y = i64::from(base_h) - i64::from(logo_h) - i64::from(BOTTOM_MARGIN);
    (x.max(0), y.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn test_placement_centers_above_bottom_margin() {
        assert_eq!(placement((100, 80), (20, 10)), (40, 50));
        assert_eq!(placement((100, 80), (100, 10)), (0, 50));
    }

    #[test]
    fn test_placement_clamps_for_tiny_base() {
        // logo taller than base minus margin
        assert_eq!(placement((10, 10), (20, 30)), (0, 0));
    }

    #[test]
    fn test_scale_logo_targets_fifth_of_base_width() {
        let logo = solid(50, 25, [255, 255, 255, 255]);
        let scaled = scale_logo(&logo, 200);
        assert_eq!(scaled.width(), 40);
        assert_eq!(scaled.height(), 20);
    }

    #[test]
    fn test_apply_opacity_skips_transparent_pixels() {
        let mut logo = solid(2, 1, [255, 0, 0, 255]);
        logo.put_pixel(1, 0, Rgba([255, 0, 0, 0]));
        let stamped = apply_opacity(logo, Opacity::from_percent(40.0));
        assert_eq!(stamped.get_pixel(0, 0)[3], 102);
        assert_eq!(stamped.get_pixel(1, 0)[3], 0);
    }

    #[test]
    fn test_composite_image_stamps_bottom_center() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.png");
        let logo = dir.path().join("logo.png");
        let dst = dir.path().join("out.jpg");

        solid(200, 100, [0, 0, 255, 255]).save(&src).unwrap();
        solid(50, 20, [255, 255, 255, 255]).save(&logo).unwrap();

        composite_image(&src, &dst, &logo, Opacity::from_percent(100.0)).unwrap();

        let out = image::open(&dst).unwrap().to_rgb8();
        assert_eq!(out.dimensions(), (200, 100));

        // logo is 40x16 after scaling, placed at (80, 64)
        let stamped = out.get_pixel(100, 70);
        assert!(stamped[0] > 200 && stamped[1] > 200 && stamped[2] > 200);

        // corners stay untouched
        let corner = out.get_pixel(2, 2);
        assert!(corner[2] > 200 && corner[0] < 60);
    }

    #[test]
    fn test_composite_image_partial_opacity_blends() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.png");
        let logo = dir.path().join("logo.png");
        let dst = dir.path().join("out.jpg");

        solid(200, 100, [0, 0, 0, 255]).save(&src).unwrap();
        solid(50, 20, [255, 255, 255, 255]).save(&logo).unwrap();

        composite_image(&src, &dst, &logo, Opacity::from_percent(40.0)).unwrap();

        let out = image::open(&dst).unwrap().to_rgb8();
        let stamped = out.get_pixel(100, 70);
        // 40% white over black lands mid-gray, nowhere near either extreme
        assert!(stamped[0] > 60 && stamped[0] < 160);
    }

    #[test]
    fn test_composite_image_rejects_garbage_input() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.img");
        let logo = dir.path().join("logo.png");
        std::fs::write(&src, b"not an image").unwrap();
        solid(10, 10, [255, 255, 255, 255]).save(&logo).unwrap();

        let result = composite_image(
            &src,
            &dir.path().join("out.jpg"),
            &logo,
            Opacity::from_percent(50.0),
        );
        assert!(result.is_err());
    }
}
