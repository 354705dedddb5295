//! Renders placeholder logo overlays into assets/ so a fresh checkout can run
//! without the real artwork.

use image::{ImageBuffer, Rgba};
use std::path::Path;

fn main() {
    let assets = Path::new("assets");
    std::fs::create_dir_all(assets).expect("Failed to create assets directory");

    write_logo(&assets.join("forward.png"), [20, 60, 160, 255]);
    write_logo(&assets.join("ford.png"), [180, 140, 20, 255]);
}

/// A rounded solid bar on a transparent canvas, roughly logo-shaped.
fn write_logo(path: &Path, color: [u8; 4]) {
    let (width, height) = (400u32, 120u32);
    let radius = 24i64;

    let img = ImageBuffer::from_fn(width, height, |x, y| {
        let x = x as i64;
        let y = y as i64;
        let (w, h) = (width as i64, height as i64);

        let inside_x = x >= radius && x < w - radius;
        let inside_y = y >= radius && y < h - radius;
        let corner = [
            (radius, radius),
            (w - radius - 1, radius),
            (radius, h - radius - 1),
            (w - radius - 1, h - radius - 1),
        ]
        .iter()
        .any(|&(cx, cy)| {
            let (dx, dy) = (x - cx, y - cy);
            dx * dx + dy * dy <= radius * radius
        });

        if inside_x || inside_y || corner {
            Rgba(color)
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    img.save(path).expect("Failed to save logo asset");
    println!("Created placeholder logo at: {}", path.display());
}
