use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

use crate::draw::thick_line;

const BRAND_BLUE: Rgba<u8> = Rgba([0, 102, 204, 255]);
const ACCENT_GREEN: Rgba<u8> = Rgba([0, 204, 136, 255]);
const LINK_GREEN: Rgba<u8> = Rgba([0, 204, 136, 153]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// The icon is laid out on a 64 unit grid and scaled to `size`.
const GRID: f64 = 64.0;

pub const DEFAULT_SIZES: [u32; 2] = [32, 180];

pub fn file_name(size: u32) -> String {
    match size {
        180 => "apple-touch-icon.png".to_string(),
        n => format!("favicon-{}x{}.png", n, n),
    }
}

/// Blue disc, white cross, four accent dots wired to the cross.
pub fn render(size: u32) -> RgbaImage {
    let scale = f64::from(size) / GRID;
    let unit = |v: f64| (v * scale) as i32;
    let side = size as i32;

    let mut icon = RgbaImage::from_pixel(size, size, CLEAR);

    let center = side / 2;
    let radius = (f64::from(size) / 2.0 - scale) as i32;
    draw_filled_circle_mut(&mut icon, (center, center), radius, BRAND_BLUE);

    // bars span both corners, hence the extra pixel
    let bar = unit(8.0);
    let length = unit(28.0);
    let across = (bar + 1) as u32;
    let along = (length + 1) as u32;
    let vertical = Rect::at((side - bar) / 2, unit(18.0)).of_size(across, along);
    draw_filled_rect_mut(&mut icon, vertical, WHITE);
    let horizontal = Rect::at(unit(18.0), (side - bar) / 2).of_size(along, across);
    draw_filled_rect_mut(&mut icon, horizontal, WHITE);

    let dot = unit(2.0);
    let near = unit(20.0);
    let far = unit(44.0);
    let dots = [(near, near), (far, near), (near, far), (far, far)];
    for center in dots {
        draw_filled_circle_mut(&mut icon, center, dot, ACCENT_GREEN);
    }

    // links go on their own layer so their alpha blends over the base
    let mut links = RgbaImage::from_pixel(size, size, CLEAR);
    let width = unit(1.0).max(1) as f32;
    let inner = unit(26.0);
    let outer = unit(38.0);
    let ends = [(inner, inner), (outer, inner), (inner, outer), (outer, outer)];
    for ((x1, y1), (x2, y2)) in dots.into_iter().zip(ends) {
        thick_line(&mut links, (x1 as f32, y1 as f32), (x2 as f32, y2 as f32), width, LINK_GREEN);
    }
    imageops::overlay(&mut icon, &links, 0, 0);

    icon
}
