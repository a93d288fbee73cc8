use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};

use crate::draw::thick_line;

/// Open Graph / Twitter card size.
pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 630;

pub const DEFAULT_FILE: &str = "social-preview.png";

const GRADIENT_TOP: Rgb<u8> = Rgb([0, 102, 204]);
const GRADIENT_BOTTOM: Rgb<u8> = Rgb([0, 76, 153]);
const ACCENT_GREEN: Rgb<u8> = Rgb([0, 204, 136]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const SHADOW: Rgb<u8> = Rgb([0, 0, 0]);

const SYSTEM_BODY_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";
const SYSTEM_TITLE_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

const STATS: [(&str, &str); 3] = [
    ("5,500+", "Annual RSI Cases"),
    ("$200K", "Avg Cost/Incident"),
    ("99.9%", "Accuracy Rate"),
];

pub struct Fonts {
    title: Font<'static>,
    body: Font<'static>,
}

impl Fonts {
    /// `title` falls back to `body` when not given.
    pub fn from_files(body: &Path, title: Option<&Path>) -> Result<Self> {
        let body_font = load_font(body)?;
        let title_font = match title {
            Some(path) => load_font(path)?,
            None => body_font.clone(),
        };
        Ok(Self { title: title_font, body: body_font })
    }

    /// DejaVu from the usual Linux location, if installed.
    pub fn system() -> Option<Self> {
        Self::from_files(Path::new(SYSTEM_BODY_FONT), Some(Path::new(SYSTEM_TITLE_FONT))).ok()
    }
}

fn load_font(path: &Path) -> Result<Font<'static>> {
    let bytes = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    Font::try_from_vec(bytes).with_context(|| format!("{} is not a TrueType font", path.display()))
}

/// Vertical blend from the brand blue to its darker shade.
pub fn gradient(y: u32) -> Rgb<u8> {
    let ratio = f64::from(y) / f64::from(HEIGHT);
    let mix = |top: u8, bottom: u8| (f64::from(top) - (f64::from(top) - f64::from(bottom)) * ratio) as u8;
    Rgb([
        mix(GRADIENT_TOP[0], GRADIENT_BOTTOM[0]),
        mix(GRADIENT_TOP[1], GRADIENT_BOTTOM[1]),
        mix(GRADIENT_TOP[2], GRADIENT_BOTTOM[2]),
    ])
}

/// The preview card. Without fonts only the artwork is drawn.
pub fn render(fonts: Option<&Fonts>) -> RgbImage {
    let mut card: RgbImage = ImageBuffer::from_fn(WIDTH, HEIGHT, |_, y| gradient(y));
    let middle = WIDTH as i32 / 2;

    if let Some(fonts) = fonts {
        let brand = "SurgiGuard AI";
        draw_centered(&mut card, &fonts.title, 80.0, brand, middle + 3, 123, SHADOW);
        draw_centered(&mut card, &fonts.title, 80.0, brand, middle, 120, WHITE);

        draw_centered(&mut card, &fonts.body, 36.0, "Surgical Instrument Tracking", middle, 240, ACCENT_GREEN);
        draw_centered(&mut card, &fonts.body, 36.0, "& Count Verification", middle, 290, ACCENT_GREEN);

        draw_centered(&mut card, &fonts.body, 32.0, "AI-Powered Computer Vision to Prevent", middle, 380, WHITE);
        draw_centered(&mut card, &fonts.body, 32.0, "Retained Surgical Items", middle, 425, WHITE);
    }

    // medical cross, top left
    let (cross_x, cross_y, reach, half_bar) = (60, 60, 20, 6);
    let long = (2 * reach + 1) as u32;
    let short = (2 * half_bar + 1) as u32;
    draw_filled_rect_mut(&mut card, Rect::at(cross_x - half_bar, cross_y - reach).of_size(short, long), WHITE);
    draw_filled_rect_mut(&mut card, Rect::at(cross_x - reach, cross_y - half_bar).of_size(long, short), WHITE);

    // tech accent, top right
    let (right, left) = (WIDTH as i32 - 80, WIDTH as i32 - 140);
    for center in [(right, 60), (left, 60), (right, 120), (left, 120)] {
        draw_filled_circle_mut(&mut card, center, 8, ACCENT_GREEN);
    }
    thick_line(&mut card, (right as f32, 60.0), (left as f32, 120.0), 2.0, ACCENT_GREEN);
    thick_line(&mut card, (left as f32, 60.0), (right as f32, 120.0), 2.0, ACCENT_GREEN);

    if let Some(fonts) = fonts {
        let column = WIDTH as i32 / STATS.len() as i32;
        for (i, (number, label)) in STATS.iter().enumerate() {
            let center = column * i as i32 + column / 2;
            draw_centered(&mut card, &fonts.body, 36.0, number, center, 510, ACCENT_GREEN);
            draw_centered(&mut card, &fonts.body, 32.0, label, center, 555, WHITE);
        }
    }

    card
}

fn draw_centered(card: &mut RgbImage, font: &Font<'static>, size: f32, text: &str, center_x: i32, y: i32, color: Rgb<u8>) {
    let scale = Scale::uniform(size);
    let (width, _) = text_size(scale, font, text);
    draw_text_mut(card, color, center_x - width / 2, y, scale, font, text);
}
