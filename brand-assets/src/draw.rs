use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut, Canvas};
use imageproc::point::Point;

/// A straight stroke `width` pixels wide. One pixel strokes are plain
/// segments, wider ones are filled as a quad around the centre line.
pub fn thick_line<C>(canvas: &mut C, from: (f32, f32), to: (f32, f32), width: f32, color: C::Pixel)
where
    C: Canvas,
    C::Pixel: 'static,
{
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if width <= 1.0 || length == 0.0 {
        draw_line_segment_mut(canvas, from, to, color);
        return;
    }

    let (nx, ny) = (-dy / length * width / 2.0, dx / length * width / 2.0);
    let corner = |x: f32, y: f32| Point::new(x.round() as i32, y.round() as i32);
    let quad = [
        corner(from.0 + nx, from.1 + ny),
        corner(to.0 + nx, to.1 + ny),
        corner(to.0 - nx, to.1 - ny),
        corner(from.0 - nx, from.1 - ny),
    ];
    draw_polygon_mut(canvas, &quad, color);
}
