//! Raster backend for scenes
//! Replays a [`Scene`] into an image buffer using tiny-skia.
//!
//! Text commands are skipped; hosts that need labels draw them from
//! [`Scene::texts`] with their own font stack.

use image::{Rgb, RgbImage};
use tiny_skia::{
    Color as SkColor, FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, StrokeDash,
    Transform,
};

use crate::scene::{Color, DrawCommand, Scene, StrokeStyle};

fn sk_color(color: Color) -> SkColor {
    let alpha = (color.a.clamp(0.0, 1.0) * 255.0).round() as u8;
    SkColor::from_rgba8(color.r, color.g, color.b, alpha)
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(sk_color(color));
    paint.anti_alias = true;
    paint
}

fn sk_stroke(style: &StrokeStyle) -> Stroke {
    let dash = if style.dash.is_empty() {
        None
    } else {
        StrokeDash::new(style.dash.clone(), 0.0)
    };
    Stroke {
        width: style.width,
        dash,
        ..Default::default()
    }
}

fn polyline(points: &[(f64, f64)], closed: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.0 as f32, first.1 as f32);
    for (x, y) in rest {
        pb.line_to(*x as f32, *y as f32);
    }
    if closed {
        pb.close();
    }
    pb.finish()
}

fn oval(cx: f64, cy: f64, rx: f64, ry: f64) -> Option<Path> {
    let rect = Rect::from_xywh(
        (cx - rx) as f32,
        (cy - ry) as f32,
        (rx * 2.0) as f32,
        (ry * 2.0) as f32,
    )?;
    PathBuilder::from_oval(rect)
}

fn paint_path(
    pixmap: &mut Pixmap,
    path: Option<Path>,
    fill: Option<Color>,
    stroke: Option<&StrokeStyle>,
) {
    let Some(path) = path else {
        return;
    };
    if let Some(color) = fill {
        pixmap.fill_path(
            &path,
            &paint_for(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
    if let Some(style) = stroke {
        pixmap.stroke_path(
            &path,
            &paint_for(style.color),
            &sk_stroke(style),
            Transform::identity(),
            None,
        );
    }
}

/// Rasterize `scene` at its own size.
pub fn render_scene(scene: &Scene) -> RgbImage {
    let (width, height) = (scene.width, scene.height);
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return RgbImage::new(width, height);
    };

    for item in &scene.items {
        match &item.command {
            DrawCommand::Clear(color) => pixmap.fill(sk_color(*color)),
            DrawCommand::Path {
                points,
                closed,
                fill,
                stroke,
            } => paint_path(
                &mut pixmap,
                polyline(points, *closed),
                *fill,
                stroke.as_ref(),
            ),
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                let path = Rect::from_xywh(*x as f32, *y as f32, *width as f32, *height as f32)
                    .map(PathBuilder::from_rect);
                paint_path(&mut pixmap, path, *fill, stroke.as_ref());
            }
            DrawCommand::Ellipse {
                cx,
                cy,
                rx,
                ry,
                fill,
                stroke,
            } => paint_path(&mut pixmap, oval(*cx, *cy, *rx, *ry), *fill, stroke.as_ref()),
            DrawCommand::Circle {
                cx,
                cy,
                radius,
                fill,
                stroke,
            } => {
                let path = PathBuilder::from_circle(*cx as f32, *cy as f32, *radius as f32);
                paint_path(&mut pixmap, path, *fill, stroke.as_ref());
            }
            DrawCommand::Text(_) => {}
        }
    }

    // Convert Pixmap to RgbImage
    let data = pixmap.data();
    RgbImage::from_fn(width, height, |x, y| {
        let idx = ((y * width + x) * 4) as usize;
        Rgb([data[idx], data[idx + 1], data[idx + 2]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Layer, BLACK, DARK_BACKGROUND};

    #[test]
    fn test_clear_and_fill() {
        let mut scene = Scene::new(20, 10);
        scene.push(Layer::Background, DrawCommand::Clear(DARK_BACKGROUND));
        scene.push(
            Layer::Zones,
            DrawCommand::Rect {
                x: 10.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
                fill: Some(Color::rgb(244, 67, 54)),
                stroke: None,
            },
        );
        let img = render_scene(&scene);
        assert_eq!(img.dimensions(), (20, 10));
        assert_eq!(img.get_pixel(2, 5), &Rgb([0x12, 0x13, 0x16]));
        assert_eq!(img.get_pixel(15, 5), &Rgb([244, 67, 54]));
    }

    #[test]
    fn test_degenerate_commands_are_skipped() {
        let mut scene = Scene::new(4, 4);
        scene.push(Layer::Background, DrawCommand::Clear(Color::rgb(255, 255, 255)));
        scene.push(
            Layer::Preview,
            DrawCommand::Path {
                points: vec![],
                closed: false,
                fill: None,
                stroke: Some(StrokeStyle::solid(BLACK, 1.0)),
            },
        );
        scene.push(
            Layer::Zones,
            DrawCommand::Ellipse {
                cx: 1.0,
                cy: 1.0,
                rx: 0.0,
                ry: 0.0,
                fill: Some(BLACK),
                stroke: None,
            },
        );
        let img = render_scene(&scene);
        assert_eq!(img.get_pixel(3, 3), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_zero_sized_scene() {
        let img = render_scene(&Scene::new(0, 0));
        assert_eq!(img.dimensions(), (0, 0));
    }
}
