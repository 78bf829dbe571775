//! Layer builders.
//!
//! Each function appends the commands of one layer to a [`Scene`]. They are
//! called in paint order by [`ZoneMapper::render`](crate::ZoneMapper::render).

use zonemapper_core::{Axis, Cone};

use crate::cone::{sector_outline, ConeRings};
use crate::drawing::{DrawMode, DrawingState};
use crate::grid::{GridLabel, GridLayout};
use crate::model::{polygon_centroid, ZoneGeometry};
use crate::roster::ZoneRoster;
use crate::scene::{
    axis_color, background_color, target_color, zone_color, Color, DrawCommand, Layer, Scene,
    StrokeStyle, TextAlign, TextBaseline, TextLabel, CONE_FILL, CONE_STROKE, GRID_LINE,
    WHITE, ZONE_FILL_ALPHA,
};
use crate::targets::TargetMarker;
use crate::viewport::Viewport;
use crate::zone_store::ZoneStore;

const AXIS_WIDTH: f32 = 1.5;
const ORIGIN_RADIUS: f64 = 3.0;
const ZONE_STROKE_WIDTH: f32 = 3.0;
const ZONE_LABEL_SIZE: f32 = 24.0;
const ZONE_LABEL_MIN_WIDTH: f64 = 20.0;
const ZONE_LABEL_MIN_HEIGHT: f64 = 14.0;
const VERTEX_RADIUS: f64 = 3.5;
const TARGET_RADIUS: f64 = 10.0;

struct PreviewPalette {
    draw_stroke: Color,
    polygon_stroke: Color,
    rubber_band: Color,
    vertex_fill: Color,
    vertex_stroke: Color,
}

fn preview_palette(dark_mode: bool) -> PreviewPalette {
    if dark_mode {
        PreviewPalette {
            draw_stroke: Color::rgba(255, 255, 255, 0.75),
            polygon_stroke: Color::rgba(255, 255, 255, 0.85),
            rubber_band: Color::rgba(255, 255, 255, 0.75),
            vertex_fill: Color::rgb(255, 255, 255),
            vertex_stroke: Color::rgba(0, 0, 0, 0.6),
        }
    } else {
        PreviewPalette {
            draw_stroke: Color::rgba(100, 100, 100, 0.5),
            polygon_stroke: Color::rgba(33, 33, 33, 0.85),
            rubber_band: Color::rgba(100, 100, 100, 0.75),
            vertex_fill: Color::rgb(0, 0, 0),
            vertex_stroke: Color::rgba(255, 255, 255, 0.6),
        }
    }
}

pub fn background(scene: &mut Scene, dark_mode: bool) {
    scene.push(Layer::Background, DrawCommand::Clear(background_color(dark_mode)));
}

fn segment(a: (f64, f64), b: (f64, f64), stroke: StrokeStyle) -> DrawCommand {
    DrawCommand::Path {
        points: vec![a, b],
        closed: false,
        fill: None,
        stroke: Some(stroke),
    }
}

pub fn grid_lines(scene: &mut Scene, layout: &GridLayout, width: f64, height: f64) {
    let stroke = StrokeStyle::solid(GRID_LINE, 1.0);
    let vertical = layout
        .x_lines
        .iter()
        .map(|l| segment((l.pixel, 0.0), (l.pixel, height), stroke.clone()));
    let horizontal = layout
        .y_lines
        .iter()
        .map(|l| segment((0.0, l.pixel), (width, l.pixel), stroke.clone()));
    scene.extend(Layer::Grid, vertical.chain(horizontal).collect::<Vec<_>>());
}

/// Axes through the world origin and the origin dot.
pub fn axes(scene: &mut Scene, vp: &Viewport, dark_mode: bool) {
    let color = axis_color(dark_mode);
    let stroke = StrokeStyle::solid(color, AXIS_WIDTH);
    let (x0, y0) = vp.origin_pixel();
    scene.push(Layer::Axes, segment((0.0, y0), (vp.width(), y0), stroke.clone()));
    scene.push(Layer::Axes, segment((x0, 0.0), (x0, vp.height()), stroke));
    scene.push(
        Layer::Axes,
        DrawCommand::Circle {
            cx: x0,
            cy: y0,
            radius: ORIGIN_RADIUS,
            fill: Some(color),
            stroke: None,
        },
    );
}

fn grid_text(label: &GridLabel, size: f32, color: Color) -> DrawCommand {
    DrawCommand::Text(TextLabel {
        text: label.text.clone(),
        x: label.x,
        y: label.y,
        size,
        color,
        align: label.align,
        baseline: label.baseline,
    })
}

pub fn grid_labels(scene: &mut Scene, layout: &GridLayout, label_size: u32, dark_mode: bool) {
    let color = axis_color(dark_mode);
    let size = label_size as f32;
    let labels: Vec<DrawCommand> = layout
        .x_labels
        .iter()
        .chain(layout.y_labels.iter())
        .map(|l| grid_text(l, size, color))
        .collect();
    scene.extend(Layer::GridLabels, labels);
}

pub fn cone(scene: &mut Scene, cone: &Cone, vp: &Viewport) {
    scene.push(
        Layer::Cone,
        DrawCommand::Path {
            points: sector_outline(cone, vp),
            closed: true,
            fill: Some(CONE_FILL),
            stroke: Some(StrokeStyle::solid(CONE_STROKE, 1.5)),
        },
    );
}

pub fn cone_rings(scene: &mut Scene, rings: &ConeRings, label_size: u32, dark_mode: bool) {
    let stroke = StrokeStyle::solid(CONE_STROKE, 1.0);
    scene.extend(
        Layer::Rings,
        rings
            .rings
            .iter()
            .map(|points| DrawCommand::Path {
                points: points.clone(),
                closed: false,
                fill: None,
                stroke: Some(stroke.clone()),
            })
            .collect::<Vec<_>>(),
    );
    let color = axis_color(dark_mode);
    scene.extend(
        Layer::RingLabels,
        rings
            .labels
            .iter()
            .map(|l| {
                DrawCommand::Text(TextLabel {
                    text: l.text.clone(),
                    x: l.x,
                    y: l.y,
                    size: label_size as f32,
                    color,
                    align: TextAlign::Center,
                    baseline: TextBaseline::Middle,
                })
            })
            .collect::<Vec<_>>(),
    );
}

/// Pixel bounding box `(x, y, w, h)` and label anchor of a zone.
fn zone_shape(
    geometry: &ZoneGeometry,
    vp: &Viewport,
    fill: Color,
    stroke: StrokeStyle,
) -> Option<(DrawCommand, (f64, f64, f64, f64), (f64, f64))> {
    match geometry {
        ZoneGeometry::Rect(r) => {
            let x1 = vp.value_to_pixel(r.x_min, Axis::X);
            let y1 = vp.value_to_pixel(r.y_min, Axis::Y);
            let x2 = vp.value_to_pixel(r.x_max, Axis::X);
            let y2 = vp.value_to_pixel(r.y_max, Axis::Y);
            let bbox = (x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs());
            let cmd = DrawCommand::Rect {
                x: bbox.0,
                y: bbox.1,
                width: bbox.2,
                height: bbox.3,
                fill: Some(fill),
                stroke: Some(stroke),
            };
            Some((cmd, bbox, (bbox.0 + bbox.2 / 2.0, bbox.1 + bbox.3 / 2.0)))
        }
        ZoneGeometry::Ellipse(e) => {
            let cx = vp.value_to_pixel(e.cx, Axis::X);
            let cy = vp.value_to_pixel(e.cy, Axis::Y);
            let rx = (vp.value_to_pixel(e.cx + e.rx, Axis::X) - cx).abs();
            let ry = (vp.value_to_pixel(e.cy + e.ry, Axis::Y) - cy).abs();
            let cmd = DrawCommand::Ellipse {
                cx,
                cy,
                rx,
                ry,
                fill: Some(fill),
                stroke: Some(stroke),
            };
            Some((cmd, (cx - rx, cy - ry, rx * 2.0, ry * 2.0), (cx, cy)))
        }
        ZoneGeometry::Polygon(p) => {
            if p.points.len() < 3 {
                return None;
            }
            let pts: Vec<(f64, f64)> = p.points.iter().map(|pt| vp.world_to_pixel(*pt)).collect();
            let (mut min_x, mut min_y) = pts[0];
            let (mut max_x, mut max_y) = pts[0];
            for &(x, y) in &pts[1..] {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
            let bbox = (min_x, min_y, max_x - min_x, max_y - min_y);
            let anchor = polygon_centroid(&pts)
                .unwrap_or((bbox.0 + bbox.2 / 2.0, bbox.1 + bbox.3 / 2.0));
            let cmd = DrawCommand::Path {
                points: pts,
                closed: true,
                fill: Some(fill),
                stroke: Some(stroke),
            };
            Some((cmd, bbox, anchor))
        }
    }
}

/// Zones in id order, each with its label when the shape is large enough.
pub fn zones(
    scene: &mut Scene,
    store: &ZoneStore,
    roster: &ZoneRoster,
    vp: &Viewport,
    dark_mode: bool,
) {
    let label_color = axis_color(dark_mode);
    for zone in store.iter() {
        let color = zone_color(zone.id);
        let fill = color.with_alpha(ZONE_FILL_ALPHA);
        let stroke = StrokeStyle::solid(color, ZONE_STROKE_WIDTH);
        let Some((cmd, bbox, anchor)) = zone_shape(&zone.geometry, vp, fill, stroke) else {
            continue;
        };
        scene.push(Layer::Zones, cmd);
        if bbox.2 > ZONE_LABEL_MIN_WIDTH && bbox.3 > ZONE_LABEL_MIN_HEIGHT {
            scene.push(
                Layer::ZoneLabels,
                DrawCommand::Text(TextLabel {
                    text: roster.label(zone.id),
                    x: anchor.0,
                    y: anchor.1,
                    size: ZONE_LABEL_SIZE,
                    color: label_color,
                    align: TextAlign::Center,
                    baseline: TextBaseline::Middle,
                }),
            );
        }
    }
}

fn vertex_dot(at: (f64, f64), palette: &PreviewPalette) -> DrawCommand {
    DrawCommand::Circle {
        cx: at.0,
        cy: at.1,
        radius: VERTEX_RADIUS,
        fill: Some(palette.vertex_fill),
        stroke: Some(StrokeStyle::solid(palette.vertex_stroke, 2.0)),
    }
}

/// In-progress gesture preview.
pub fn preview(scene: &mut Scene, drawing: &DrawingState, vp: &Viewport, dark_mode: bool) {
    if !drawing.is_drawing() {
        return;
    }
    let palette = preview_palette(dark_mode);

    if drawing.mode() == DrawMode::Polygon {
        let pts: Vec<(f64, f64)> = drawing
            .polygon_points()
            .iter()
            .map(|p| vp.world_to_pixel(*p))
            .collect();
        if pts.len() >= 2 {
            scene.push(
                Layer::Preview,
                DrawCommand::Path {
                    points: pts.clone(),
                    closed: false,
                    fill: None,
                    stroke: Some(StrokeStyle::solid(palette.polygon_stroke, 3.0)),
                },
            );
        }
        if let Some(cursor) = drawing.cursor() {
            let band = StrokeStyle::dashed(palette.rubber_band, 2.0, &[6.0, 6.0]);
            if let Some(anchor) = pts.last().copied().or(drawing.start()) {
                scene.push(Layer::Preview, segment(anchor, cursor, band.clone()));
            }
            if let Some(first) = pts.first() {
                scene.push(Layer::Preview, segment(cursor, *first, band));
            }
        }
        for p in &pts {
            scene.push(Layer::Preview, vertex_dot(*p, &palette));
        }
        if pts.is_empty() {
            if let Some(start) = drawing.start() {
                scene.push(Layer::Preview, vertex_dot(start, &palette));
            }
        }
        return;
    }

    let Some(start) = drawing.start() else {
        return;
    };
    if let Some(cursor) = drawing.cursor() {
        let stroke = StrokeStyle::dashed(palette.draw_stroke, 2.0, &[5.0, 5.0]);
        let (w, h) = (cursor.0 - start.0, cursor.1 - start.1);
        let cmd = match drawing.mode() {
            DrawMode::Ellipse => DrawCommand::Ellipse {
                cx: start.0 + w / 2.0,
                cy: start.1 + h / 2.0,
                rx: w.abs() / 2.0,
                ry: h.abs() / 2.0,
                fill: None,
                stroke: Some(stroke),
            },
            _ => DrawCommand::Rect {
                x: start.0.min(cursor.0),
                y: start.1.min(cursor.1),
                width: w.abs(),
                height: h.abs(),
                fill: None,
                stroke: Some(stroke),
            },
        };
        scene.push(Layer::Preview, cmd);
    }
    scene.push(Layer::Preview, vertex_dot(start, &palette));
}

/// Target markers that land inside the canvas.
pub fn targets(scene: &mut Scene, markers: &[TargetMarker], vp: &Viewport) {
    for marker in markers {
        let (x, y) = vp.world_to_pixel(marker.world);
        if !vp.contains_pixel(x, y) {
            continue;
        }
        scene.push(
            Layer::Targets,
            DrawCommand::Circle {
                cx: x,
                cy: y,
                radius: TARGET_RADIUS,
                fill: Some(target_color(marker.pair_index)),
                stroke: Some(StrokeStyle::solid(WHITE, 3.0)),
            },
        );
    }
}
