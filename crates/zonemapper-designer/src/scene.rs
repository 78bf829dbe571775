//! Scene display list.
//!
//! Rendering is split in two: layer builders turn editor state into a flat
//! list of [`DrawCommand`]s in pixel space, and a backend (the tiny-skia
//! rasterizer in [`renderer`](crate::renderer), or any host canvas) replays
//! them in order. Every command is tagged with the [`Layer`] it belongs to so
//! hosts and tests can pick out a single layer.

use serde::Serialize;

/// RGBA color with straight (non-premultiplied) alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS-style representation, e.g. `rgba(33,150,243,0.3)`.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

pub const WHITE: Color = Color::rgb(255, 255, 255);
pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const LIGHT_BACKGROUND: Color = WHITE;
pub const DARK_BACKGROUND: Color = Color::rgb(0x12, 0x13, 0x16);
pub const GRID_LINE: Color = Color::rgb(0xe0, 0xe0, 0xe0);
pub const CONE_FILL: Color = Color::rgba(128, 233, 31, 0.06);
pub const CONE_STROKE: Color = Color::rgba(117, 243, 33, 0.6);

/// Zone palette, indexed by `(id - 1) mod 5`.
pub const ZONE_PALETTE: [Color; 5] = [
    Color::rgb(244, 67, 54),
    Color::rgb(33, 150, 243),
    Color::rgb(76, 175, 80),
    Color::rgb(255, 193, 7),
    Color::rgb(156, 39, 176),
];

/// Fill alpha for zone interiors; outlines use the opaque palette color.
pub const ZONE_FILL_ALPHA: f32 = 0.30;

/// Target marker palette, indexed by pair position.
pub const TARGET_PALETTE: [Color; 5] = [
    Color::rgb(0xf4, 0x43, 0x36),
    Color::rgb(0x21, 0x96, 0xf3),
    Color::rgb(0x4c, 0xaf, 0x50),
    Color::rgb(0xff, 0xc1, 0x07),
    Color::rgb(0x9c, 0x27, 0xb0),
];

/// Palette color for a zone id. Ids below one wrap like the rest.
pub fn zone_color(id: i64) -> Color {
    ZONE_PALETTE[(id - 1).rem_euclid(ZONE_PALETTE.len() as i64) as usize]
}

pub fn target_color(index: usize) -> Color {
    TARGET_PALETTE[index % TARGET_PALETTE.len()]
}

/// Axis, label and origin color for the current theme.
pub fn axis_color(dark_mode: bool) -> Color {
    if dark_mode {
        WHITE
    } else {
        BLACK
    }
}

pub fn background_color(dark_mode: bool) -> Color {
    if dark_mode {
        DARK_BACKGROUND
    } else {
        LIGHT_BACKGROUND
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
    /// Dash pattern in pixels; empty for a solid line.
    pub dash: Vec<f32>,
}

impl StrokeStyle {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: Vec::new(),
        }
    }

    pub fn dashed(color: Color, width: f32, dash: &[f32]) -> Self {
        Self {
            color,
            width,
            dash: dash.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextBaseline {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

/// Layers in paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Layer {
    Background,
    Grid,
    Axes,
    GridLabels,
    Cone,
    Rings,
    RingLabels,
    Zones,
    ZoneLabels,
    Preview,
    Targets,
}

/// A single drawing primitive in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    /// Fills the whole canvas.
    Clear(Color),
    /// Open or closed polyline, optionally filled.
    Path {
        points: Vec<(f64, f64)>,
        closed: bool,
        fill: Option<Color>,
        stroke: Option<StrokeStyle>,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<StrokeStyle>,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        fill: Option<Color>,
        stroke: Option<StrokeStyle>,
    },
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
        fill: Option<Color>,
        stroke: Option<StrokeStyle>,
    },
    Text(TextLabel),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneItem {
    pub layer: Layer,
    pub command: DrawCommand,
}

/// An ordered display list for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub items: Vec<SceneItem>,
}

impl Scene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, layer: Layer, command: DrawCommand) {
        self.items.push(SceneItem { layer, command });
    }

    pub fn extend(&mut self, layer: Layer, commands: impl IntoIterator<Item = DrawCommand>) {
        self.items
            .extend(commands.into_iter().map(|command| SceneItem { layer, command }));
    }

    /// Commands of a single layer, in paint order.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &DrawCommand> {
        self.items
            .iter()
            .filter(move |item| item.layer == layer)
            .map(|item| &item.command)
    }

    pub fn count(&self, layer: Layer) -> usize {
        self.layer(layer).count()
    }

    /// All text labels on a layer.
    pub fn texts(&self, layer: Layer) -> Vec<&TextLabel> {
        self.layer(layer)
            .filter_map(|cmd| match cmd {
                DrawCommand::Text(label) => Some(label),
                _ => None,
            })
            .collect()
    }
}
