//! Drawing state machine
//!
//! Turns pointer and key input into zone geometry. Rectangles and ellipses
//! are a press-drag-release gesture; polygons add one vertex per release and
//! finish on a double tap, on the 32nd vertex, or on an explicit finish.
//!
//! Pointer positions are canvas pixels. Committed geometry is canonical
//! millimeters, rounded to whole units and clamped to the viewport.
//!
//! The machine never talks to the backend or the zone store; it reports a
//! [`DrawOutcome`] and the caller decides what to do with it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use zonemapper_core::{Axis, Point};

use crate::model::{EllipseData, PolygonData, RectData, ZoneGeometry, POLYGON_MAX_POINTS};
use crate::viewport::Viewport;

/// Minimum time between two "unlock first" notices.
pub const LOCK_NOTICE_INTERVAL_MS: u64 = 1500;
/// Two polygon taps closer than this finish the polygon.
pub const DOUBLE_TAP_MS: u64 = 350;

pub const LOCKED_DRAW_NOTICE: &str = "Unlock the grid before drawing.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    #[default]
    Rect,
    Ellipse,
    Polygon,
}

impl DrawMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Ellipse => "ellipse",
            Self::Polygon => "polygon",
        }
    }
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrawMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rect" | "rectangle" => Ok(Self::Rect),
            "ellipse" => Ok(Self::Ellipse),
            "polygon" => Ok(Self::Polygon),
            other => Err(format!("Unknown draw mode: {}", other)),
        }
    }
}

/// Pointer device of a gesture. One gesture never mixes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputChannel {
    Mouse,
    Touch,
}

/// A pointer sample in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub channel: InputChannel,
    /// Monotonic milliseconds, used for double-tap and notice throttling.
    pub timestamp_ms: u64,
}

impl PointerEvent {
    pub fn mouse(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            channel: InputChannel::Mouse,
            timestamp_ms,
        }
    }

    pub fn touch(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            channel: InputChannel::Touch,
            timestamp_ms,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKey {
    Escape,
    Backspace,
}

/// What an input did.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// Nothing changed.
    Ignored,
    /// Preview state changed.
    Redraw,
    /// A notice for the user; no state change.
    Notice(String),
    /// A gesture ended with geometry for the selected zone.
    Commit(ZoneGeometry),
    /// An active gesture was abandoned.
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct DrawingState {
    mode: DrawMode,
    locked: bool,
    is_drawing: bool,
    active_input: Option<InputChannel>,
    start: Option<(f64, f64)>,
    cursor: Option<(f64, f64)>,
    polygon: Vec<Point>,
    last_tap_ms: Option<u64>,
    last_lock_notice_ms: Option<u64>,
}

impl DrawingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_drawing(&self) -> bool {
        self.is_drawing
    }

    pub fn active_input(&self) -> Option<InputChannel> {
        self.active_input
    }

    /// Press position of the current gesture, in pixels.
    pub fn start(&self) -> Option<(f64, f64)> {
        self.start
    }

    /// Latest pointer position of the current gesture, in pixels.
    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    /// Polygon vertices placed so far, in world units.
    pub fn polygon_points(&self) -> &[Point] {
        &self.polygon
    }

    /// Whether any gesture state would be lost by a cancel.
    pub fn is_active(&self) -> bool {
        self.is_drawing || self.start.is_some() || !self.polygon.is_empty()
    }

    fn channel_mismatch(&self, channel: InputChannel) -> bool {
        self.active_input.is_some_and(|active| active != channel)
    }

    /// Pointer press. `has_selection` tells whether a zone is selected.
    pub fn start_drawing(&mut self, event: PointerEvent, has_selection: bool) -> DrawOutcome {
        if self.locked {
            let now = event.timestamp_ms;
            let due = self
                .last_lock_notice_ms
                .is_none_or(|last| now.saturating_sub(last) > LOCK_NOTICE_INTERVAL_MS);
            if due {
                self.last_lock_notice_ms = Some(now);
                return DrawOutcome::Notice(LOCKED_DRAW_NOTICE.to_string());
            }
            return DrawOutcome::Ignored;
        }
        if !has_selection {
            return DrawOutcome::Ignored;
        }
        self.is_drawing = true;
        self.active_input = Some(event.channel);
        self.start = Some(event.position());
        self.cursor = Some(event.position());
        DrawOutcome::Redraw
    }

    /// Pointer motion during a gesture.
    pub fn draw(&mut self, event: PointerEvent) -> DrawOutcome {
        if self.locked || !self.is_drawing || self.channel_mismatch(event.channel) {
            return DrawOutcome::Ignored;
        }
        self.cursor = Some(event.position());
        DrawOutcome::Redraw
    }

    /// Pointer release.
    pub fn end_drawing(&mut self, event: PointerEvent, viewport: &Viewport) -> DrawOutcome {
        if !self.is_drawing || self.channel_mismatch(event.channel) {
            return DrawOutcome::Ignored;
        }
        if self.mode == DrawMode::Polygon {
            return self.add_polygon_vertex(event, viewport);
        }

        self.is_drawing = false;
        let Some((sx, sy)) = self.start else {
            self.active_input = None;
            return DrawOutcome::Ignored;
        };
        let bounds = viewport.bounds();
        let start = viewport.pixel_to_world(sx, sy);
        let end = viewport.pixel_to_world(event.x, event.y);
        let geometry = match self.mode {
            DrawMode::Ellipse => ZoneGeometry::Ellipse(EllipseData {
                cx: bounds.clamp_round((start.x + end.x) / 2.0, Axis::X),
                cy: bounds.clamp_round((start.y + end.y) / 2.0, Axis::Y),
                rx: ((end.x - start.x).abs() / 2.0).round().max(1.0),
                ry: ((end.y - start.y).abs() / 2.0).round().max(1.0),
            }),
            _ => ZoneGeometry::Rect(RectData {
                x_min: bounds.clamp_round(start.x.min(end.x), Axis::X),
                x_max: bounds.clamp_round(start.x.max(end.x), Axis::X),
                y_min: bounds.clamp_round(start.y.min(end.y), Axis::Y),
                y_max: bounds.clamp_round(start.y.max(end.y), Axis::Y),
            }),
        };
        self.active_input = None;
        self.start = None;
        self.cursor = None;
        debug!("Finished {} gesture", self.mode);
        DrawOutcome::Commit(geometry)
    }

    fn add_polygon_vertex(&mut self, event: PointerEvent, viewport: &Viewport) -> DrawOutcome {
        if self.polygon.len() >= POLYGON_MAX_POINTS {
            return self.finish_polygon(viewport);
        }
        let world = viewport.pixel_to_world(event.x, event.y);
        self.polygon.push(viewport.bounds().clamp_round_point(world));
        if self.polygon.len() == POLYGON_MAX_POINTS {
            return self.finish_polygon(viewport);
        }

        let now = event.timestamp_ms;
        let double_tap = self
            .last_tap_ms
            .is_some_and(|last| now.saturating_sub(last) < DOUBLE_TAP_MS);
        if double_tap && self.polygon.len() >= 3 {
            return self.finish_polygon(viewport);
        }
        self.last_tap_ms = Some(now);
        DrawOutcome::Redraw
    }

    /// Closes the polygon in progress.
    ///
    /// Commits the first 32 vertices when at least three exist; fewer are
    /// discarded. The gesture is reset either way.
    pub fn finish_polygon(&mut self, viewport: &Viewport) -> DrawOutcome {
        let outcome = if self.polygon.len() >= 3 {
            let bounds = viewport.bounds();
            let points = self
                .polygon
                .iter()
                .take(POLYGON_MAX_POINTS)
                .map(|p| bounds.clamp_round_point(*p))
                .collect();
            debug!("Finished polygon with {} points", self.polygon.len());
            DrawOutcome::Commit(ZoneGeometry::Polygon(PolygonData { points }))
        } else {
            DrawOutcome::Redraw
        };
        self.reset();
        outcome
    }

    /// Drops the gesture without committing. Idempotent.
    pub fn cancel(&mut self) -> DrawOutcome {
        if !self.is_active() {
            self.reset();
            return DrawOutcome::Ignored;
        }
        self.reset();
        debug!("Drawing cancelled");
        DrawOutcome::Cancelled
    }

    /// Removes the last polygon vertex.
    pub fn undo_vertex(&mut self) -> DrawOutcome {
        if self.mode != DrawMode::Polygon || self.polygon.pop().is_none() {
            return DrawOutcome::Ignored;
        }
        DrawOutcome::Redraw
    }

    pub fn key_down(&mut self, key: DrawKey) -> DrawOutcome {
        match key {
            DrawKey::Escape => self.cancel(),
            DrawKey::Backspace => self.undo_vertex(),
        }
    }

    /// Switches the draw mode. Returns `false` when nothing changed.
    pub fn set_mode(&mut self, mode: DrawMode) -> bool {
        if self.mode == mode && !self.is_drawing {
            return false;
        }
        self.mode = mode;
        if mode != DrawMode::Polygon {
            self.polygon.clear();
        }
        self.cursor = None;
        self.start = None;
        self.is_drawing = false;
        true
    }

    /// Flips the lock and returns the new state. Locking cancels any gesture.
    pub fn toggle_lock(&mut self) -> bool {
        self.locked = !self.locked;
        self.last_lock_notice_ms = None;
        if self.locked {
            self.reset();
        }
        self.locked
    }

    pub fn reset(&mut self) {
        self.is_drawing = false;
        self.polygon.clear();
        self.cursor = None;
        self.start = None;
        self.last_tap_ms = None;
        self.active_input = None;
    }
}
