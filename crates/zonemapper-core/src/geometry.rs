//! Geometry value types shared by every layer.
//!
//! World coordinates are canonical millimeters with y increasing downward,
//! matching the screen convention of the canvas rather than a Cartesian plot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in world space (millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Rotates the point about the origin by the inverse of a cone rotation.
    ///
    /// A cone rotated by `angle_deg` (positive = clockwise on screen) shows a
    /// raw sensor reading in the right place once the reading is turned the
    /// other way: `x' = x·cosθ + y·sinθ`, `y' = -x·sinθ + y·cosθ`.
    pub fn rotated_into_cone_frame(&self, angle_deg: f64) -> Point {
        let theta = angle_deg.to_radians();
        let (sin, cos) = theta.sin_cos();
        Point::new(self.x * cos + self.y * sin, -self.x * sin + self.y * cos)
    }
}

/// Canvas axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// World rectangle mapped onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            x_min: -5000.0,
            x_max: 5000.0,
            y_min: 0.0,
            y_max: 10000.0,
        }
    }
}

impl Bounds {
    /// Builds normalized bounds (see [`Bounds::normalized`]).
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
        .normalized()
    }

    /// Swaps inverted min/max pairs and widens zero-width spans by one unit.
    pub fn normalized(self) -> Self {
        let (mut x_min, mut x_max) = (self.x_min, self.x_max);
        let (mut y_min, mut y_max) = (self.y_min, self.y_max);
        if x_min > x_max {
            std::mem::swap(&mut x_min, &mut x_max);
        }
        if y_min > y_max {
            std::mem::swap(&mut y_min, &mut y_max);
        }
        if x_min == x_max {
            x_max = x_min + 1.0;
        }
        if y_min == y_max {
            y_max = y_min + 1.0;
        }
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn min(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x_min,
            Axis::Y => self.y_min,
        }
    }

    pub fn max(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x_max,
            Axis::Y => self.y_max,
        }
    }

    /// Span along an axis, never below one unit.
    pub fn span(&self, axis: Axis) -> f64 {
        (self.max(axis) - self.min(axis)).max(1.0)
    }

    /// Clamps a value into the axis range. Non-finite values snap to the minimum.
    pub fn clamp(&self, value: f64, axis: Axis) -> f64 {
        let (min, max) = (self.min(axis), self.max(axis));
        if !value.is_finite() {
            return min;
        }
        if min > max {
            return value;
        }
        value.clamp(min, max)
    }

    /// Clamps then rounds to a whole canonical unit.
    pub fn clamp_round(&self, value: f64, axis: Axis) -> f64 {
        self.clamp(value, axis).round()
    }

    /// Clamps and rounds both coordinates of a point.
    pub fn clamp_round_point(&self, point: Point) -> Point {
        Point::new(
            self.clamp_round(point.x, Axis::X),
            self.clamp_round(point.y, Axis::Y),
        )
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x_min
            && point.x <= self.x_max
            && point.y >= self.y_min
            && point.y <= self.y_max
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X: {:.1}..{:.1} | Y: {:.1}..{:.1}",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}

/// Sensor field-of-view cone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    /// Radius of the sector in millimeters.
    pub range_mm: f64,
    /// Total opening angle, 1..=360 degrees.
    pub fov_deg: f64,
    /// Rotation, -180..=180 degrees, positive turns to the device's right.
    pub angle_deg: f64,
}

impl Default for Cone {
    fn default() -> Self {
        Self {
            range_mm: 6000.0,
            fov_deg: 120.0,
            angle_deg: 0.0,
        }
    }
}

impl Cone {
    pub fn clamp_fov(fov_deg: f64) -> f64 {
        fov_deg.clamp(1.0, 360.0)
    }

    /// Clamps a rotation angle. NaN resets to zero.
    pub fn clamp_angle(angle_deg: f64) -> f64 {
        if angle_deg.is_nan() {
            return 0.0;
        }
        angle_deg.clamp(-180.0, 180.0)
    }

    /// Angular bounds of the rotated sector in radians, ordered start < end.
    pub fn angular_bounds(&self) -> (f64, f64) {
        let half_fov = (self.fov_deg / 2.0).to_radians();
        let rotation = self.angle_deg.to_radians();
        let mut start = -half_fov + rotation;
        let mut end = half_fov + rotation;
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        (start, end)
    }

    pub fn radius(&self) -> f64 {
        self.range_mm.max(0.0)
    }
}

/// World point at `angle` radians on a circle of `radius` around the origin.
///
/// Angles are measured from the +y axis toward +x, so zero points straight
/// down the canvas (away from a ceiling- or wall-mounted sensor).
pub fn point_on_arc(radius: f64, angle: f64) -> Point {
    Point::new(radius * angle.sin(), radius * angle.cos())
}
