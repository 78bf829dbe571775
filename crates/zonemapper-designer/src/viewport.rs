//! Viewport - world/pixel coordinate mapping.
//!
//! Maps canonical millimeter coordinates inside [`Bounds`] onto a canvas with
//! the origin in the top-left corner. Both axes grow in the same direction in
//! world and pixel space, so there is no flip.

use zonemapper_core::{Axis, Bounds, Point};

/// Edge length of the square editor canvas in pixels.
pub const CANVAS_SIZE: f64 = 800.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: Bounds,
    width: f64,
    height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Bounds::default(), CANVAS_SIZE, CANVAS_SIZE)
    }
}

impl Viewport {
    /// Creates a viewport. Bounds are normalized on the way in.
    pub fn new(bounds: Bounds, width: f64, height: f64) -> Self {
        Self {
            bounds: bounds.normalized(),
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    /// Pixels per canonical unit along an axis.
    pub fn px_per(&self, axis: Axis) -> f64 {
        self.extent(axis) / self.bounds.span(axis)
    }

    pub fn px_per_x(&self) -> f64 {
        self.px_per(Axis::X)
    }

    pub fn px_per_y(&self) -> f64 {
        self.px_per(Axis::Y)
    }

    pub fn value_to_pixel(&self, value: f64, axis: Axis) -> f64 {
        (value - self.bounds.min(axis)) * self.px_per(axis)
    }

    /// Inverse of [`value_to_pixel`](Self::value_to_pixel). A zero-sized
    /// canvas maps everything to the axis minimum.
    pub fn pixel_to_value(&self, pixel: f64, axis: Axis) -> f64 {
        let px_per = self.px_per(axis);
        if px_per == 0.0 {
            return self.bounds.min(axis);
        }
        pixel / px_per + self.bounds.min(axis)
    }

    pub fn world_to_pixel(&self, point: Point) -> (f64, f64) {
        (
            self.value_to_pixel(point.x, Axis::X),
            self.value_to_pixel(point.y, Axis::Y),
        )
    }

    pub fn pixel_to_world(&self, x: f64, y: f64) -> Point {
        Point::new(self.pixel_to_value(x, Axis::X), self.pixel_to_value(y, Axis::Y))
    }

    /// Pixel position of the world origin.
    pub fn origin_pixel(&self) -> (f64, f64) {
        self.world_to_pixel(Point::default())
    }

    pub fn contains_pixel(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}
