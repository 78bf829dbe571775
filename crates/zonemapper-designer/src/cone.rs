//! Cone renderer
//!
//! The sensor sits at the world origin. Its field of view is a circular
//! sector of radius `range`, opening `fov` and rotation `angle`; range rings
//! are drawn every metre (or every four feet on imperial grids) when unit
//! labels are enabled.

use std::sync::Arc;
use zonemapper_core::units::format_tick_label;
use zonemapper_core::{point_on_arc, Axis, Cone, LengthUnit};

use crate::cache::{round_key, LayerCache};
use crate::viewport::Viewport;

/// Arc subdivisions for the sector outline and each ring.
pub const CONE_SEGMENTS: usize = 48;
const MIN_ANGLE_SPAN: f64 = 1e-6;

/// Sector outline in pixels: apex, arc start, 48 arc steps, back to apex.
pub fn sector_outline(cone: &Cone, vp: &Viewport) -> Vec<(f64, f64)> {
    let (start, end) = cone.angular_bounds();
    let radius = cone.radius();
    let step = (end - start) / CONE_SEGMENTS as f64;
    let apex = vp.origin_pixel();

    let mut points = Vec::with_capacity(CONE_SEGMENTS + 3);
    points.push(apex);
    points.extend((0..=CONE_SEGMENTS).map(|i| {
        let angle = start + step * i as f64;
        vp.world_to_pixel(point_on_arc(radius, angle))
    }));
    points.push(apex);
    points
}

/// Label unit and ring spacing (mm) for a grid unit.
pub fn ring_step(grid_unit: LengthUnit) -> (LengthUnit, f64) {
    if grid_unit.is_imperial() {
        (LengthUnit::Foot, 4.0 * LengthUnit::Foot.mm_per_unit())
    } else {
        (LengthUnit::Meter, LengthUnit::Meter.mm_per_unit())
    }
}

/// Inputs of the range-ring layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeParams {
    pub cone: Cone,
    pub grid_unit: LengthUnit,
    pub viewport: Viewport,
    pub unit_display: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConeKey {
    theta: [f64; 2],
    radius: f64,
    px_per: [f64; 2],
    origin: [f64; 2],
    label_unit: LengthUnit,
    step_mm: f64,
    canvas: [u32; 2],
    unit_display: bool,
}

impl ConeParams {
    pub fn key(&self) -> ConeKey {
        let (start, end) = self.cone.angular_bounds();
        let (label_unit, step_mm) = ring_step(self.grid_unit);
        let bounds = self.viewport.bounds();
        ConeKey {
            theta: [round_key(start), round_key(end)],
            radius: round_key(self.cone.radius()),
            px_per: [
                round_key(self.viewport.px_per_x()),
                round_key(self.viewport.px_per_y()),
            ],
            origin: [round_key(bounds.x_min), round_key(bounds.y_min)],
            label_unit,
            step_mm,
            canvas: [
                self.viewport.width().round() as u32,
                self.viewport.height().round() as u32,
            ],
            unit_display: self.unit_display,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConeRings {
    /// One polyline of `CONE_SEGMENTS + 1` pixel points per ring.
    pub rings: Vec<Vec<(f64, f64)>>,
    pub labels: Vec<RingLabel>,
}

impl ConeRings {
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

/// Range rings clipped to the sector, or `None` when there is nothing to draw.
pub fn compute_rings(params: &ConeParams) -> Option<ConeRings> {
    if !params.unit_display {
        return None;
    }
    let radius = params.cone.radius();
    if !radius.is_finite() || radius <= 0.0 {
        return None;
    }
    let (start, end) = params.cone.angular_bounds();
    let span = end - start;
    if !span.is_finite() || span.abs() < MIN_ANGLE_SPAN {
        return None;
    }
    let (label_unit, step_mm) = ring_step(params.grid_unit);
    let vp = &params.viewport;
    let (px_x, px_y) = (vp.px_per_x(), vp.px_per_y());
    if px_x == 0.0 || px_y == 0.0 {
        return None;
    }
    let offset_x = -vp.bounds().min(Axis::X) * px_x;
    let offset_y = -vp.bounds().min(Axis::Y) * px_y;

    // unit vector advanced by incremental rotation
    let (sin_step, cos_step) = (span / CONE_SEGMENTS as f64).sin_cos();
    let (sin_start, cos_start) = start.sin_cos();
    let mid = (start + end) / 2.0;

    let mut out = ConeRings::default();
    let mut index = 1;
    loop {
        let r = step_mm * index as f64;
        if r > radius + 1e-6 {
            break;
        }
        let (mut sin_a, mut cos_a) = (sin_start, cos_start);
        let mut points = Vec::with_capacity(CONE_SEGMENTS + 1);
        for i in 0..=CONE_SEGMENTS {
            points.push((r * sin_a * px_x + offset_x, r * cos_a * px_y + offset_y));
            if i < CONE_SEGMENTS {
                let next_sin = sin_a * cos_step + cos_a * sin_step;
                let next_cos = cos_a * cos_step - sin_a * sin_step;
                sin_a = next_sin;
                cos_a = next_cos;
            }
        }
        out.rings.push(points);
        out.labels.push(RingLabel {
            text: format_tick_label(r, step_mm, label_unit),
            x: r * mid.sin() * px_x + offset_x,
            y: r * mid.cos() * px_y + offset_y,
        });
        index += 1;
    }
    Some(out)
}

/// Memoizing front for [`compute_rings`].
#[derive(Debug)]
pub struct ConeRenderer {
    cache: LayerCache<ConeKey, ConeRings>,
}

impl Default for ConeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConeRenderer {
    pub fn new() -> Self {
        Self {
            cache: LayerCache::new("cone rings"),
        }
    }

    /// Ring layout for `params`; empty when no rings should be drawn.
    pub fn rings(&mut self, params: &ConeParams) -> Arc<ConeRings> {
        self.cache
            .get_or_build(&params.key(), || compute_rings(params).unwrap_or_default())
    }

    pub fn cache(&self) -> &LayerCache<ConeKey, ConeRings> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonemapper_core::Bounds;

    fn params(range_mm: f64, unit: LengthUnit) -> ConeParams {
        ConeParams {
            cone: Cone {
                range_mm,
                fov_deg: 120.0,
                angle_deg: 0.0,
            },
            grid_unit: unit,
            viewport: Viewport::new(Bounds::new(-6000.0, 6000.0, 0.0, 12000.0), 800.0, 800.0),
            unit_display: true,
        }
    }

    #[test]
    fn test_sector_outline_shape() {
        let p = params(6000.0, LengthUnit::Millimeter);
        let outline = sector_outline(&p.cone, &p.viewport);
        assert_eq!(outline.len(), CONE_SEGMENTS + 3);
        assert_eq!(outline[0], (400.0, 0.0));
        assert_eq!(outline[outline.len() - 1], (400.0, 0.0));
        // the middle of the arc points straight down the canvas
        let mid = outline[1 + CONE_SEGMENTS / 2];
        assert!((mid.0 - 400.0).abs() < 1e-6);
        assert!((mid.1 - 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_metric_rings() {
        let rings = compute_rings(&params(6000.0, LengthUnit::Millimeter)).unwrap();
        assert_eq!(rings.rings.len(), 6);
        assert!(rings.rings.iter().all(|r| r.len() == CONE_SEGMENTS + 1));
        let texts: Vec<&str> = rings.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["1m", "2m", "3m", "4m", "5m", "6m"]);
        let last = rings.rings[5][CONE_SEGMENTS];
        let expected = (
            6000.0 * 60f64.to_radians().sin() * 800.0 / 12000.0 + 400.0,
            6000.0 * 60f64.to_radians().cos() * 800.0 / 12000.0,
        );
        assert!((last.0 - expected.0).abs() < 1e-6);
        assert!((last.1 - expected.1).abs() < 1e-6);
    }

    #[test]
    fn test_imperial_rings() {
        let rings = compute_rings(&params(6000.0, LengthUnit::Inch)).unwrap();
        // 4ft = 1219.2mm, so 4 rings fit in 6m
        assert_eq!(rings.labels.len(), 4);
        assert_eq!(rings.labels[0].text, "4ft");
        assert_eq!(rings.labels[3].text, "16ft");
    }

    #[test]
    fn test_no_rings() {
        assert!(compute_rings(&params(0.0, LengthUnit::Millimeter)).is_none());
        let mut hidden = params(6000.0, LengthUnit::Millimeter);
        hidden.unit_display = false;
        assert!(compute_rings(&hidden).is_none());
        let short = compute_rings(&params(500.0, LengthUnit::Millimeter)).unwrap();
        assert!(short.is_empty());
    }

    #[test]
    fn test_renderer_memoizes() {
        let mut renderer = ConeRenderer::new();
        let p = params(6000.0, LengthUnit::Millimeter);
        let a = renderer.rings(&p);
        let b = renderer.rings(&p);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.rings.len(), 6);
        let mut rotated = p;
        rotated.cone.angle_deg = 45.0;
        renderer.rings(&rotated);
        assert_eq!(renderer.cache().hits(), 1);
        assert_eq!(renderer.cache().misses(), 2);
    }
}
