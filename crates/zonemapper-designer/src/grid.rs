//! Grid renderer
//!
//! Picks a human-friendly tick step for the current grid unit so that grid
//! lines sit at least [`GRID_MIN_SPACING_PX`] apart, lays out the lines
//! covering the viewport, and places tick labels along the axes.
//!
//! Layouts are memoized in a [`GridRenderer`] keyed by everything they depend
//! on, so redraws triggered by pointer motion reuse the previous layout.

use std::sync::Arc;
use zonemapper_core::units::format_tick_label;
use zonemapper_core::{Axis, Bounds, LengthUnit};

use crate::cache::{round_key, LayerCache};
use crate::scene::{TextAlign, TextBaseline};
use crate::viewport::Viewport;

/// Minimum pixel distance between neighbouring grid lines.
pub const GRID_MIN_SPACING_PX: f64 = 40.0;
/// Lines this far outside the canvas still get a label.
const LABEL_OVERSCAN_PX: f64 = 40.0;
const X_LABEL_MARGIN: f64 = 2.0;
const Y_LABEL_MARGIN: f64 = 4.0;

/// Inputs of a grid layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    pub unit: LengthUnit,
    pub bounds: Bounds,
    pub width: f64,
    pub height: f64,
    pub unit_display: bool,
    pub label_size: u32,
}

impl GridParams {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.bounds, self.width, self.height)
    }

    /// Fingerprint of the params with floats rounded to 1e-6.
    pub fn key(&self) -> GridKey {
        let vp = self.viewport();
        GridKey {
            unit: self.unit,
            bounds: [
                round_key(self.bounds.x_min),
                round_key(self.bounds.x_max),
                round_key(self.bounds.y_min),
                round_key(self.bounds.y_max),
            ],
            px_per: [round_key(vp.px_per_x()), round_key(vp.px_per_y())],
            canvas: [self.width.round() as u32, self.height.round() as u32],
            unit_display: self.unit_display,
            label_size: self.label_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridKey {
    unit: LengthUnit,
    bounds: [f64; 4],
    px_per: [f64; 2],
    canvas: [u32; 2],
    unit_display: bool,
    label_size: u32,
}

/// Step and extent of the grid along one axis, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMetrics {
    pub step: f64,
    pub start: f64,
    pub end: f64,
    pub count: usize,
    pub pixel_start: f64,
    pub pixel_step: f64,
    /// Values closer to zero than this are treated as the axis itself.
    pub skip_tol: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub unit: LengthUnit,
    pub label_unit: LengthUnit,
    pub x: AxisMetrics,
    pub y: AxisMetrics,
}

/// A grid line at `pixel` for world `value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub pixel: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub metrics: GridMetrics,
    pub x_lines: Vec<GridLine>,
    pub y_lines: Vec<GridLine>,
    pub x_labels: Vec<GridLabel>,
    pub y_labels: Vec<GridLabel>,
}

/// Smallest candidate step (scaled by powers of ten) that spaces lines at
/// least [`GRID_MIN_SPACING_PX`] apart.
pub fn choose_step(unit: LengthUnit, px_per_mm: f64, span_mm: f64) -> f64 {
    let unit_mm = unit.mm_per_unit();
    for scale in 0..4 {
        let factor = 10f64.powi(scale);
        for &step_units in unit.grid_step_candidates() {
            if step_units <= 0.0 {
                continue;
            }
            let step_mm = step_units * unit_mm * factor;
            if step_mm * px_per_mm >= GRID_MIN_SPACING_PX {
                return step_mm;
            }
        }
    }
    unit_mm.max(span_mm / 10.0)
}

/// Number of lines from `start` through `end` inclusive.
pub fn count_steps(end: f64, start: f64, step: f64) -> usize {
    if !(step > 0.0) || !step.is_finite() {
        return 0;
    }
    let steps = ((end - start) / step + 1e-6).floor();
    if steps < 0.0 {
        0
    } else {
        steps as usize + 1
    }
}

fn axis_metrics(unit: LengthUnit, vp: &Viewport, axis: Axis) -> AxisMetrics {
    let bounds = vp.bounds();
    let px_per = vp.px_per(axis);
    let step = choose_step(unit, px_per, bounds.span(axis));
    let start = (bounds.min(axis) / step).floor() * step;
    let end = (bounds.max(axis) / step).ceil() * step;
    AxisMetrics {
        step,
        start,
        end,
        count: count_steps(end, start, step),
        pixel_start: vp.value_to_pixel(start, axis),
        pixel_step: step * px_per,
        skip_tol: step * 0.001,
    }
}

pub fn compute_grid_metrics(params: &GridParams) -> GridMetrics {
    let vp = params.viewport();
    GridMetrics {
        unit: params.unit,
        label_unit: params.unit.grid_display_unit(),
        x: axis_metrics(params.unit, &vp, Axis::X),
        y: axis_metrics(params.unit, &vp, Axis::Y),
    }
}

fn axis_lines(m: &AxisMetrics) -> Vec<GridLine> {
    (0..m.count)
        .map(|i| GridLine {
            pixel: m.pixel_start + i as f64 * m.pixel_step,
            value: m.start + i as f64 * m.step,
        })
        .filter(|line| line.pixel.is_finite())
        .collect()
}

fn build_labels(
    params: &GridParams,
    metrics: &GridMetrics,
    x_lines: &[GridLine],
    y_lines: &[GridLine],
) -> (Vec<GridLabel>, Vec<GridLabel>) {
    if !params.unit_display {
        return (Vec::new(), Vec::new());
    }
    let vp = params.viewport();
    let (width, height) = (params.width, params.height);
    let label_size = params.label_size as f64;

    let y0 = vp.value_to_pixel(0.0, Axis::Y);
    let (x_label_y, x_baseline) = if y0.is_finite() && (0.0..=height).contains(&y0) {
        if y0 > label_size + X_LABEL_MARGIN {
            (y0 - X_LABEL_MARGIN, TextBaseline::Bottom)
        } else {
            (y0 + X_LABEL_MARGIN, TextBaseline::Top)
        }
    } else {
        (height - X_LABEL_MARGIN, TextBaseline::Bottom)
    };

    let x_labels = x_lines
        .iter()
        .filter(|l| l.pixel >= -LABEL_OVERSCAN_PX && l.pixel <= width + LABEL_OVERSCAN_PX)
        .filter(|l| l.value.abs() >= metrics.x.skip_tol)
        .map(|l| GridLabel {
            text: format_tick_label(l.value, metrics.x.step, metrics.label_unit),
            x: l.pixel,
            y: x_label_y,
            align: TextAlign::Center,
            baseline: x_baseline,
        })
        .collect();

    let x0 = vp.value_to_pixel(0.0, Axis::X);
    let (y_label_x, y_align) = if x0.is_finite() && (0.0..=width).contains(&x0) {
        if x0 > label_size + Y_LABEL_MARGIN * 2.0 {
            (x0 - Y_LABEL_MARGIN, TextAlign::Right)
        } else {
            (x0 + Y_LABEL_MARGIN, TextAlign::Left)
        }
    } else {
        (2.0, TextAlign::Left)
    };

    let y_labels = y_lines
        .iter()
        .filter(|l| l.pixel >= -LABEL_OVERSCAN_PX && l.pixel <= height + LABEL_OVERSCAN_PX)
        .filter(|l| l.value.abs() >= metrics.y.skip_tol)
        .map(|l| GridLabel {
            text: format_tick_label(l.value, metrics.y.step, metrics.label_unit),
            x: y_label_x,
            y: l.pixel,
            align: y_align,
            baseline: TextBaseline::Middle,
        })
        .collect();

    (x_labels, y_labels)
}

pub fn compute_grid_layout(params: &GridParams) -> GridLayout {
    let metrics = compute_grid_metrics(params);
    let x_lines = axis_lines(&metrics.x);
    let y_lines = axis_lines(&metrics.y);
    let (x_labels, y_labels) = build_labels(params, &metrics, &x_lines, &y_lines);
    GridLayout {
        metrics,
        x_lines,
        y_lines,
        x_labels,
        y_labels,
    }
}

/// Memoizing front for [`compute_grid_layout`].
#[derive(Debug)]
pub struct GridRenderer {
    cache: LayerCache<GridKey, GridLayout>,
}

impl Default for GridRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GridRenderer {
    pub fn new() -> Self {
        Self {
            cache: LayerCache::new("grid"),
        }
    }

    pub fn layout(&mut self, params: &GridParams) -> Arc<GridLayout> {
        self.cache
            .get_or_build(&params.key(), || compute_grid_layout(params))
    }

    pub fn cache(&self) -> &LayerCache<GridKey, GridLayout> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office(unit_display: bool) -> GridParams {
        GridParams {
            unit: LengthUnit::Millimeter,
            bounds: Bounds::new(-6000.0, 6000.0, 0.0, 12000.0),
            width: 800.0,
            height: 800.0,
            unit_display,
            label_size: 18,
        }
    }

    #[test]
    fn test_step_selection() {
        // 800px over 12m: 1m is 66.7px, 0.5m only 33px
        let step = choose_step(LengthUnit::Millimeter, 800.0 / 12000.0, 12000.0);
        assert_eq!(step, 1000.0);
        assert_eq!(choose_step(LengthUnit::Millimeter, 0.0, 12000.0), 1200.0);
    }

    #[test]
    fn test_count_steps() {
        assert_eq!(count_steps(6000.0, -6000.0, 1000.0), 13);
        assert_eq!(count_steps(1.0, 0.0, 0.0), 0);
        assert_eq!(count_steps(0.0, 10.0, 1.0), 0);
    }

    #[test]
    fn test_layout_lines() {
        let layout = compute_grid_layout(&office(false));
        assert_eq!(layout.x_lines.len(), 13);
        assert_eq!(layout.y_lines.len(), 13);
        assert_eq!(layout.x_lines[6].value, 0.0);
        assert!((layout.x_lines[6].pixel - 400.0).abs() < 1e-9);
        assert!(layout.x_labels.is_empty());
    }

    #[test]
    fn test_labels_skip_origin() {
        let layout = compute_grid_layout(&office(true));
        assert_eq!(layout.x_labels.len(), 12);
        assert!(layout.x_labels.iter().all(|l| l.text != "0m"));
        assert_eq!(layout.x_labels[0].text, "-6m");
        // y = 0 sits at the top edge, so x labels hang below it
        assert_eq!(layout.x_labels[0].baseline, TextBaseline::Top);
        assert_eq!(layout.x_labels[0].y, 2.0);
        // x = 0 is mid-canvas, so y labels sit left of it
        assert_eq!(layout.y_labels[0].align, TextAlign::Right);
        assert_eq!(layout.y_labels[0].x, 396.0);
    }

    #[test]
    fn test_labels_when_origin_offscreen() {
        let mut params = office(true);
        params.bounds = Bounds::new(1000.0, 5000.0, 1000.0, 5000.0);
        let layout = compute_grid_layout(&params);
        assert!(layout
            .x_labels
            .iter()
            .all(|l| l.y == 798.0 && l.baseline == TextBaseline::Bottom));
        assert!(layout
            .y_labels
            .iter()
            .all(|l| l.x == 2.0 && l.align == TextAlign::Left));
    }

    #[test]
    fn test_imperial_labels() {
        let mut params = office(true);
        params.unit = LengthUnit::Inch;
        let layout = compute_grid_layout(&params);
        assert_eq!(layout.metrics.label_unit, LengthUnit::Foot);
        assert!(layout.x_labels.iter().all(|l| l.text.ends_with("ft")));
    }

    #[test]
    fn test_renderer_memoizes() {
        let mut renderer = GridRenderer::new();
        let a = renderer.layout(&office(true));
        let b = renderer.layout(&office(true));
        assert!(Arc::ptr_eq(&a, &b));
        let mut dark = office(true);
        dark.label_size = 12;
        renderer.layout(&dark);
        assert_eq!(renderer.cache().hits(), 1);
        assert_eq!(renderer.cache().misses(), 2);
    }
}
