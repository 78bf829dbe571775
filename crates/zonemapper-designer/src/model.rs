//! Zone data model.
//!
//! A [`Zone`] pairs a positive id with one of three geometries. All
//! coordinates are canonical millimeters. A zone whose shape is `none` has no
//! geometry and therefore never appears in the store; clearing a zone removes
//! it instead.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use zonemapper_core::{Error, Point, Result};

/// Largest number of polygon vertices a zone may carry.
pub const POLYGON_MAX_POINTS: usize = 32;
/// Smallest number of polygon vertices that encloses an area.
pub const POLYGON_MIN_POINTS: usize = 3;

/// Wire tag for a zone's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneShape {
    Rect,
    Ellipse,
    Polygon,
    None,
}

impl ZoneShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Ellipse => "ellipse",
            Self::Polygon => "polygon",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ZoneShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneShape {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rect" => Ok(Self::Rect),
            "ellipse" => Ok(Self::Ellipse),
            "polygon" => Ok(Self::Polygon),
            "none" | "" => Ok(Self::None),
            other => Err(format!("Unknown zone shape: {}", other)),
        }
    }
}

/// Axis-aligned rectangle payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectData {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Ellipse payload: center and radii.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipseData {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
}

/// Polygon payload, implicitly closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonData {
    pub points: Vec<Point>,
}

/// Geometry of a drawn zone.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneGeometry {
    Rect(RectData),
    Ellipse(EllipseData),
    Polygon(PolygonData),
}

impl ZoneGeometry {
    /// Rectangle from two corners, in any order.
    pub fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::Rect(RectData {
            x_min: x1.min(x2),
            x_max: x1.max(x2),
            y_min: y1.min(y2),
            y_max: y1.max(y2),
        })
    }

    /// Ellipse with radii floored at one unit.
    pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        Self::Ellipse(EllipseData {
            cx,
            cy,
            rx: rx.abs().max(1.0),
            ry: ry.abs().max(1.0),
        })
    }

    /// Polygon from vertices. Fails outside 3..=32 vertices.
    pub fn polygon(points: Vec<Point>) -> Result<Self> {
        let geometry = Self::Polygon(PolygonData { points });
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn shape(&self) -> ZoneShape {
        match self {
            Self::Rect(_) => ZoneShape::Rect,
            Self::Ellipse(_) => ZoneShape::Ellipse,
            Self::Polygon(_) => ZoneShape::Polygon,
        }
    }

    /// Checks the payload invariants.
    pub fn validate(&self) -> Result<()> {
        let shape = self.shape().as_str();
        match self {
            Self::Rect(r) => {
                if ![r.x_min, r.x_max, r.y_min, r.y_max].iter().all(|v| v.is_finite()) {
                    return Err(Error::invalid_geometry(shape, "non-finite bound"));
                }
                if r.x_min > r.x_max || r.y_min > r.y_max {
                    return Err(Error::invalid_geometry(shape, "min exceeds max"));
                }
            }
            Self::Ellipse(e) => {
                if ![e.cx, e.cy, e.rx, e.ry].iter().all(|v| v.is_finite()) {
                    return Err(Error::invalid_geometry(shape, "non-finite value"));
                }
                if e.rx < 1.0 || e.ry < 1.0 {
                    return Err(Error::invalid_geometry(shape, "radius below one unit"));
                }
            }
            Self::Polygon(p) => {
                let count = p.points.len();
                if !(POLYGON_MIN_POINTS..=POLYGON_MAX_POINTS).contains(&count) {
                    return Err(Error::invalid_geometry(
                        shape,
                        format!(
                            "{} points, expected {}..={}",
                            count, POLYGON_MIN_POINTS, POLYGON_MAX_POINTS
                        ),
                    ));
                }
                if !p.points.iter().all(|pt| pt.x.is_finite() && pt.y.is_finite()) {
                    return Err(Error::invalid_geometry(shape, "non-finite vertex"));
                }
            }
        }
        Ok(())
    }

    /// Payload as sent to and received from the backend.
    pub fn to_data(&self) -> Value {
        match self {
            Self::Rect(r) => json!(r),
            Self::Ellipse(e) => json!(e),
            Self::Polygon(p) => json!(p),
        }
    }

    /// Decodes a backend `shape` + `data` pair.
    ///
    /// `none` and a null payload both decode to `Ok(None)`. Rectangle bounds
    /// given in the wrong order are swapped; anything else that breaks an
    /// invariant is an error.
    pub fn from_wire(shape: &str, data: &Value) -> Result<Option<Self>> {
        let shape: ZoneShape = shape
            .parse()
            .map_err(|e: String| Error::invalid_geometry(shape, e))?;
        if data.is_null() || shape == ZoneShape::None {
            return Ok(None);
        }
        let decode_err = |e: serde_json::Error| Error::invalid_geometry(shape.as_str(), e.to_string());
        let geometry = match shape {
            ZoneShape::Rect => {
                let r: RectData = serde_json::from_value(data.clone()).map_err(decode_err)?;
                Self::rect(r.x_min, r.y_min, r.x_max, r.y_max)
            }
            ZoneShape::Ellipse => {
                Self::Ellipse(serde_json::from_value(data.clone()).map_err(decode_err)?)
            }
            ZoneShape::Polygon => {
                Self::Polygon(serde_json::from_value(data.clone()).map_err(decode_err)?)
            }
            ZoneShape::None => return Ok(None),
        };
        geometry.validate()?;
        Ok(Some(geometry))
    }

    /// Whether a world point lies inside the zone.
    ///
    /// Rectangles are inclusive, ellipses use the normalized radius test and
    /// polygons the even-odd rule.
    pub fn contains(&self, point: &Point) -> bool {
        match self {
            Self::Rect(r) => {
                point.x >= r.x_min && point.x <= r.x_max && point.y >= r.y_min && point.y <= r.y_max
            }
            Self::Ellipse(e) => {
                if e.rx <= 0.0 || e.ry <= 0.0 {
                    return false;
                }
                let dx = (point.x - e.cx) / e.rx;
                let dy = (point.y - e.cy) / e.ry;
                dx * dx + dy * dy <= 1.0
            }
            Self::Polygon(p) => polygon_contains(&p.points, point),
        }
    }

    /// World-space bounding box as `(min, max)`.
    pub fn bounding_box(&self) -> (Point, Point) {
        match self {
            Self::Rect(r) => (Point::new(r.x_min, r.y_min), Point::new(r.x_max, r.y_max)),
            Self::Ellipse(e) => (
                Point::new(e.cx - e.rx, e.cy - e.ry),
                Point::new(e.cx + e.rx, e.cy + e.ry),
            ),
            Self::Polygon(p) => {
                let mut min = Point::new(f64::INFINITY, f64::INFINITY);
                let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
                for pt in &p.points {
                    min.x = min.x.min(pt.x);
                    min.y = min.y.min(pt.y);
                    max.x = max.x.max(pt.x);
                    max.y = max.y.max(pt.y);
                }
                (min, max)
            }
        }
    }
}

fn polygon_contains(points: &[Point], point: &Point) -> bool {
    if points.len() < POLYGON_MIN_POINTS {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Area centroid of a closed polygon given as plain `(x, y)` pairs.
///
/// Returns `None` for degenerate (near zero-area) outlines.
pub fn polygon_centroid(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < POLYGON_MIN_POINTS {
        return None;
    }
    let (mut area, mut cx, mut cy) = (0.0, 0.0, 0.0);
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        let cross = xi * yj - xj * yi;
        area += cross;
        cx += (xi + xj) * cross;
        cy += (yi + yj) * cross;
        j = i;
    }
    area *= 0.5;
    if area.abs() <= 1e-6 {
        return None;
    }
    Some((cx / (6.0 * area), cy / (6.0 * area)))
}

/// A drawn zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: i64,
    pub geometry: ZoneGeometry,
}

impl Zone {
    pub fn new(id: i64, geometry: ZoneGeometry) -> Self {
        Self { id, geometry }
    }

    pub fn shape(&self) -> ZoneShape {
        self.geometry.shape()
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.geometry.contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ]
    }

    #[test]
    fn test_shape_tags() {
        assert_eq!("RECT".parse::<ZoneShape>(), Ok(ZoneShape::Rect));
        assert_eq!("none".parse::<ZoneShape>(), Ok(ZoneShape::None));
        assert!("circle".parse::<ZoneShape>().is_err());
        assert_eq!(ZoneShape::Polygon.to_string(), "polygon");
    }

    #[test]
    fn test_rect_from_any_corners() {
        let g = ZoneGeometry::rect(2000.0, 4000.0, -1000.0, 1000.0);
        assert_eq!(
            g,
            ZoneGeometry::Rect(RectData {
                x_min: -1000.0,
                x_max: 2000.0,
                y_min: 1000.0,
                y_max: 4000.0
            })
        );
        assert!(g.validate().is_ok());
    }

    #[test]
    fn test_ellipse_radius_floor() {
        let g = ZoneGeometry::ellipse(0.0, 0.0, 0.2, -5.0);
        assert_eq!(
            g,
            ZoneGeometry::Ellipse(EllipseData {
                cx: 0.0,
                cy: 0.0,
                rx: 1.0,
                ry: 5.0
            })
        );
    }

    #[test]
    fn test_polygon_point_limits() {
        assert!(ZoneGeometry::polygon(square()[..2].to_vec()).is_err());
        assert!(ZoneGeometry::polygon(square()).is_ok());
        let too_many = (0..33).map(|i| Point::new(i as f64, (i * i) as f64)).collect();
        assert!(ZoneGeometry::polygon(too_many).is_err());
    }

    #[test]
    fn test_wire_round_trip_shape() {
        let data = json!({"x_min": 10, "x_max": -10, "y_min": 0, "y_max": 5});
        let g = ZoneGeometry::from_wire("rect", &data).unwrap().unwrap();
        assert_eq!(
            g.to_data(),
            json!({"x_min": -10.0, "x_max": 10.0, "y_min": 0.0, "y_max": 5.0})
        );

        assert_eq!(ZoneGeometry::from_wire("none", &json!({"x": 1})).unwrap(), None);
        assert_eq!(ZoneGeometry::from_wire("rect", &Value::Null).unwrap(), None);
        assert!(ZoneGeometry::from_wire("rect", &json!({"cx": 1})).is_err());
        assert!(ZoneGeometry::from_wire("triangle", &json!({})).is_err());

        let poly = json!({"points": [{"x": 0, "y": 0}, {"x": 10, "y": 0}]});
        assert!(ZoneGeometry::from_wire("polygon", &poly).is_err());
    }

    #[test]
    fn test_contains() {
        let rect = ZoneGeometry::rect(0.0, 0.0, 100.0, 50.0);
        assert!(rect.contains(&Point::new(100.0, 50.0)));
        assert!(!rect.contains(&Point::new(101.0, 50.0)));

        let ellipse = ZoneGeometry::ellipse(0.0, 0.0, 100.0, 50.0);
        assert!(ellipse.contains(&Point::new(99.0, 0.0)));
        assert!(!ellipse.contains(&Point::new(80.0, 40.0)));

        let poly = ZoneGeometry::polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(0.0, 100.0),
        ])
        .unwrap();
        assert!(poly.contains(&Point::new(10.0, 10.0)));
        assert!(!poly.contains(&Point::new(80.0, 80.0)));
    }

    #[test]
    fn test_centroid() {
        let pts = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let (cx, cy) = polygon_centroid(&pts).unwrap();
        assert!((cx - 5.0).abs() < 1e-9);
        assert!((cy - 5.0).abs() < 1e-9);

        let line = [(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)];
        assert_eq!(polygon_centroid(&line), None);
    }

    #[test]
    fn test_bounding_box() {
        let poly = ZoneGeometry::polygon(square()).unwrap();
        let (min, max) = poly.bounding_box();
        assert_eq!(min, Point::new(0.0, 0.0));
        assert_eq!(max, Point::new(100.0, 100.0));
    }
}
