//! # Zone Mapper Designer
//!
//! The zone drawing editor: a pure view-model over sensor zones, with a
//! display-list renderer that hosts can replay on any canvas.
//!
//! ## Core Components
//!
//! - **Viewport**: world millimeters to canvas pixels and back
//! - **Grid / Cone**: adaptive tick layout and field-of-view rings, memoized
//!   on an immutable parameter fingerprint
//! - **Drawing**: rectangle, ellipse and polygon gesture state machine
//! - **Zones**: shape model, roster of named zones, id-keyed store and
//!   reconciliation against backend-reported state
//! - **Targets**: live X/Y entity pairs projected into the cone frame
//! - **Scene / Renderer**: flat draw command list and a tiny-skia rasterizer
//!
//! ## Architecture
//!
//! ```text
//! ZoneMapper (view-model)
//!   ├── DrawingState ── pointer / key input
//!   ├── ZoneRoster + ZoneStore ── reconcile(host state)
//!   ├── GridRenderer / ConeRenderer ── LayerCache
//!   └── render() ──> Scene ──> render_scene() ──> RgbImage
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use zonemapper_designer::{PointerEvent, RecordingBackend, ZoneMapper};
//! use zonemapper_settings::CardConfig;
//!
//! let config = CardConfig::stub();
//! let mut mapper = ZoneMapper::new(&config, Arc::new(RecordingBackend::new()))?;
//! mapper.add_zone();
//! mapper.pointer_down(PointerEvent::mouse(300.0, 100.0, 0));
//! mapper.pointer_up(PointerEvent::mouse(500.0, 300.0, 40));
//! let scene = mapper.render();
//! ```

pub mod backend;
pub mod cache;
pub mod cone;
pub mod drawing;
pub mod grid;
pub mod layers;
pub mod mapper;
pub mod model;
pub mod reconcile;
pub mod renderer;
pub mod roster;
pub mod scene;
pub mod targets;
pub mod viewport;
pub mod zone_store;

pub use backend::{RecordingBackend, UpdateZoneRequest, ZoneBackend};
pub use cache::LayerCache;
pub use cone::{ConeParams, ConeRenderer, ConeRings, CONE_SEGMENTS};
pub use drawing::{DrawKey, DrawMode, DrawOutcome, DrawingState, InputChannel, PointerEvent};
pub use grid::{GridLayout, GridParams, GridRenderer};
pub use mapper::ZoneMapper;
pub use model::{
    EllipseData, PolygonData, RectData, Zone, ZoneGeometry, ZoneShape, POLYGON_MAX_POINTS,
    POLYGON_MIN_POINTS,
};
pub use reconcile::{reconcile, ReconcileReport};
pub use renderer::render_scene;
pub use roster::ZoneRoster;
pub use scene::{Color, DrawCommand, Layer, Scene, StrokeStyle, TextLabel};
pub use targets::{project_targets, TargetMarker};
pub use viewport::{Viewport, CANVAS_SIZE};
pub use zone_store::ZoneStore;
