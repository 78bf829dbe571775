//! Zone mapper view-model.
//!
//! [`ZoneMapper`] owns every piece of editor state (settings, roster, zone
//! store, drawing gesture, cone rotation, tracked pairs) and exposes the
//! operations a host UI calls in response to user input. It never paints:
//! [`ZoneMapper::render`] returns a [`Scene`] that the host replays, or hands
//! to [`render_scene`](crate::renderer::render_scene).
//!
//! Edits update local state first and are then written through to the
//! [`ZoneBackend`]. Notices go out on the instance [`EventBus`]; when nobody
//! is listening they fall back to [`ZoneBackend::alert`].

use std::sync::Arc;

use tracing::{debug, info, trace, warn};
use zonemapper_core::{
    format_grid_value, AppEvent, ConeEvent, Cone, DrawingEvent, EntityPair, EventBus, Point,
    StateSnapshot, ZoneEvent,
};
use zonemapper_devicedb::{suggest_pairs, DeviceEntry, DeviceRegistry, RegistrySource};
use zonemapper_settings::{CardConfig, CardSettings, ConfigResult};

use crate::backend::{UpdateZoneRequest, ZoneBackend};
use crate::cone::{ConeParams, ConeRenderer};
use crate::drawing::{DrawKey, DrawMode, DrawOutcome, DrawingState, PointerEvent};
use crate::grid::{GridParams, GridRenderer};
use crate::layers;
use crate::model::{ZoneGeometry, POLYGON_MAX_POINTS};
use crate::reconcile::{reconcile, ReconcileReport};
use crate::roster::{default_zone_name, ZoneRoster};
use crate::scene::Scene;
use crate::targets::{project_targets, TargetMarker};
use crate::viewport::{Viewport, CANVAS_SIZE};
use crate::zone_store::ZoneStore;

pub const LOCKED_NOTICE: &str = "Drawing locked. Unlock the grid to edit zones.";
pub const UNLOCKED_NOTICE: &str = "Drawing unlocked. You can edit zones now.";
pub const PAIRS_SAVED_NOTICE: &str = "Entity pairs saved";
pub const ALL_CLEARED_NOTICE: &str = "All zones cleared";
pub const INVALID_RENAME_NOTICE: &str = "Unable to save name: invalid zone id";
pub const INVALID_DELETE_NOTICE: &str = "Unable to delete: invalid zone id";

/// The zone drawing editor.
pub struct ZoneMapper {
    settings: CardSettings,
    viewport: Viewport,
    backend: Arc<dyn ZoneBackend>,
    events: EventBus,
    roster: ZoneRoster,
    store: ZoneStore,
    drawing: DrawingState,
    selected: Option<i64>,
    cone_angle: f64,
    pairs: Vec<EntityPair>,
    selected_device: Option<String>,
    registry: DeviceRegistry,
    states: Option<StateSnapshot>,
    grid_renderer: GridRenderer,
    cone_renderer: ConeRenderer,
}

impl ZoneMapper {
    /// Creates an editor for `config`. Fails when `location` is missing.
    pub fn new(config: &CardConfig, backend: Arc<dyn ZoneBackend>) -> ConfigResult<Self> {
        let settings = CardSettings::from_config(config)?;
        let mut mapper = Self {
            viewport: Viewport::new(settings.bounds, CANVAS_SIZE, CANVAS_SIZE),
            roster: ZoneRoster::new(settings.zones.clone()),
            cone_angle: settings.cone.angle_deg,
            pairs: settings.entity_pairs.clone(),
            settings,
            backend,
            events: EventBus::new(),
            store: ZoneStore::new(),
            drawing: DrawingState::new(),
            selected: None,
            selected_device: None,
            registry: DeviceRegistry::default(),
            states: None,
            grid_renderer: GridRenderer::new(),
            cone_renderer: ConeRenderer::new(),
        };
        mapper.selected = mapper.roster.resolve_selection(None);
        info!("Zone mapper ready for {}", mapper.settings.location);
        Ok(mapper)
    }

    /// Applies a new configuration on top of the current settings.
    ///
    /// The roster is reseeded, the cone angle reset to the configured value
    /// and any gesture dropped. Known host state is reconciled again.
    pub fn set_config(&mut self, config: &CardConfig) -> ConfigResult<()> {
        let settings = self.settings.apply(config)?;
        self.viewport = Viewport::new(settings.bounds, CANVAS_SIZE, CANVAS_SIZE);
        self.roster = ZoneRoster::new(settings.zones.clone());
        self.cone_angle = settings.cone.angle_deg;
        if settings.direct_entity {
            self.pairs = settings.entity_pairs.clone();
        }
        self.settings = settings;
        self.drawing.reset();
        if self.states.is_some() {
            self.reconcile();
        }
        self.selected = self.roster.resolve_selection(self.selected);
        debug!("Configuration applied for {}", self.settings.location);
        Ok(())
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn settings(&self) -> &CardSettings {
        &self.settings
    }

    pub fn location(&self) -> &str {
        &self.settings.location
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn roster(&self) -> &ZoneRoster {
        &self.roster
    }

    pub fn zones(&self) -> &ZoneStore {
        &self.store
    }

    pub fn drawing(&self) -> &DrawingState {
        &self.drawing
    }

    pub fn selected_zone(&self) -> Option<i64> {
        self.selected
    }

    pub fn is_locked(&self) -> bool {
        self.drawing.is_locked()
    }

    pub fn cone_angle(&self) -> f64 {
        self.cone_angle
    }

    /// Configured cone with the live rotation.
    pub fn cone(&self) -> Cone {
        Cone {
            angle_deg: self.cone_angle,
            ..self.settings.cone
        }
    }

    pub fn entity_pairs(&self) -> &[EntityPair] {
        &self.pairs
    }

    pub fn selected_device(&self) -> Option<&str> {
        self.selected_device.as_deref()
    }

    pub fn devices(&self) -> &[DeviceEntry] {
        self.registry.devices()
    }

    pub fn host_state(&self) -> Option<&StateSnapshot> {
        self.states.as_ref()
    }

    pub fn grid_renderer(&self) -> &GridRenderer {
        &self.grid_renderer
    }

    pub fn cone_renderer(&self) -> &ConeRenderer {
        &self.cone_renderer
    }

    // Notices and backend

    fn emit(&self, event: AppEvent) {
        if let Err(e) = self.events.publish(event) {
            trace!("Event not delivered: {}", e);
        }
    }

    fn notify(&self, message: impl Into<String>) {
        let message = message.into();
        if self.events.publish(AppEvent::notify(message.clone())).is_err() {
            self.backend.alert(&message);
        }
    }

    fn send(&self, request: UpdateZoneRequest) {
        if let Some(id) = request.zone_id.filter(|id| *id <= 0) {
            warn!("Not sending update for invalid zone id {}", id);
            return;
        }
        if let Err(e) = self.backend.update_zone(&request) {
            warn!("update_zone for {} failed: {}", request.location, e);
        }
    }

    // Host state

    /// Stores a new host state snapshot.
    ///
    /// Zone records are reconciled only on the first injection; later
    /// snapshots feed the target overlay and leave local edits alone. Call
    /// [`reconcile`](Self::reconcile) after a reconnect to pull the backend
    /// state again.
    ///
    /// Returns `true` on the first injection, which is when the host should
    /// call [`load_registries`](Self::load_registries).
    pub fn set_host_state(&mut self, states: StateSnapshot) -> bool {
        let first = self.states.is_none();
        self.states = Some(states);
        if first {
            self.reconcile();
        }
        first
    }

    /// Merges zone records from the current host state.
    ///
    /// Backend geometry, names and rotation win over local state.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let Some(states) = self.states.as_ref() else {
            return ReconcileReport::default();
        };
        let report = reconcile(
            &self.settings.location,
            states,
            &mut self.roster,
            &mut self.store,
        );

        if let Some(angle) = report.rotation_deg {
            if angle != self.cone_angle {
                self.cone_angle = angle;
                self.emit(AppEvent::Cone(ConeEvent::Rotated {
                    angle_deg: angle,
                    persisted: false,
                }));
            }
        }
        if let Some(restored) = &report.restored_pairs {
            if self.pairs.is_empty() && !restored.is_empty() {
                self.pairs = restored.clone();
                if let Some(device) = self.registry.infer_device(&self.pairs) {
                    self.selected_device = Some(device);
                }
                debug!("Restored {} entity pairs", self.pairs.len());
            }
        }
        if report.relabeled || !report.discovered.is_empty() {
            self.emit(AppEvent::Zone(ZoneEvent::Relabeled));
        }
        self.selected = self.roster.resolve_selection(self.selected);
        report
    }

    /// Loads the device and entity registries.
    ///
    /// Failures are logged and leave the registry empty. Returns whether a
    /// registry was loaded.
    pub async fn load_registries(&mut self, source: &dyn RegistrySource) -> bool {
        match DeviceRegistry::load(source).await {
            Ok(registry) => {
                self.registry = registry;
                if self.selected_device.is_none() && !self.pairs.is_empty() {
                    self.selected_device = self.registry.infer_device(&self.pairs);
                }
                true
            }
            Err(e) => {
                debug!("Registry load failed: {}", e);
                false
            }
        }
    }

    // Pointer and keyboard input

    fn handle(&mut self, outcome: DrawOutcome) -> DrawOutcome {
        match &outcome {
            DrawOutcome::Notice(message) => self.notify(message.clone()),
            DrawOutcome::Commit(geometry) => {
                if !self.commit(geometry.clone()) {
                    return DrawOutcome::Ignored;
                }
            }
            DrawOutcome::Cancelled => self.emit(AppEvent::Drawing(DrawingEvent::Cancelled)),
            DrawOutcome::Ignored | DrawOutcome::Redraw => {}
        }
        outcome
    }

    fn commit(&mut self, geometry: ZoneGeometry) -> bool {
        let Some(zone_id) = self.selected else {
            debug!("Discarding {} drawn without a selected zone", geometry.shape());
            return false;
        };
        let shape = geometry.shape();
        self.send(UpdateZoneRequest::geometry(
            &self.settings.location,
            zone_id,
            Some(&geometry),
            &self.pairs,
        ));
        self.store.upsert(zone_id, geometry);
        info!("Zone {} committed as {}", zone_id, shape);
        self.notify(format!("{} saved", self.roster.label(zone_id)));
        self.emit(AppEvent::Zone(ZoneEvent::Committed {
            zone_id,
            shape: shape.to_string(),
        }));
        true
    }

    pub fn pointer_down(&mut self, event: PointerEvent) -> DrawOutcome {
        let outcome = self
            .drawing
            .start_drawing(event, self.selected.is_some());
        self.handle(outcome)
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> DrawOutcome {
        let outcome = self.drawing.draw(event);
        self.handle(outcome)
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> DrawOutcome {
        let outcome = self.drawing.end_drawing(event, &self.viewport);
        self.handle(outcome)
    }

    /// Double click finishes a polygon in progress.
    pub fn double_click(&mut self) -> DrawOutcome {
        if self.drawing.mode() != DrawMode::Polygon {
            return DrawOutcome::Ignored;
        }
        self.finish_polygon()
    }

    pub fn pointer_leave(&mut self) -> DrawOutcome {
        let outcome = self.drawing.cancel();
        self.handle(outcome)
    }

    /// A press outside the editor cancels the gesture.
    pub fn outside_click(&mut self) -> DrawOutcome {
        let outcome = self.drawing.cancel();
        self.handle(outcome)
    }

    pub fn key_down(&mut self, key: DrawKey) -> DrawOutcome {
        let outcome = self.drawing.key_down(key);
        self.handle(outcome)
    }

    pub fn undo_polygon_vertex(&mut self) -> DrawOutcome {
        let outcome = self.drawing.undo_vertex();
        self.handle(outcome)
    }

    pub fn finish_polygon(&mut self) -> DrawOutcome {
        let outcome = self.drawing.finish_polygon(&self.viewport);
        self.handle(outcome)
    }

    pub fn set_draw_mode(&mut self, mode: DrawMode) -> bool {
        if !self.drawing.set_mode(mode) {
            return false;
        }
        self.emit(AppEvent::Drawing(DrawingEvent::ModeChanged {
            mode: mode.to_string(),
        }));
        true
    }

    /// Flips the drawing lock and returns the new state.
    pub fn toggle_lock(&mut self) -> bool {
        let locked = self.drawing.toggle_lock();
        self.notify(if locked { LOCKED_NOTICE } else { UNLOCKED_NOTICE });
        self.emit(AppEvent::Drawing(DrawingEvent::LockChanged { locked }));
        locked
    }

    /// World point under a canvas pixel.
    pub fn pixel_to_world(&self, x: f64, y: f64) -> Point {
        self.viewport.pixel_to_world(x, y)
    }

    /// Topmost zone under a canvas pixel.
    pub fn zone_at_pixel(&self, x: f64, y: f64) -> Option<i64> {
        self.store
            .zone_at(&self.viewport.pixel_to_world(x, y))
            .map(|zone| zone.id)
    }

    // Zone roster

    /// Selects a listed zone. Switching zones drops the current gesture.
    pub fn select_zone(&mut self, zone_id: i64) -> bool {
        if !self.roster.contains(zone_id) {
            return false;
        }
        if self.selected != Some(zone_id) {
            self.drawing.reset();
            self.selected = Some(zone_id);
        }
        true
    }

    /// Adds a zone with the next free id and selects it.
    pub fn add_zone(&mut self) -> i64 {
        let zone_id = self.roster.next_free_id(&self.store.ids());
        self.roster.add(zone_id);
        self.selected = Some(zone_id);
        self.drawing.reset();
        self.send(UpdateZoneRequest::new_zone(
            &self.settings.location,
            zone_id,
            &default_zone_name(zone_id),
        ));
        self.emit(AppEvent::Zone(ZoneEvent::Added { zone_id }));
        info!("Added zone {}", zone_id);
        zone_id
    }

    /// Renames a zone; blank names fall back to `Zone {id}`.
    pub fn rename_zone(&mut self, zone_id: i64, name: &str) -> bool {
        let Some(stored) = self.roster.rename(zone_id, name) else {
            return false;
        };
        if zone_id <= 0 {
            self.notify(INVALID_RENAME_NOTICE);
            return false;
        }
        self.send(UpdateZoneRequest::rename(
            &self.settings.location,
            zone_id,
            &stored,
        ));
        self.emit(AppEvent::Zone(ZoneEvent::Renamed {
            zone_id,
            name: stored,
        }));
        self.notify(format!("{} saved", self.roster.label(zone_id)));
        true
    }

    /// Deletes a zone from the backend, the roster and the store.
    pub fn delete_zone(&mut self, zone_id: i64) -> bool {
        if zone_id <= 0 {
            self.notify(INVALID_DELETE_NOTICE);
            return false;
        }
        let label = self.roster.label(zone_id);
        self.send(UpdateZoneRequest::delete(&self.settings.location, zone_id));
        let listed = self.roster.remove(zone_id);
        let drawn = self.store.remove(zone_id).is_some();
        if self.selected == Some(zone_id) {
            self.selected = None;
            self.drawing.reset();
        }
        self.emit(AppEvent::Zone(ZoneEvent::Deleted { zone_id }));
        self.notify(format!("{} deleted", label));
        info!("Deleted zone {}", zone_id);
        listed || drawn
    }

    /// Removes a zone's geometry and tells the backend.
    pub fn clear_zone(&mut self, zone_id: i64) {
        self.store.remove(zone_id);
        self.send(UpdateZoneRequest::geometry(
            &self.settings.location,
            zone_id,
            None,
            &self.pairs,
        ));
        self.notify(format!("{} cleared", self.roster.label(zone_id)));
        if self.selected == Some(zone_id) {
            self.drawing.reset();
        }
        self.emit(AppEvent::Zone(ZoneEvent::Cleared { zone_id }));
    }

    /// Clears every listed zone. Returns the number of backend updates sent.
    pub fn clear_all_zones(&mut self) -> usize {
        let ids = self.roster.ids();
        self.store.clear();
        self.drawing.reset();
        for zone_id in &ids {
            self.send(UpdateZoneRequest::geometry(
                &self.settings.location,
                *zone_id,
                None,
                &self.pairs,
            ));
        }
        if !ids.is_empty() {
            self.notify(ALL_CLEARED_NOTICE);
            self.emit(AppEvent::Zone(ZoneEvent::AllCleared { count: ids.len() }));
        }
        ids.len()
    }

    // Cone rotation

    /// Slider input: updates the angle without persisting it.
    pub fn set_cone_angle_input(&mut self, angle_deg: f64) -> f64 {
        self.cone_angle = Cone::clamp_angle(angle_deg);
        self.emit(AppEvent::Cone(ConeEvent::Rotated {
            angle_deg: self.cone_angle,
            persisted: false,
        }));
        self.cone_angle
    }

    /// Slider release: persists the current angle.
    pub fn commit_cone_angle(&mut self) {
        self.send(UpdateZoneRequest::rotation(
            &self.settings.location,
            self.cone_angle,
        ));
        self.emit(AppEvent::Cone(ConeEvent::Rotated {
            angle_deg: self.cone_angle,
            persisted: true,
        }));
    }

    /// Resets to the configured angle and persists it.
    pub fn reset_cone_angle(&mut self) -> f64 {
        self.cone_angle = self.settings.default_cone_angle;
        self.commit_cone_angle();
        self.cone_angle
    }

    // Tracked entity pairs

    pub fn add_entity_pair(&mut self) {
        self.pairs.push(EntityPair::default());
    }

    pub fn set_pair_x(&mut self, index: usize, entity_id: &str) -> bool {
        match self.pairs.get_mut(index) {
            Some(pair) => {
                pair.x = entity_id.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_pair_y(&mut self, index: usize, entity_id: &str) -> bool {
        match self.pairs.get_mut(index) {
            Some(pair) => {
                pair.y = entity_id.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove_entity_pair(&mut self, index: usize) -> Option<EntityPair> {
        (index < self.pairs.len()).then(|| self.pairs.remove(index))
    }

    /// Saves the complete pairs to the backend.
    pub fn apply_entity_pairs(&mut self) {
        self.send(UpdateZoneRequest::entities(
            &self.settings.location,
            &self.pairs,
        ));
        self.notify(PAIRS_SAVED_NOTICE);
    }

    /// Picks a device and replaces the pairs with suggestions from its
    /// entities. `None` clears the pairs.
    pub fn select_device(&mut self, device_id: Option<&str>) -> usize {
        self.selected_device = device_id.map(str::to_string);
        self.pairs = match device_id {
            Some(id) => {
                let empty = StateSnapshot::new();
                let states = self.states.as_ref().unwrap_or(&empty);
                suggest_pairs(&self.registry, id, states)
            }
            None => Vec::new(),
        };
        debug!(
            "Device {:?} selected, {} pairs suggested",
            self.selected_device,
            self.pairs.len()
        );
        self.pairs.len()
    }

    /// Entity ids offered in the pair pickers, limited to the selected device.
    pub fn entity_options(&self) -> Vec<String> {
        self.registry.entity_options(self.selected_device.as_deref())
    }

    // Rendering

    fn grid_params(&self) -> GridParams {
        GridParams {
            unit: self.settings.grid_units,
            bounds: *self.viewport.bounds(),
            width: self.viewport.width(),
            height: self.viewport.height(),
            unit_display: self.settings.unit_display,
            label_size: self.settings.unit_label_size,
        }
    }

    fn cone_params(&self) -> ConeParams {
        ConeParams {
            cone: self.cone(),
            grid_unit: self.settings.grid_units,
            viewport: self.viewport,
            unit_display: self.settings.unit_display,
        }
    }

    /// Live targets for the current host state.
    pub fn targets(&self) -> Vec<TargetMarker> {
        match &self.states {
            Some(states) => project_targets(
                &self.pairs,
                states,
                self.cone_angle,
                self.settings.input_units,
            ),
            None => Vec::new(),
        }
    }

    /// Builds the display list for the current state.
    pub fn render(&mut self) -> Scene {
        let vp = self.viewport;
        let dark = self.settings.dark_mode;
        let label_size = self.settings.unit_label_size;
        let mut scene = Scene::new(vp.width().round() as u32, vp.height().round() as u32);

        layers::background(&mut scene, dark);
        let grid_params = self.grid_params();
        let grid = self.grid_renderer.layout(&grid_params);
        layers::grid_lines(&mut scene, &grid, vp.width(), vp.height());
        layers::axes(&mut scene, &vp, dark);
        if self.settings.unit_display {
            layers::grid_labels(&mut scene, &grid, label_size, dark);
        }

        let cone_params = self.cone_params();
        layers::cone(&mut scene, &cone_params.cone, &vp);
        let rings = self.cone_renderer.rings(&cone_params);
        if !rings.is_empty() {
            layers::cone_rings(&mut scene, &rings, label_size, dark);
        }

        layers::zones(&mut scene, &self.store, &self.roster, &vp, dark);
        layers::preview(&mut scene, &self.drawing, &vp, dark);
        layers::targets(&mut scene, &self.targets(), &vp);
        scene
    }

    /// One-line usage and unit summary.
    pub fn info_text(&self) -> String {
        let grid_unit = self.settings.grid_units;
        let bounds = self.viewport.bounds();
        format!(
            "Click & drag for Rectangle/Ellipse. Polygon: click points, double-click to finish \
             (max {} pts). Grid units: {} (X: {}..{}, Y: {}..{}). Input units: {}. Cone range: {} {}",
            POLYGON_MAX_POINTS,
            grid_unit.label(),
            format_grid_value(bounds.x_min, grid_unit),
            format_grid_value(bounds.x_max, grid_unit),
            format_grid_value(bounds.y_min, grid_unit),
            format_grid_value(bounds.y_max, grid_unit),
            self.settings.input_units.label(),
            format_grid_value(self.settings.cone.range_mm, grid_unit),
            grid_unit.label(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use serde_json::json;

    fn office() -> (ZoneMapper, Arc<RecordingBackend>) {
        let config = CardConfig::from_value(json!({
            "location": "Office",
            "zones": [{"id": 1, "name": "Desk"}, {"id": 2}],
            "grid": {"x_min": -6000, "x_max": 6000, "y_min": 0, "y_max": 12000}
        }))
        .unwrap();
        let backend = Arc::new(RecordingBackend::new());
        let mapper = ZoneMapper::new(&config, backend.clone()).unwrap();
        (mapper, backend)
    }

    #[test]
    fn test_missing_location_is_fatal() {
        let config = CardConfig::from_value(json!({"zones": []})).unwrap();
        let backend = Arc::new(RecordingBackend::new());
        assert!(ZoneMapper::new(&config, backend).is_err());
    }

    #[test]
    fn test_initial_selection() {
        let (mapper, _) = office();
        assert_eq!(mapper.selected_zone(), Some(1));
        assert_eq!(mapper.roster().label(2), "Zone 2");
    }

    #[test]
    fn test_ellipse_commit() {
        let (mut mapper, backend) = office();
        mapper.set_draw_mode(DrawMode::Ellipse);
        mapper.pointer_down(PointerEvent::mouse(400.0, 100.0, 0));
        mapper.pointer_move(PointerEvent::mouse(500.0, 300.0, 10));
        let outcome = mapper.pointer_up(PointerEvent::mouse(500.0, 300.0, 20));
        assert!(matches!(outcome, DrawOutcome::Commit(ZoneGeometry::Ellipse(_))));
        let call = backend.last_call().unwrap();
        assert_eq!(
            call.to_value()["data"],
            json!({"cx": 750.0, "cy": 3000.0, "rx": 750.0, "ry": 1500.0})
        );
        assert_eq!(backend.alerts(), vec!["Desk saved".to_string()]);
    }

    #[test]
    fn test_rename_and_delete() {
        let (mut mapper, backend) = office();
        assert!(mapper.rename_zone(2, "  "));
        assert_eq!(mapper.roster().label(2), "Zone 2");
        assert_eq!(
            backend.last_call().unwrap().to_value(),
            json!({"location": "Office", "zone_id": 2, "name": "Zone 2"})
        );

        assert!(mapper.delete_zone(1));
        assert_eq!(mapper.selected_zone(), None);
        assert_eq!(mapper.roster().ids(), vec![2]);
        assert!(!mapper.delete_zone(0));
        assert_eq!(backend.alerts().last().unwrap(), INVALID_DELETE_NOTICE);
    }

    #[test]
    fn test_add_zone_picks_free_id() {
        let (mut mapper, backend) = office();
        mapper.store.upsert(3, ZoneGeometry::rect(0.0, 0.0, 10.0, 10.0));
        assert_eq!(mapper.add_zone(), 4);
        assert_eq!(mapper.selected_zone(), Some(4));
        assert_eq!(
            backend.last_call().unwrap().to_value(),
            json!({"location": "Office", "zone_id": 4, "shape": "none", "data": null, "name": "Zone 4"})
        );
    }

    #[test]
    fn test_clear_all_sends_one_update_per_zone() {
        let (mut mapper, backend) = office();
        mapper.store.upsert(1, ZoneGeometry::rect(0.0, 0.0, 10.0, 10.0));
        assert_eq!(mapper.clear_all_zones(), 2);
        assert!(mapper.zones().is_empty());
        assert_eq!(backend.calls().len(), 2);
        assert_eq!(backend.alerts(), vec![ALL_CLEARED_NOTICE.to_string()]);
    }

    #[test]
    fn test_cone_slider() {
        let (mut mapper, backend) = office();
        assert_eq!(mapper.set_cone_angle_input(270.0), 180.0);
        assert!(backend.calls().is_empty());
        mapper.commit_cone_angle();
        assert_eq!(
            backend.last_call().unwrap().to_value(),
            json!({"location": "Office", "rotation_deg": 180.0})
        );
        assert_eq!(mapper.reset_cone_angle(), 0.0);
        assert_eq!(backend.calls().len(), 2);
    }

    #[test]
    fn test_pair_editing() {
        let (mut mapper, backend) = office();
        mapper.add_entity_pair();
        assert!(mapper.set_pair_x(0, "sensor.t1_x"));
        assert!(!mapper.set_pair_y(3, "sensor.t1_y"));
        mapper.add_entity_pair();
        mapper.set_pair_y(0, "sensor.t1_y");
        mapper.apply_entity_pairs();
        assert_eq!(
            backend.last_call().unwrap().to_value(),
            json!({"location": "Office", "entities": [{"x": "sensor.t1_x", "y": "sensor.t1_y"}]})
        );
        assert!(mapper.remove_entity_pair(1).is_some());
        assert!(mapper.remove_entity_pair(5).is_none());
        assert_eq!(mapper.select_device(None), 0);
        assert!(mapper.entity_pairs().is_empty());
    }

    #[test]
    fn test_info_text() {
        let (mapper, _) = office();
        assert_eq!(
            mapper.info_text(),
            "Click & drag for Rectangle/Ellipse. Polygon: click points, double-click to finish \
             (max 32 pts). Grid units: mm (X: -6000..6000, Y: 0..12000). Input units: mm. \
             Cone range: 6000 mm"
        );
    }

    #[test]
    fn test_render_layers() {
        let (mut mapper, _) = office();
        mapper.store.upsert(1, ZoneGeometry::rect(-1000.0, 1000.0, 2000.0, 4000.0));
        let scene = mapper.render();
        assert_eq!((scene.width, scene.height), (800, 800));
        assert_eq!(scene.count(crate::scene::Layer::Background), 1);
        assert_eq!(scene.count(crate::scene::Layer::Cone), 1);
        assert_eq!(scene.count(crate::scene::Layer::Zones), 1);
        assert_eq!(scene.count(crate::scene::Layer::GridLabels), 0);
    }
}
