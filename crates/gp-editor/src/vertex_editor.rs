//! Vertex editing state machine
//!
//! Drives placement and editing of one polyline or polygon. Every shape
//! editor owns one [`VertexEditor`] and forwards pointer and keyboard
//! input to it.
//!
//! ```text
//!              begin_editing(None)            click near first vertex
//!  Inactive ───────────────────────▶ PlaceVertex ───────────────────────▶ EditVertex
//!     │                                             (or Enter, open only)     │
//!     └──────────────────── begin_editing(Some(vertices)) ────────────────────┘
//! ```
//!
//! `commit` and `cancel` return to `Inactive` from any active state.

use glam::Vec3;
use gp_core::constants::{MIN_CLOSED_VERTICES, MIN_OPEN_VERTICES};
use gp_core::{
    ShapeKind, SharedSnapper, Snapper, angle_between, centroid, north_vector, polygon_area,
    segment_midpoint,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::{CreateObject, DeleteVertex, InsertVertex, SceneHistory, SetPosition};
use crate::context::EditorContext;
use crate::event::{EventBus, SessionEvent};
use crate::scene::{ObjectKind, Scene, SceneObject};

/// Result of a pointer ray-cast against the scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Object under the pointer, if any
    pub object: Option<Uuid>,
    /// World point under the pointer, if the ray hit anything
    pub point: Option<Vec3>,
}

impl Hit {
    /// A hit on empty ground
    pub fn ground(point: Vec3) -> Self {
        Self {
            object: None,
            point: Some(point),
        }
    }

    /// A hit on a scene object
    pub fn object(id: Uuid, point: Vec3) -> Self {
        Self {
            object: Some(id),
            point: Some(point),
        }
    }

    /// The ray hit nothing
    pub fn miss() -> Self {
        Self::default()
    }
}

/// Keys the editors react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Escape,
    Delete,
    Backspace,
    Char(char),
}

/// A key press with modifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub ctrl: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self { key, ctrl: false }
    }

    /// Key pressed with Ctrl held
    pub fn ctrl(key: Key) -> Self {
        Self { key, ctrl: true }
    }

    /// Check if this is the undo shortcut (Ctrl+Z)
    pub fn is_undo(&self) -> bool {
        self.ctrl && matches!(self.key, Key::Char('z') | Key::Char('Z'))
    }
}

/// Pointer cursor the host should display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
}

/// Externally visible mode of a vertex editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexEditorMode {
    Inactive,
    PlaceVertex,
    EditVertex,
}

/// Rubber-band visuals following the pointer during placement
#[derive(Debug, Clone, Copy)]
struct PlacementPreview {
    segment: Uuid,
    angle_label: Uuid,
    distance_label: Uuid,
}

/// State while vertices are being placed one click at a time
#[derive(Debug, Default)]
struct PlacementState {
    vertices: Vec<Vec3>,
    /// Start marker and segments, one entry per undoable placement
    commands: SceneHistory,
    preview: Option<PlacementPreview>,
    last_pointer: Option<Vec3>,
}

/// State while existing handles are dragged, inserted and deleted
#[derive(Debug)]
struct EditState {
    outline: Uuid,
    selected: Option<Uuid>,
    /// Segments, length labels and fill, rebuilt on every redraw
    visuals: Vec<Uuid>,
    session: SceneHistory,
}

#[derive(Debug, Default)]
enum VertexEditorState {
    #[default]
    Inactive,
    PlaceVertex(PlacementState),
    EditVertex(EditState),
}

/// Follow-up work decided while the state is borrowed
enum Transition {
    None,
    EnterEditMode(Vec<Vec3>),
}

/// Places and edits the vertices of a single outline
#[derive(Debug)]
pub struct VertexEditor {
    kind: ShapeKind,
    closed_loop: bool,
    snapper: SharedSnapper,
    events: EventBus,
    close_threshold: f32,
    ground_height: f32,
    north_angle: f32,
    cursor: Cursor,
    state: VertexEditorState,
}

impl VertexEditor {
    /// Create an inactive editor
    ///
    /// `kind` only labels the events this editor emits.
    pub fn new(kind: ShapeKind, closed_loop: bool, context: &EditorContext) -> Self {
        Self {
            kind,
            closed_loop,
            snapper: context.snapper.clone(),
            events: context.events.clone(),
            close_threshold: context.config.close_threshold,
            ground_height: context.config.ground_height,
            north_angle: context.config.north_angle,
            cursor: Cursor::Default,
            state: VertexEditorState::Inactive,
        }
    }

    // ============== Accessors ==============

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn is_closed_loop(&self) -> bool {
        self.closed_loop
    }

    pub fn mode(&self) -> VertexEditorMode {
        match self.state {
            VertexEditorState::Inactive => VertexEditorMode::Inactive,
            VertexEditorState::PlaceVertex(_) => VertexEditorMode::PlaceVertex,
            VertexEditorState::EditVertex(_) => VertexEditorMode::EditVertex,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, VertexEditorState::Inactive)
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Fewest vertices the outline may have
    pub fn min_vertices(&self) -> usize {
        if self.closed_loop {
            MIN_CLOSED_VERTICES
        } else {
            MIN_OPEN_VERTICES
        }
    }

    /// Currently selected handle in edit mode
    pub fn selected_handle(&self) -> Option<Uuid> {
        match &self.state {
            VertexEditorState::EditVertex(edit) => edit.selected,
            _ => None,
        }
    }

    /// Ordered handle ids in edit mode
    pub fn handles(&self, scene: &dyn Scene) -> Vec<Uuid> {
        match &self.state {
            VertexEditorState::EditVertex(edit) => edit.handles(scene),
            _ => Vec::new(),
        }
    }

    /// Outline object in edit mode
    pub fn outline(&self) -> Option<Uuid> {
        match &self.state {
            VertexEditorState::EditVertex(edit) => Some(edit.outline),
            _ => None,
        }
    }

    /// Current vertex positions, in order
    pub fn vertices(&self, scene: &dyn Scene) -> Vec<Vec3> {
        match &self.state {
            VertexEditorState::Inactive => Vec::new(),
            VertexEditorState::PlaceVertex(place) => place.vertices.clone(),
            VertexEditorState::EditVertex(edit) => edit.positions(scene),
        }
    }

    /// Enclosed area of the current vertices, `None` when inactive
    pub fn polygon_area(&self, scene: &dyn Scene) -> Option<f32> {
        self.is_active()
            .then(|| polygon_area(&self.vertices(scene)))
    }

    /// Mean of the current vertices, `None` when inactive
    pub fn centroid(&self, scene: &dyn Scene) -> Option<Vec3> {
        self.is_active().then(|| centroid(&self.vertices(scene)))
    }

    /// Number of undoable steps in the current mode
    pub fn undo_depth(&self) -> usize {
        match &self.state {
            VertexEditorState::Inactive => 0,
            VertexEditorState::PlaceVertex(place) => place.commands.len(),
            VertexEditorState::EditVertex(edit) => edit.session.len(),
        }
    }

    // ============== Lifecycle ==============

    /// Start a session
    ///
    /// Without vertices the editor waits for placement clicks. With
    /// vertices it goes straight to edit mode with one handle per point.
    pub fn begin_editing(&mut self, scene: &mut (dyn Scene + 'static), existing: Option<&[Vec3]>) {
        self.clean_up(scene);

        match existing {
            Some(vertices) if vertices.len() >= self.min_vertices() => {
                tracing::info!(
                    "{} vertex editing started with {} vertices",
                    self.kind,
                    vertices.len()
                );
                self.enter_edit_mode(scene, vertices.to_vec());
            }
            Some(vertices) if !vertices.is_empty() => {
                tracing::warn!(
                    "Cannot edit {} with {} vertices, starting placement instead",
                    self.kind,
                    vertices.len()
                );
                self.enter_place_mode();
            }
            _ => {
                tracing::info!("{} vertex placement started", self.kind);
                self.enter_place_mode();
            }
        }
    }

    /// Finish editing and hand back the ordered vertices
    ///
    /// Only valid in edit mode. The session history is dropped, not undone.
    pub fn commit(&mut self, scene: &mut (dyn Scene + 'static)) -> Option<Vec<Vec3>> {
        let VertexEditorState::EditVertex(edit) = &mut self.state else {
            tracing::debug!("commit ignored: {} editor is not editing", self.kind);
            return None;
        };

        let vertices = edit.positions(scene);
        edit.session.forget();
        self.teardown(scene);
        tracing::info!("{} vertex editing finished with {} vertices", self.kind, vertices.len());
        self.events.emit(SessionEvent::VertexEditingFinished(self.kind));
        Some(vertices)
    }

    /// Discard the session, restoring everything it touched
    ///
    /// Safe in any state, including before the first vertex is placed.
    pub fn cancel(&mut self, scene: &mut (dyn Scene + 'static)) {
        let was_active = self.is_active();
        self.clean_up(scene);
        if was_active {
            tracing::info!("{} vertex editing cancelled", self.kind);
            self.events.emit(SessionEvent::EditingCancelled(self.kind));
        }
    }

    /// Remove all session visuals without emitting events
    pub fn clean_up(&mut self, scene: &mut (dyn Scene + 'static)) {
        match &mut self.state {
            VertexEditorState::PlaceVertex(place) => place.commands.clear(scene),
            VertexEditorState::EditVertex(edit) => edit.session.clear(scene),
            VertexEditorState::Inactive => {}
        }
        self.teardown(scene);
    }

    fn teardown(&mut self, scene: &mut (dyn Scene + 'static)) {
        match std::mem::take(&mut self.state) {
            VertexEditorState::Inactive => {}
            VertexEditorState::PlaceVertex(mut place) => {
                place.commands.clear(scene);
                place.remove_preview(scene);
            }
            VertexEditorState::EditVertex(edit) => {
                if edit.selected.is_some() {
                    scene.deselect();
                }
                for id in edit.visuals.iter().copied().chain(edit.handles(scene)) {
                    scene.remove(id);
                }
                scene.remove(edit.outline);
            }
        }
        self.cursor = Cursor::Default;
        scene.request_render();
    }

    fn enter_place_mode(&mut self) {
        self.state = VertexEditorState::PlaceVertex(PlacementState::default());
        self.cursor = Cursor::Crosshair;
    }

    fn enter_edit_mode(&mut self, scene: &mut (dyn Scene + 'static), vertices: Vec<Vec3>) {
        // Placement visuals are rebuilt as handles
        self.teardown(scene);

        let handles: Vec<Uuid> = vertices
            .into_iter()
            .map(|p| {
                let handle = SceneObject::vertex_handle(p);
                let id = handle.id;
                scene.add(handle);
                id
            })
            .collect();
        let outline = SceneObject::outline(handles, self.closed_loop);
        let outline_id = outline.id;
        scene.add(outline);

        let mut edit = EditState {
            outline: outline_id,
            selected: None,
            visuals: Vec::new(),
            session: SceneHistory::new(),
        };
        edit.redraw(scene, self.closed_loop, &self.snapper.read());
        self.state = VertexEditorState::EditVertex(edit);
        self.cursor = Cursor::Default;
        self.events.emit(SessionEvent::VertexEditingStarted(self.kind));
    }

    // ============== Input ==============

    /// React to the pointer moving over the scene
    ///
    /// Idempotent: repeating a move to the same point changes nothing.
    pub fn handle_mouse_move(&mut self, scene: &mut (dyn Scene + 'static), hit: Hit) {
        let Some(point) = hit.point else {
            return;
        };
        let snapper = self.snapper.read();
        let point = snapper.snap(point);

        match &mut self.state {
            VertexEditorState::Inactive => {}
            VertexEditorState::PlaceVertex(place) => {
                place.last_pointer = Some(point);
                place.update_preview(scene, point, &snapper, self.north_angle);
            }
            VertexEditorState::EditVertex(edit) => {
                let point = Vec3::new(point.x, self.ground_height, point.z);
                self.cursor = Cursor::Default;

                let Some(selected) = edit.selected else {
                    if hit.object.is_some_and(|id| edit.is_segment(&*scene, id)) {
                        self.cursor = Cursor::Crosshair;
                    }
                    return;
                };
                let Some(handle) = scene.object(selected) else {
                    return;
                };
                if handle.position == point {
                    return;
                }

                let command = SetPosition::new(handle, point);
                edit.session.execute(command, scene);
                edit.redraw(scene, self.closed_loop, &snapper);
                tracing::trace!("Moved handle {} to {}", selected, point);
                self.events.emit(SessionEvent::VertexEditingUpdated(self.kind));
            }
        }
    }

    /// React to a click on the scene
    pub fn handle_mouse_click(&mut self, scene: &mut (dyn Scene + 'static), hit: Hit) {
        let Some(point) = hit.point else {
            return;
        };
        let point = self.snapper.read().snap(point);

        let transition = match self.mode() {
            VertexEditorMode::Inactive => Transition::None,
            VertexEditorMode::PlaceVertex => self.place_click(scene, point),
            VertexEditorMode::EditVertex => {
                self.edit_click(scene, hit.object, point);
                Transition::None
            }
        };

        if let Transition::EnterEditMode(vertices) = transition {
            self.enter_edit_mode(scene, vertices);
        }
    }

    fn place_click(&mut self, scene: &mut (dyn Scene + 'static), point: Vec3) -> Transition {
        let closed_loop = self.closed_loop;
        let close_threshold = self.close_threshold;
        let VertexEditorState::PlaceVertex(place) = &mut self.state else {
            return Transition::None;
        };

        if closed_loop {
            if let Some(first) = place.vertices.first() {
                if first.distance(point) < close_threshold {
                    if place.vertices.len() >= MIN_CLOSED_VERTICES {
                        tracing::debug!("Loop closed with {} vertices", place.vertices.len());
                        return Transition::EnterEditMode(place.vertices.clone());
                    }
                    tracing::debug!("Too few vertices to close the loop");
                    return Transition::None;
                }
            }
        }

        place.vertices.push(point);
        let count = place.vertices.len();

        if closed_loop && count == 1 {
            let marker = SceneObject::start_marker(point);
            place.commands.execute(CreateObject::new(marker), scene);
        }
        if count >= 2 {
            let start = place.vertices[count - 2];
            let segment = SceneObject::segment(start, point, count - 2);
            place.commands.execute(CreateObject::new(segment), scene);
        }

        // The next pointer move redraws the rubber band from the new vertex
        place.remove_preview(scene);
        Transition::None
    }

    fn edit_click(&mut self, scene: &mut (dyn Scene + 'static), object: Option<Uuid>, point: Vec3) {
        let closed_loop = self.closed_loop;
        let ground_height = self.ground_height;
        let VertexEditorState::EditVertex(edit) = &mut self.state else {
            return;
        };

        if edit.selected.take().is_some() {
            scene.deselect();
            return;
        }

        let Some(id) = object else {
            return;
        };

        let segment = edit
            .is_segment(&*scene, id)
            .then(|| scene.object(id).and_then(|o| o.segment_index()))
            .flatten();
        if let Some(index) = segment {
            let position = Vec3::new(point.x, ground_height, point.z);
            let insert = InsertVertex::new(edit.outline, index + 1, position);
            tracing::debug!("Inserting vertex after index {}", index);
            edit.session.execute(insert, scene);
            edit.redraw(scene, closed_loop, &self.snapper.read());
            self.events.emit(SessionEvent::VertexEditingUpdated(self.kind));
        } else if edit.handles(scene).contains(&id) {
            edit.selected = Some(id);
            scene.select(id);
        }
    }

    /// React to a key press
    ///
    /// Returns true if the key was handled.
    pub fn handle_key_down(&mut self, scene: &mut (dyn Scene + 'static), event: KeyEvent) -> bool {
        if event.is_undo() {
            self.undo(scene);
            return true;
        }

        match event.key {
            Key::Enter => {
                let finished = match &self.state {
                    VertexEditorState::PlaceVertex(place)
                        if !self.closed_loop && place.vertices.len() >= MIN_OPEN_VERTICES =>
                    {
                        Some(place.vertices.clone())
                    }
                    _ => None,
                };
                if let Some(vertices) = finished {
                    self.enter_edit_mode(scene, vertices);
                }
                self.deselect(scene);
                true
            }
            Key::Escape => {
                self.deselect(scene);
                true
            }
            Key::Delete | Key::Backspace => self.delete_selected(scene),
            Key::Char(_) => false,
        }
    }

    fn deselect(&mut self, scene: &mut (dyn Scene + 'static)) {
        if let VertexEditorState::EditVertex(edit) = &mut self.state {
            if edit.selected.take().is_some() {
                scene.deselect();
            }
        }
    }

    /// Delete the selected handle unless the outline is at its minimum
    fn delete_selected(&mut self, scene: &mut (dyn Scene + 'static)) -> bool {
        let min_vertices = self.min_vertices();
        let VertexEditorState::EditVertex(edit) = &mut self.state else {
            return false;
        };
        let Some(selected) = edit.selected else {
            return false;
        };

        let count = edit.handles(scene).len();
        if count <= min_vertices {
            tracing::debug!("Refusing to delete: outline has {} vertices", count);
            return true;
        }
        let Some(delete) = DeleteVertex::new(scene, edit.outline, selected) else {
            return false;
        };

        edit.session.execute(delete, scene);
        edit.selected = None;
        edit.redraw(scene, self.closed_loop, &self.snapper.read());
        self.events.emit(SessionEvent::VertexEditingUpdated(self.kind));
        true
    }

    /// Rebuild labels after the snapper's units change
    pub fn refresh(&mut self, scene: &mut (dyn Scene + 'static)) {
        let snapper = self.snapper.read();
        match &mut self.state {
            VertexEditorState::Inactive => {}
            VertexEditorState::PlaceVertex(place) => {
                if let Some(pointer) = place.last_pointer {
                    place.update_preview(scene, pointer, &snapper, self.north_angle);
                }
            }
            VertexEditorState::EditVertex(edit) => {
                edit.redraw(scene, self.closed_loop, &snapper);
            }
        }
    }

    /// Step back once within the current mode
    ///
    /// In placement this removes the last vertex; in edit mode it reverts
    /// the last move, insertion or deletion.
    pub fn undo(&mut self, scene: &mut (dyn Scene + 'static)) {
        let snapper = self.snapper.read();
        match &mut self.state {
            VertexEditorState::Inactive => {}
            VertexEditorState::PlaceVertex(place) => {
                if place.vertices.pop().is_none() {
                    return;
                }
                place.commands.undo(scene);
                match place.last_pointer {
                    Some(pointer) => {
                        place.update_preview(scene, pointer, &snapper, self.north_angle)
                    }
                    None => place.remove_preview(scene),
                }
            }
            VertexEditorState::EditVertex(edit) => {
                if !edit.session.undo(scene) {
                    return;
                }
                if let Some(selected) = edit.selected {
                    if !edit.handles(scene).contains(&selected) {
                        edit.selected = None;
                        scene.deselect();
                    }
                }
                edit.redraw(scene, self.closed_loop, &snapper);
                self.events.emit(SessionEvent::VertexEditingUpdated(self.kind));
            }
        }
    }
}

impl PlacementState {
    fn remove_preview(&mut self, scene: &mut (dyn Scene + 'static)) {
        if let Some(preview) = self.preview.take() {
            scene.remove(preview.segment);
            scene.remove(preview.angle_label);
            scene.remove(preview.distance_label);
        }
    }

    /// Draw the rubber band from the last vertex to `point`
    fn update_preview(
        &mut self,
        scene: &mut (dyn Scene + 'static),
        point: Vec3,
        snapper: &Snapper,
        north: f32,
    ) {
        let Some(&last) = self.vertices.last() else {
            self.remove_preview(scene);
            return;
        };

        let direction = point - last;
        let reference = match self.vertices.len() {
            0 | 1 => north_vector(north),
            n => last - self.vertices[n - 2],
        };
        let angle_text = format!("{:.2}°", angle_between(direction, reference));
        let distance_text = snapper.format_distance(direction.length());
        let midpoint = segment_midpoint(last, point);

        let preview = match self.preview {
            Some(preview) => preview,
            None => {
                let segment = SceneObject::preview_segment(last, point);
                let angle = SceneObject::label(angle_text, midpoint);
                let distance = SceneObject::label(distance_text, midpoint);
                let preview = PlacementPreview {
                    segment: segment.id,
                    angle_label: angle.id,
                    distance_label: distance.id,
                };
                scene.add(segment);
                scene.add(angle);
                scene.add(distance);
                self.preview = Some(preview);
                return;
            }
        };

        let mut changed = false;
        if let Some(object) = scene.object_mut(preview.segment) {
            let kind = ObjectKind::PreviewSegment { start: last, end: point };
            if object.kind != kind {
                object.kind = kind;
                object.position = last;
                changed = true;
            }
        }
        for (id, text) in [
            (preview.angle_label, angle_text),
            (preview.distance_label, distance_text),
        ] {
            if let Some(object) = scene.object_mut(id) {
                let kind = ObjectKind::Label { text };
                if object.kind != kind || object.position != midpoint {
                    object.kind = kind;
                    object.position = midpoint;
                    changed = true;
                }
            }
        }
        if changed {
            scene.request_render();
        }
    }
}

impl EditState {
    fn handles(&self, scene: &dyn Scene) -> Vec<Uuid> {
        scene
            .object(self.outline)
            .and_then(|o| o.outline_handles())
            .map(<[Uuid]>::to_vec)
            .unwrap_or_default()
    }

    fn positions(&self, scene: &dyn Scene) -> Vec<Vec3> {
        self.handles(scene)
            .into_iter()
            .filter_map(|id| scene.object(id).map(|o| o.position))
            .collect()
    }

    fn is_segment(&self, scene: &dyn Scene, id: Uuid) -> bool {
        self.visuals.contains(&id) && scene.object(id).is_some_and(|o| o.segment_index().is_some())
    }

    /// Rebuild segments, length labels and the fill from handle positions
    fn redraw(&mut self, scene: &mut (dyn Scene + 'static), closed_loop: bool, snapper: &Snapper) {
        for id in self.visuals.drain(..) {
            scene.remove(id);
        }

        let points = self.positions(scene);
        let n = points.len();
        let edges = match (closed_loop, n) {
            (_, 0 | 1) => 0,
            (true, 2) => 1,
            (true, n) => n,
            (false, n) => n - 1,
        };

        let mut visuals = Vec::with_capacity(edges * 2 + 1);
        for i in 0..edges {
            let a = points[i];
            let b = points[(i + 1) % n];
            visuals.push(SceneObject::segment(a, b, i));
            visuals.push(SceneObject::label(
                snapper.format_distance(a.distance(b)),
                segment_midpoint(a, b),
            ));
        }
        if closed_loop && n >= MIN_CLOSED_VERTICES {
            visuals.push(SceneObject::fill(points));
        }

        for object in visuals {
            self.visuals.push(object.id);
            scene.add(object);
        }
        scene.request_render();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;
    use approx::assert_relative_eq;

    fn ground(x: f32, z: f32) -> Hit {
        Hit::ground(Vec3::new(x, 0.0, z))
    }

    fn bed_editor() -> (VertexEditor, EditorContext) {
        let context = EditorContext::default();
        (VertexEditor::new(ShapeKind::Bed, true, &context), context)
    }

    fn place_square(editor: &mut VertexEditor, scene: &mut SceneGraph) {
        editor.begin_editing(scene, None);
        for (x, z) in [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)] {
            editor.handle_mouse_click(scene, ground(x, z));
        }
    }

    fn count_kind(scene: &SceneGraph, f: impl Fn(&ObjectKind) -> bool) -> usize {
        scene.count(|o| f(&o.kind))
    }

    #[test]
    fn test_begin_without_vertices_places() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        assert_eq!(editor.mode(), VertexEditorMode::Inactive);
        assert_eq!(editor.polygon_area(&scene), None);

        editor.begin_editing(&mut scene, None);
        assert_eq!(editor.mode(), VertexEditorMode::PlaceVertex);
        assert_eq!(editor.cursor(), Cursor::Crosshair);
        assert_eq!(editor.polygon_area(&scene), Some(0.0));
    }

    #[test]
    fn test_loop_closing() {
        let (mut editor, context) = bed_editor();
        let mut scene = SceneGraph::new();
        place_square(&mut editor, &mut scene);

        assert_eq!(count_kind(&scene, |k| matches!(k, ObjectKind::StartMarker)), 1);
        assert_eq!(count_kind(&scene, |k| matches!(k, ObjectKind::Segment { .. })), 3);

        editor.handle_mouse_click(&mut scene, ground(0.01, 0.02));
        assert_eq!(editor.mode(), VertexEditorMode::EditVertex);
        assert_eq!(editor.handles(&scene).len(), 4, "no duplicated closing vertex");
        assert_eq!(count_kind(&scene, |k| matches!(k, ObjectKind::VertexHandle)), 4);
        assert_eq!(count_kind(&scene, |k| matches!(k, ObjectKind::StartMarker)), 0);
        assert_eq!(count_kind(&scene, |k| matches!(k, ObjectKind::Segment { .. })), 4);
        assert_eq!(count_kind(&scene, |k| matches!(k, ObjectKind::Fill { .. })), 1);
        assert_relative_eq!(editor.polygon_area(&scene).unwrap(), 4.0);

        let events = context.events.drain();
        assert!(events.contains(&SessionEvent::VertexEditingStarted(ShapeKind::Bed)));
    }

    #[test]
    fn test_closing_needs_three_vertices() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        editor.begin_editing(&mut scene, None);
        editor.handle_mouse_click(&mut scene, ground(0.0, 0.0));
        editor.handle_mouse_click(&mut scene, ground(1.0, 0.0));
        editor.handle_mouse_click(&mut scene, ground(0.0, 0.0));

        assert_eq!(editor.mode(), VertexEditorMode::PlaceVertex);
        assert_eq!(editor.vertices(&scene).len(), 2);
    }

    #[test]
    fn test_minimum_vertex_guard() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        let triangle = [Vec3::ZERO, Vec3::X, Vec3::Z];
        editor.begin_editing(&mut scene, Some(&triangle));

        let handle = editor.handles(&scene)[1];
        editor.handle_mouse_click(&mut scene, Hit::object(handle, Vec3::X));
        assert_eq!(editor.selected_handle(), Some(handle));

        assert!(editor.handle_key_down(&mut scene, KeyEvent::new(Key::Delete)));
        assert_eq!(editor.handles(&scene).len(), 3);
        assert!(scene.contains(handle));
        assert_eq!(editor.undo_depth(), 0);
    }

    #[test]
    fn test_delete_and_undo_in_edit_mode() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        place_square(&mut editor, &mut scene);
        editor.handle_mouse_click(&mut scene, ground(0.0, 0.0));

        let handle = editor.handles(&scene)[2];
        editor.handle_mouse_click(&mut scene, Hit::object(handle, Vec3::new(2.0, 0.0, 2.0)));
        editor.handle_key_down(&mut scene, KeyEvent::new(Key::Delete));
        assert_eq!(editor.handles(&scene).len(), 3);
        assert!(!scene.contains(handle));
        assert_relative_eq!(editor.polygon_area(&scene).unwrap(), 2.0);

        editor.handle_key_down(&mut scene, KeyEvent::ctrl(Key::Char('z')));
        assert_eq!(editor.handles(&scene)[2], handle);
        assert_relative_eq!(editor.polygon_area(&scene).unwrap(), 4.0);
    }

    #[test]
    fn test_drag_is_one_undo_step() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        let square = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        editor.begin_editing(&mut scene, Some(&square));
        let handle = editor.handles(&scene)[2];
        editor.handle_mouse_click(&mut scene, Hit::object(handle, square[2]));

        for step in 1..=5 {
            let x = 1.0 + step as f32 * 0.2;
            editor.handle_mouse_move(&mut scene, Hit::object(handle, Vec3::new(x, 0.3, 1.0)));
        }
        let moved = scene.object(handle).unwrap().position;
        assert_relative_eq!(moved.x, 2.0, epsilon = 1e-5);
        assert_eq!(moved.y, 0.0, "drags stay on the ground plane");
        assert_eq!(editor.undo_depth(), 1);

        editor.undo(&mut scene);
        assert_eq!(scene.object(handle).unwrap().position, square[2]);
    }

    #[test]
    fn test_pointer_move_is_idempotent() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        editor.begin_editing(&mut scene, None);
        editor.handle_mouse_click(&mut scene, ground(0.0, 0.0));

        editor.handle_mouse_move(&mut scene, ground(1.0, 0.0));
        let objects = scene.len();
        scene.take_render_request();
        editor.handle_mouse_move(&mut scene, ground(1.0, 0.0));
        editor.handle_mouse_move(&mut scene, ground(1.02, 0.01));
        assert_eq!(scene.len(), objects);
        assert!(!scene.needs_render(), "unchanged snapped point redraws nothing");
        assert_eq!(editor.undo_depth(), 1);
    }

    #[test]
    fn test_preview_labels() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        editor.begin_editing(&mut scene, None);
        editor.handle_mouse_click(&mut scene, ground(0.0, 0.0));
        editor.handle_mouse_move(&mut scene, ground(1.0, 0.0));

        let labels: Vec<String> = scene
            .objects()
            .filter_map(|o| match &o.kind {
                ObjectKind::Label { text } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert!(labels.contains(&"90.00°".to_string()), "angle to north: {:?}", labels);
        assert!(labels.contains(&"1.00m".to_string()));
    }

    #[test]
    fn test_refresh_relabels_after_unit_change() {
        let (mut editor, context) = bed_editor();
        let mut scene = SceneGraph::new();
        let square = [Vec3::ZERO, Vec3::X * 2.0, Vec3::new(2.0, 0.0, 2.0), Vec3::Z * 2.0];
        editor.begin_editing(&mut scene, Some(&square));

        let labels = |scene: &SceneGraph| -> Vec<String> {
            scene
                .objects()
                .filter_map(|o| match &o.kind {
                    ObjectKind::Label { text } => Some(text.clone()),
                    _ => None,
                })
                .collect()
        };
        assert!(labels(&scene).iter().all(|l| l == "2.00m"));

        context.snapper.write().set_metric(false);
        editor.refresh(&mut scene);
        let relabelled = labels(&scene);
        assert_eq!(relabelled.len(), 4);
        assert!(relabelled.iter().all(|l| l == "78.74\""), "labels: {:?}", relabelled);
        assert_eq!(editor.handles(&scene).len(), 4);
    }

    #[test]
    fn test_placement_undo() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        place_square(&mut editor, &mut scene);
        assert_eq!(editor.undo_depth(), 4);

        editor.undo(&mut scene);
        assert_eq!(editor.vertices(&scene).len(), 3);
        assert_eq!(count_kind(&scene, |k| matches!(k, ObjectKind::Segment { .. })), 2);

        for _ in 0..3 {
            editor.undo(&mut scene);
        }
        assert!(editor.vertices(&scene).is_empty());
        assert_eq!(count_kind(&scene, |k| matches!(k, ObjectKind::StartMarker)), 0);

        editor.undo(&mut scene);
        assert_eq!(editor.mode(), VertexEditorMode::PlaceVertex);
    }

    #[test]
    fn test_insert_vertex_on_segment_is_undoable() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        place_square(&mut editor, &mut scene);
        editor.handle_mouse_click(&mut scene, ground(0.0, 0.0));

        let segment = scene
            .objects()
            .find(|o| o.segment_index() == Some(0))
            .map(|o| o.id)
            .unwrap();
        editor.handle_mouse_click(&mut scene, Hit::object(segment, Vec3::new(1.0, 0.0, 0.0)));

        let vertices = editor.vertices(&scene);
        assert_eq!(vertices.len(), 5);
        assert_eq!(vertices[1], Vec3::new(1.0, 0.0, 0.0));

        editor.undo(&mut scene);
        assert_eq!(editor.vertices(&scene).len(), 4);
    }

    #[test]
    fn test_click_toggles_selection() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        editor.begin_editing(&mut scene, Some(&[Vec3::ZERO, Vec3::X, Vec3::Z]));
        let handle = editor.handles(&scene)[0];

        editor.handle_mouse_click(&mut scene, Hit::object(handle, Vec3::ZERO));
        assert_eq!(scene.selected(), Some(handle));
        editor.handle_mouse_click(&mut scene, ground(5.0, 5.0));
        assert_eq!(editor.selected_handle(), None);
        assert_eq!(scene.selected(), None);

        editor.handle_mouse_click(&mut scene, Hit::object(handle, Vec3::ZERO));
        editor.handle_key_down(&mut scene, KeyEvent::new(Key::Escape));
        assert_eq!(editor.selected_handle(), None);
    }

    #[test]
    fn test_enter_finishes_open_polyline() {
        let context = EditorContext::default();
        let mut editor = VertexEditor::new(ShapeKind::Fence, false, &context);
        let mut scene = SceneGraph::new();
        editor.begin_editing(&mut scene, None);
        editor.handle_mouse_click(&mut scene, ground(0.0, 0.0));

        editor.handle_key_down(&mut scene, KeyEvent::new(Key::Enter));
        assert_eq!(editor.mode(), VertexEditorMode::PlaceVertex, "one vertex is not a line");

        editor.handle_mouse_click(&mut scene, ground(0.0, 3.0));
        editor.handle_key_down(&mut scene, KeyEvent::new(Key::Enter));
        assert_eq!(editor.mode(), VertexEditorMode::EditVertex);
        assert_eq!(count_kind(&scene, |k| matches!(k, ObjectKind::Segment { .. })), 1);
        assert_eq!(count_kind(&scene, |k| matches!(k, ObjectKind::Fill { .. })), 0);
    }

    #[test]
    fn test_cancel_before_placement() {
        let (mut editor, context) = bed_editor();
        let mut scene = SceneGraph::new();
        editor.cancel(&mut scene);
        assert!(context.events.is_empty());

        editor.begin_editing(&mut scene, None);
        editor.cancel(&mut scene);
        assert!(scene.is_empty());
        assert_eq!(editor.mode(), VertexEditorMode::Inactive);
        assert_eq!(
            context.events.drain(),
            vec![SessionEvent::EditingCancelled(ShapeKind::Bed)]
        );
    }

    #[test]
    fn test_cancel_restores_scene() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        place_square(&mut editor, &mut scene);
        editor.handle_mouse_move(&mut scene, ground(1.0, 1.0));
        editor.cancel(&mut scene);
        assert!(scene.is_empty());

        place_square(&mut editor, &mut scene);
        editor.handle_mouse_click(&mut scene, ground(0.0, 0.0));
        editor.cancel(&mut scene);
        assert!(scene.is_empty());
        assert_eq!(editor.cursor(), Cursor::Default);
    }

    #[test]
    fn test_commit_returns_vertices() {
        let (mut editor, context) = bed_editor();
        let mut scene = SceneGraph::new();
        assert!(editor.commit(&mut scene).is_none());

        place_square(&mut editor, &mut scene);
        assert!(editor.commit(&mut scene).is_none(), "placement cannot commit");
        editor.handle_mouse_click(&mut scene, ground(0.0, 0.0));

        let vertices = editor.commit(&mut scene).unwrap();
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[2], Vec3::new(2.0, 0.0, 2.0));
        assert!(scene.is_empty());
        assert!(context
            .events
            .drain()
            .contains(&SessionEvent::VertexEditingFinished(ShapeKind::Bed)));
    }

    #[test]
    fn test_clicks_snap_to_grid() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        editor.begin_editing(&mut scene, None);
        editor.handle_mouse_click(&mut scene, Hit::ground(Vec3::new(0.34, 0.0, 0.27)));
        let v = editor.vertices(&scene)[0];
        assert_relative_eq!(v.x, 0.3, epsilon = 1e-6);
        assert_relative_eq!(v.z, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_miss_is_ignored() {
        let (mut editor, _) = bed_editor();
        let mut scene = SceneGraph::new();
        editor.begin_editing(&mut scene, None);
        editor.handle_mouse_click(&mut scene, Hit::miss());
        editor.handle_mouse_move(&mut scene, Hit::miss());
        assert!(editor.vertices(&scene).is_empty());
    }
}
