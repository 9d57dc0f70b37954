//! Scene graph seam
//!
//! Editors never own renderable state directly. Every handle, segment,
//! label and finished shape is a [`SceneObject`] stored behind the
//! [`Scene`] trait, so commands can add, remove and mutate objects by id
//! and a renderer can draw whatever the scene contains.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use gp_core::{PropValue, ShapeRecord};
use uuid::Uuid;

use crate::event::{EventBus, SessionEvent};
use crate::mesh::MeshId;

/// What a scene object represents
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// Draggable marker owning one outline vertex
    VertexHandle,
    /// Marker on the first vertex of a closed loop during placement
    StartMarker,
    /// Edge between two consecutive vertices
    Segment {
        start: Vec3,
        end: Vec3,
        /// Index of the first endpoint in the vertex list
        index: usize,
    },
    /// Rubber-band segment following the pointer during placement
    PreviewSegment { start: Vec3, end: Vec3 },
    /// Text anchored at the object position
    Label { text: String },
    /// Translucent fill of a closed outline
    Fill { vertices: Vec<Vec3> },
    /// Ordered handles of the outline being edited
    Outline { handles: Vec<Uuid>, closed: bool },
    /// Shape being configured, drawn with preview materials
    ShapePreview { record: ShapeRecord },
    /// Finished shape with its generated mesh
    Shape { record: ShapeRecord, mesh: MeshId },
}

/// Scalar object fields addressable by [`crate::command::SetValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectField {
    Name,
    CastShadow,
    /// Text of a label object
    LabelText,
}

/// An object in the editor scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: Uuid,
    pub name: String,
    pub kind: ObjectKind,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub visible: bool,
    pub cast_shadow: bool,
}

impl SceneObject {
    /// Create a new object with an identity transform
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            visible: true,
            cast_shadow: false,
        }
    }

    /// Set the position (builder pattern)
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn vertex_handle(position: Vec3) -> Self {
        Self::new("Vertex", ObjectKind::VertexHandle).at(position)
    }

    pub fn start_marker(position: Vec3) -> Self {
        Self::new("Start", ObjectKind::StartMarker).at(position)
    }

    pub fn segment(start: Vec3, end: Vec3, index: usize) -> Self {
        Self::new("Segment", ObjectKind::Segment { start, end, index }).at(start)
    }

    pub fn preview_segment(start: Vec3, end: Vec3) -> Self {
        Self::new("Preview", ObjectKind::PreviewSegment { start, end }).at(start)
    }

    pub fn label(text: impl Into<String>, position: Vec3) -> Self {
        Self::new("Label", ObjectKind::Label { text: text.into() }).at(position)
    }

    pub fn fill(vertices: Vec<Vec3>) -> Self {
        Self::new("Fill", ObjectKind::Fill { vertices })
    }

    pub fn outline(handles: Vec<Uuid>, closed: bool) -> Self {
        Self::new("Outline", ObjectKind::Outline { handles, closed })
    }

    /// Check if this is a vertex handle
    pub fn is_vertex_handle(&self) -> bool {
        matches!(self.kind, ObjectKind::VertexHandle)
    }

    /// Index of the first endpoint, if this is an outline segment
    pub fn segment_index(&self) -> Option<usize> {
        match self.kind {
            ObjectKind::Segment { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Handle ids, if this is an outline
    pub fn outline_handles(&self) -> Option<&[Uuid]> {
        match &self.kind {
            ObjectKind::Outline { handles, .. } => Some(handles),
            _ => None,
        }
    }

    /// Mutable handle ids, if this is an outline
    pub fn outline_handles_mut(&mut self) -> Option<&mut Vec<Uuid>> {
        match &mut self.kind {
            ObjectKind::Outline { handles, .. } => Some(handles),
            _ => None,
        }
    }

    /// Shape record, if this is a finished shape or a preview
    pub fn record(&self) -> Option<&ShapeRecord> {
        match &self.kind {
            ObjectKind::Shape { record, .. } | ObjectKind::ShapePreview { record } => Some(record),
            _ => None,
        }
    }

    /// Read a scalar field
    pub fn value(&self, field: ObjectField) -> Option<PropValue> {
        match (field, &self.kind) {
            (ObjectField::Name, _) => Some(PropValue::Text(self.name.clone())),
            (ObjectField::CastShadow, _) => Some(PropValue::Flag(self.cast_shadow)),
            (ObjectField::LabelText, ObjectKind::Label { text }) => {
                Some(PropValue::Text(text.clone()))
            }
            (ObjectField::LabelText, _) => None,
        }
    }

    /// Write a scalar field, returning false if the value does not fit
    pub fn set_value(&mut self, field: ObjectField, value: &PropValue) -> bool {
        match (field, value, &mut self.kind) {
            (ObjectField::Name, PropValue::Text(name), _) => self.name = name.clone(),
            (ObjectField::CastShadow, PropValue::Flag(flag), _) => self.cast_shadow = *flag,
            (ObjectField::LabelText, PropValue::Text(new), ObjectKind::Label { text }) => {
                *text = new.clone()
            }
            _ => return false,
        }
        true
    }
}

/// Scene-graph operations the editors rely on
pub trait Scene {
    /// Add an object, replacing any object with the same id
    fn add(&mut self, object: SceneObject);

    /// Remove an object, returning it if present
    fn remove(&mut self, id: Uuid) -> Option<SceneObject>;

    /// Get an object by ID
    fn object(&self, id: Uuid) -> Option<&SceneObject>;

    /// Get a mutable object by ID
    fn object_mut(&mut self, id: Uuid) -> Option<&mut SceneObject>;

    /// Currently selected object
    fn selected(&self) -> Option<Uuid>;

    fn select(&mut self, id: Uuid);

    fn deselect(&mut self);

    /// Notify observers that an object was mutated in place
    fn object_changed(&mut self, id: Uuid);

    /// Schedule a redraw for the next frame
    fn request_render(&mut self);

    /// Check if an object exists
    fn contains(&self, id: Uuid) -> bool {
        self.object(id).is_some()
    }
}

/// In-memory scene used by the headless tools and tests
///
/// Renders are coalesced through a dirty flag: any number of mutations
/// within one input event produce a single pending render.
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: HashMap<Uuid, SceneObject>,
    selected: Option<Uuid>,
    render_pending: bool,
    events: Option<EventBus>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scene that reports object changes on `events`
    pub fn with_events(events: EventBus) -> Self {
        Self {
            events: Some(events),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over all objects
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    /// Count objects matching a predicate
    pub fn count(&self, predicate: impl Fn(&SceneObject) -> bool) -> usize {
        self.objects.values().filter(|o| predicate(o)).count()
    }

    /// Finished shapes in the scene
    pub fn shapes(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects
            .values()
            .filter(|o| matches!(o.kind, ObjectKind::Shape { .. }))
    }

    /// Whether a render is pending
    pub fn needs_render(&self) -> bool {
        self.render_pending
    }

    /// Consume the pending render flag
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_pending)
    }
}

impl Scene for SceneGraph {
    fn add(&mut self, object: SceneObject) {
        self.objects.insert(object.id, object);
        self.render_pending = true;
    }

    fn remove(&mut self, id: Uuid) -> Option<SceneObject> {
        let removed = self.objects.remove(&id);
        if removed.is_some() {
            if self.selected == Some(id) {
                self.selected = None;
            }
            self.render_pending = true;
        }
        removed
    }

    fn object(&self, id: Uuid) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    fn object_mut(&mut self, id: Uuid) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    fn select(&mut self, id: Uuid) {
        if self.objects.contains_key(&id) {
            self.selected = Some(id);
            self.render_pending = true;
        }
    }

    fn deselect(&mut self) {
        if self.selected.take().is_some() {
            self.render_pending = true;
        }
    }

    fn object_changed(&mut self, id: Uuid) {
        self.render_pending = true;
        if let Some(events) = &self.events {
            events.emit(SessionEvent::ObjectChanged(id));
        }
    }

    fn request_render(&mut self) {
        self.render_pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_select() {
        let mut scene = SceneGraph::new();
        let handle = SceneObject::vertex_handle(Vec3::X);
        let id = handle.id;

        scene.add(handle);
        assert!(scene.contains(id));
        scene.select(id);
        assert_eq!(scene.selected(), Some(id));

        let removed = scene.remove(id).unwrap();
        assert_eq!(removed.position, Vec3::X);
        assert_eq!(scene.selected(), None, "removing clears selection");
        assert!(scene.remove(id).is_none());
    }

    #[test]
    fn test_select_unknown_is_ignored() {
        let mut scene = SceneGraph::new();
        scene.select(Uuid::new_v4());
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn test_render_requests_coalesce() {
        let mut scene = SceneGraph::new();
        assert!(!scene.take_render_request());

        scene.add(SceneObject::vertex_handle(Vec3::ZERO));
        scene.add(SceneObject::vertex_handle(Vec3::X));
        scene.request_render();

        assert!(scene.take_render_request());
        assert!(!scene.take_render_request(), "flag is consumed once");
    }

    #[test]
    fn test_object_changed_emits_event() {
        let events = EventBus::new();
        let mut scene = SceneGraph::with_events(events.clone());
        let id = Uuid::new_v4();
        scene.object_changed(id);
        assert_eq!(events.drain(), vec![SessionEvent::ObjectChanged(id)]);
    }

    #[test]
    fn test_scalar_fields() {
        let mut label = SceneObject::label("1.00m", Vec3::ZERO);
        assert_eq!(
            label.value(ObjectField::LabelText),
            Some(PropValue::Text("1.00m".into()))
        );
        assert!(label.set_value(ObjectField::LabelText, &PropValue::Text("2.00m".into())));
        assert!(!label.set_value(ObjectField::CastShadow, &PropValue::Number(1.0)));

        let mut handle = SceneObject::vertex_handle(Vec3::ZERO);
        assert_eq!(handle.value(ObjectField::LabelText), None);
        assert!(!handle.set_value(ObjectField::LabelText, &PropValue::Text("x".into())));
    }
}
