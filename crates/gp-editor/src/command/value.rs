use std::any::Any;

use gp_core::PropValue;
use uuid::Uuid;

use super::{Command, CommandKind, downcast};
use crate::scene::{ObjectField, Scene, SceneObject};

/// Assign a scalar field of an object
#[derive(Debug, Clone)]
pub struct SetValue {
    id: Uuid,
    field: ObjectField,
    old_value: PropValue,
    new_value: PropValue,
}

impl SetValue {
    /// Snapshot the current value, or `None` if the object lacks the field
    pub fn new(object: &SceneObject, field: ObjectField, new_value: PropValue) -> Option<Self> {
        let old_value = object.value(field)?;
        Some(Self {
            id: object.id,
            field,
            old_value,
            new_value,
        })
    }

    pub fn field(&self) -> ObjectField {
        self.field
    }

    fn apply(&self, scene: &mut (dyn Scene + 'static), value: &PropValue) {
        let Some(object) = scene.object_mut(self.id) else {
            return;
        };
        if object.set_value(self.field, value) {
            scene.object_changed(self.id);
        } else {
            tracing::warn!("SetValue: {:?} does not accept {:?}", self.field, value);
        }
    }
}

impl Command<dyn Scene> for SetValue {
    fn kind(&self) -> CommandKind {
        CommandKind::SetValue
    }

    fn target(&self) -> Option<Uuid> {
        Some(self.id)
    }

    fn updateable(&self) -> bool {
        true
    }

    fn execute(&mut self, scene: &mut (dyn Scene + 'static)) {
        self.apply(scene, &self.new_value);
    }

    fn undo(&mut self, scene: &mut (dyn Scene + 'static)) {
        self.apply(scene, &self.old_value);
    }

    fn can_merge(&self, other: &dyn Command<dyn Scene>) -> bool {
        self.target().is_some()
            && self.target() == other.target()
            && downcast::<Self, _>(other).is_some_and(|other| other.field == self.field)
    }

    fn merge_into(&mut self, other: &dyn Command<dyn Scene>) {
        if let Some(other) = downcast::<Self, _>(other) {
            self.new_value = other.new_value.clone();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Show or hide an object
#[derive(Debug, Clone)]
pub struct SetVisibility {
    id: Uuid,
    before: bool,
    after: bool,
}

impl SetVisibility {
    pub fn new(object: &SceneObject, visible: bool) -> Self {
        Self {
            id: object.id,
            before: object.visible,
            after: visible,
        }
    }

    fn apply(&self, scene: &mut (dyn Scene + 'static), visible: bool) {
        if let Some(object) = scene.object_mut(self.id) {
            object.visible = visible;
            scene.object_changed(self.id);
        }
    }
}

impl Command<dyn Scene> for SetVisibility {
    fn kind(&self) -> CommandKind {
        CommandKind::SetVisibility
    }

    fn target(&self) -> Option<Uuid> {
        Some(self.id)
    }

    fn updateable(&self) -> bool {
        true
    }

    fn execute(&mut self, scene: &mut (dyn Scene + 'static)) {
        self.apply(scene, self.after);
    }

    fn undo(&mut self, scene: &mut (dyn Scene + 'static)) {
        self.apply(scene, self.before);
    }

    fn merge_into(&mut self, other: &dyn Command<dyn Scene>) {
        if let Some(other) = downcast::<Self, _>(other) {
            self.after = other.after;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::SceneHistory;
    use crate::scene::SceneGraph;
    use glam::Vec3;

    #[test]
    fn test_set_value_merges_only_same_field() {
        let mut scene = SceneGraph::new();
        let obj = SceneObject::vertex_handle(Vec3::ZERO);
        let id = obj.id;
        scene.add(obj);
        let mut history = SceneHistory::new();

        for name in ["A", "Ab", "Abc"] {
            let cmd = SetValue::new(scene.object(id).unwrap(), ObjectField::Name, name.into());
            history.execute(cmd.unwrap(), &mut scene);
        }
        assert_eq!(history.len(), 1);

        let cmd = SetValue::new(scene.object(id).unwrap(), ObjectField::CastShadow, true.into());
        history.execute(cmd.unwrap(), &mut scene);
        assert_eq!(history.len(), 2);
        assert_eq!(scene.object(id).unwrap().name, "Abc");

        history.clear(&mut scene);
        let obj = scene.object(id).unwrap();
        assert_eq!(obj.name, "Vertex");
        assert!(!obj.cast_shadow);
    }

    #[test]
    fn test_set_value_needs_field() {
        let handle = SceneObject::vertex_handle(Vec3::ZERO);
        assert!(SetValue::new(&handle, ObjectField::LabelText, "x".into()).is_none());
    }

    #[test]
    fn test_visibility_restores_captured_state() {
        let mut scene = SceneGraph::new();
        let mut obj = SceneObject::vertex_handle(Vec3::ZERO);
        obj.visible = false;
        let id = obj.id;
        scene.add(obj);
        let mut history = SceneHistory::new();

        // Hiding an already hidden object must not show it on undo
        let cmd = SetVisibility::new(scene.object(id).unwrap(), false);
        history.execute(cmd, &mut scene);
        history.undo(&mut scene);
        assert!(!scene.object(id).unwrap().visible);

        let cmd = SetVisibility::new(scene.object(id).unwrap(), true);
        history.execute(cmd, &mut scene);
        let cmd = SetVisibility::new(scene.object(id).unwrap(), false);
        history.execute(cmd, &mut scene);
        assert_eq!(history.len(), 1);
        history.undo(&mut scene);
        assert!(!scene.object(id).unwrap().visible);
    }
}
