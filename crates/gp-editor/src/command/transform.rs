//! Position, rotation and scale edits
//!
//! Each command captures the object's current value when built and
//! replaces it wholesale on execute and undo. Successive edits of the same
//! object coalesce: the merged command keeps the first "before" value and
//! the latest "after" value.

use std::any::Any;

use glam::{Quat, Vec3};
use uuid::Uuid;

use super::{Command, CommandKind, downcast};
use crate::scene::{Scene, SceneObject};

/// Move an object
#[derive(Debug, Clone)]
pub struct SetPosition {
    id: Uuid,
    before: Vec3,
    after: Vec3,
}

impl SetPosition {
    pub fn new(object: &SceneObject, after: Vec3) -> Self {
        Self {
            id: object.id,
            before: object.position,
            after,
        }
    }

    pub fn before(&self) -> Vec3 {
        self.before
    }

    pub fn after(&self) -> Vec3 {
        self.after
    }

    fn apply(&self, scene: &mut (dyn Scene + 'static), value: Vec3) {
        if let Some(object) = scene.object_mut(self.id) {
            object.position = value;
            scene.object_changed(self.id);
        }
    }
}

impl Command<dyn Scene> for SetPosition {
    fn kind(&self) -> CommandKind {
        CommandKind::SetPosition
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

/// Rotate an object
#[derive(Debug, Clone)]
pub struct SetRotation {
    id: Uuid,
    before: Quat,
    after: Quat,
}

impl SetRotation {
    pub fn new(object: &SceneObject, after: Quat) -> Self {
        Self {
            id: object.id,
            before: object.rotation,
            after,
        }
    }

    fn apply(&self, scene: &mut (dyn Scene + 'static), value: Quat) {
        if let Some(object) = scene.object_mut(self.id) {
            object.rotation = value;
            scene.object_changed(self.id);
        }
    }
}

impl Command<dyn Scene> for SetRotation {
    fn kind(&self) -> CommandKind {
        CommandKind::SetRotation
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

/// Scale an object
#[derive(Debug, Clone)]
pub struct SetScale {
    id: Uuid,
    before: Vec3,
    after: Vec3,
}

impl SetScale {
    pub fn new(object: &SceneObject, after: Vec3) -> Self {
        Self {
            id: object.id,
            before: object.scale,
            after,
        }
    }

    fn apply(&self, scene: &mut (dyn Scene + 'static), value: Vec3) {
        if let Some(object) = scene.object_mut(self.id) {
            object.scale = value;
            scene.object_changed(self.id);
        }
    }
}

impl Command<dyn Scene> for SetScale {
    fn kind(&self) -> CommandKind {
        CommandKind::SetScale
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
