use std::any::Any;

use uuid::Uuid;

use super::{Command, CommandKind};
use crate::scene::{Scene, SceneObject};

/// Add an object to the scene
#[derive(Debug, Clone)]
pub struct CreateObject {
    object: SceneObject,
}

impl CreateObject {
    pub fn new(object: SceneObject) -> Self {
        Self { object }
    }

    pub fn id(&self) -> Uuid {
        self.object.id
    }
}

impl Command<dyn Scene> for CreateObject {
    fn kind(&self) -> CommandKind {
        CommandKind::CreateObject
    }

    fn target(&self) -> Option<Uuid> {
        Some(self.object.id)
    }

    fn execute(&mut self, scene: &mut (dyn Scene + 'static)) {
        scene.add(self.object.clone());
    }

    fn undo(&mut self, scene: &mut (dyn Scene + 'static)) {
        let id = self.object.id;
        if scene.selected() == Some(id) {
            scene.deselect();
        }
        // Keep edits made after creation so a later re-add is faithful
        if let Some(object) = scene.remove(id) {
            self.object = object;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Remove an object from the scene
#[derive(Debug, Clone)]
pub struct DeleteObject {
    object: SceneObject,
}

impl DeleteObject {
    /// Snapshot the object to delete, or `None` if it is not in the scene
    pub fn new(scene: &dyn Scene, id: Uuid) -> Option<Self> {
        scene.object(id).cloned().map(|object| Self { object })
    }
}

impl Command<dyn Scene> for DeleteObject {
    fn kind(&self) -> CommandKind {
        CommandKind::DeleteObject
    }

    fn target(&self) -> Option<Uuid> {
        Some(self.object.id)
    }

    fn execute(&mut self, scene: &mut (dyn Scene + 'static)) {
        let id = self.object.id;
        if scene.selected() == Some(id) {
            scene.deselect();
        }
        if let Some(object) = scene.remove(id) {
            self.object = object;
        }
    }

    fn undo(&mut self, scene: &mut (dyn Scene + 'static)) {
        scene.add(self.object.clone());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
