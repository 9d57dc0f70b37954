//! Outline topology edits
//!
//! Inserting or deleting a vertex changes both the scene (a handle object
//! appears or disappears) and the ordered handle list of the outline.

use std::any::Any;

use glam::Vec3;
use uuid::Uuid;

use super::{Command, CommandKind};
use crate::scene::{Scene, SceneObject};

fn splice_in(scene: &mut (dyn Scene + 'static), outline: Uuid, index: usize, handle: Uuid) {
    if let Some(handles) = scene
        .object_mut(outline)
        .and_then(|o| o.outline_handles_mut())
    {
        let index = index.min(handles.len());
        handles.insert(index, handle);
        scene.object_changed(outline);
    }
}

fn splice_out(scene: &mut (dyn Scene + 'static), outline: Uuid, handle: Uuid) {
    if let Some(handles) = scene
        .object_mut(outline)
        .and_then(|o| o.outline_handles_mut())
    {
        handles.retain(|h| *h != handle);
        scene.object_changed(outline);
    }
}

/// Add a handle to an outline at a given index
#[derive(Debug, Clone)]
pub struct InsertVertex {
    outline: Uuid,
    index: usize,
    handle: SceneObject,
}

impl InsertVertex {
    pub fn new(outline: Uuid, index: usize, position: Vec3) -> Self {
        Self {
            outline,
            index,
            handle: SceneObject::vertex_handle(position),
        }
    }

    /// Id of the inserted handle
    pub fn handle(&self) -> Uuid {
        self.handle.id
    }
}

impl Command<dyn Scene> for InsertVertex {
    fn kind(&self) -> CommandKind {
        CommandKind::InsertVertex
    }

    fn target(&self) -> Option<Uuid> {
        Some(self.outline)
    }

    fn execute(&mut self, scene: &mut (dyn Scene + 'static)) {
        scene.add(self.handle.clone());
        splice_in(scene, self.outline, self.index, self.handle.id);
    }

    fn undo(&mut self, scene: &mut (dyn Scene + 'static)) {
        let id = self.handle.id;
        splice_out(scene, self.outline, id);
        if scene.selected() == Some(id) {
            scene.deselect();
        }
        if let Some(handle) = scene.remove(id) {
            self.handle = handle;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Remove a handle from an outline
#[derive(Debug, Clone)]
pub struct DeleteVertex {
    outline: Uuid,
    index: usize,
    handle: SceneObject,
}

impl DeleteVertex {
    /// Snapshot the handle and its place in the outline
    ///
    /// Returns `None` if the handle is not part of the outline.
    pub fn new(scene: &dyn Scene, outline: Uuid, handle: Uuid) -> Option<Self> {
        let index = scene
            .object(outline)?
            .outline_handles()?
            .iter()
            .position(|h| *h == handle)?;
        let handle = scene.object(handle)?.clone();
        Some(Self {
            outline,
            index,
            handle,
        })
    }
}

impl Command<dyn Scene> for DeleteVertex {
    fn kind(&self) -> CommandKind {
        CommandKind::DeleteVertex
    }

    fn target(&self) -> Option<Uuid> {
        Some(self.outline)
    }

    fn execute(&mut self, scene: &mut (dyn Scene + 'static)) {
        let id = self.handle.id;
        splice_out(scene, self.outline, id);
        if scene.selected() == Some(id) {
            scene.deselect();
        }
        if let Some(handle) = scene.remove(id) {
            self.handle = handle;
        }
    }

    fn undo(&mut self, scene: &mut (dyn Scene + 'static)) {
        scene.add(self.handle.clone());
        splice_in(scene, self.outline, self.index, self.handle.id);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
