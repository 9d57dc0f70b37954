//! Garden Planner Editor
//!
//! This crate provides:
//! - Undoable commands and a coalescing command stack
//! - The vertex editor state machine for placing and editing outlines
//! - Shape editors adding configuration and commit on top of it
//! - The scene, mesh and event seams the editors talk to

pub mod command;
pub mod context;
pub mod event;
pub mod mesh;
pub mod scene;
pub mod shape_editor;
pub mod vertex_editor;

// Re-exports for convenience
pub use command::{
    Command, CommandKind, CommandStack, CreateObject, DeleteObject, DeleteVertex, InsertVertex,
    PropUpdate, PropsTarget, SceneHistory, SetPosition, SetRotation, SetScale, SetValue,
    SetVisibility, UiCallback,
};
pub use context::EditorContext;
pub use event::{EventBus, SessionEvent};
pub use mesh::{MeshBuilder, MeshError, MeshId, NullMeshBuilder};
pub use scene::{ObjectField, ObjectKind, Scene, SceneGraph, SceneObject};
pub use shape_editor::{
    CameraView, EditorError, EditorResult, ShapeConfig, ShapeEditor, ShapeEditorMode,
};
pub use vertex_editor::{Cursor, Hit, Key, KeyEvent, VertexEditor, VertexEditorMode};
