//! Shape authoring sessions
//!
//! A [`ShapeEditor`] wraps a [`VertexEditor`] and adds what turns an
//! outline into a garden object: a configuration step with its own undo
//! history, a preview while configuring, and the final commit through the
//! application's command history.

use glam::Vec3;
use gp_core::constants::{BORDER_ARC_SEGMENTS, MIN_CLOSED_VERTICES, MIN_OPEN_VERTICES};
use gp_core::{
    PropValue, Props, PropsError, ShapeKind, ShapeProps, ShapeRecord, centroid, offset_polygon,
};
use uuid::Uuid;

use crate::command::{CommandStack, CreateObject, PropUpdate, PropsTarget, SceneHistory};
use crate::context::EditorContext;
use crate::event::SessionEvent;
use crate::mesh::MeshBuilder;
use crate::scene::{ObjectKind, Scene, SceneObject};
use crate::vertex_editor::{Hit, KeyEvent, VertexEditor, VertexEditorMode};

/// Error type for shape editing
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Object not found: {0}")]
    ObjectNotFound(Uuid),

    #[error("Object {id} is not an editable {expected}")]
    NotEditable { id: Uuid, expected: ShapeKind },

    #[error("Expected {expected} properties, got {found}")]
    KindMismatch { expected: ShapeKind, found: ShapeKind },

    #[error("Invalid mode: {0}")]
    InvalidMode(&'static str),

    #[error("Need at least {required} vertices, found {found}")]
    TooFewVertices { required: usize, found: usize },

    #[error(transparent)]
    Props(#[from] PropsError),

    #[error("Mesh error: {0}")]
    Mesh(String),
}

/// Result type for shape editing
pub type EditorResult<T> = Result<T, EditorError>;

/// Phase of a shape session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeEditorMode {
    Inactive,
    /// Outline is being placed or edited
    LineEditing,
    /// Outline is fixed, properties are being adjusted
    Config,
}

/// Outline and properties being configured
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeConfig {
    pub vertices: Vec<Vec3>,
    pub props: ShapeProps,
}

impl ShapeConfig {
    pub fn new(props: ShapeProps) -> Self {
        Self {
            vertices: Vec::new(),
            props,
        }
    }
}

impl PropsTarget<ShapeProps> for ShapeConfig {
    fn props(&self) -> &ShapeProps {
        &self.props
    }

    fn update_from_props(&mut self, props: &ShapeProps) {
        self.props = props.clone();
    }
}

/// Camera framing for the configuration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub target: Vec3,
    pub eye: Vec3,
}

/// Authoring session for one kind of shape
#[derive(Debug)]
pub struct ShapeEditor {
    kind: ShapeKind,
    context: EditorContext,
    line_editor: VertexEditor,
    mode: ShapeEditorMode,
    config: ShapeConfig,
    config_stack: CommandStack<ShapeConfig>,
    /// Object being re-edited, held out of the scene until finish or cancel
    original: Option<SceneObject>,
    preview: Option<Uuid>,
}

impl ShapeEditor {
    pub fn new(kind: ShapeKind, context: EditorContext) -> Self {
        let line_editor = VertexEditor::new(kind, kind.closed_loop(), &context);
        Self {
            kind,
            line_editor,
            mode: ShapeEditorMode::Inactive,
            config: ShapeConfig::new(kind.default_props()),
            config_stack: CommandStack::new(),
            original: None,
            preview: None,
            context,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn mode(&self) -> ShapeEditorMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != ShapeEditorMode::Inactive
    }

    /// Properties the shape will be committed with
    pub fn props(&self) -> &ShapeProps {
        &self.config.props
    }

    pub fn line_editor(&self) -> &VertexEditor {
        &self.line_editor
    }

    /// Preview object shown while configuring
    pub fn preview(&self) -> Option<Uuid> {
        self.preview
    }

    /// Number of undoable configuration steps
    pub fn config_depth(&self) -> usize {
        self.config_stack.len()
    }

    /// Name of the property command, shared by all edits of one session
    fn command_name(&self) -> String {
        format!("{}Config", self.kind.name())
    }

    fn default_props(&self) -> ShapeProps {
        let config = &self.context.config;
        match self.kind {
            ShapeKind::Bed => ShapeProps::Bed(config.bed.clone()),
            ShapeKind::Fence => ShapeProps::Fence(config.fence.clone()),
            ShapeKind::Path => ShapeProps::Path(config.path.clone()),
            ShapeKind::Ruler => ShapeProps::Ruler,
        }
    }

    fn min_vertices(&self) -> usize {
        if self.kind.closed_loop() {
            MIN_CLOSED_VERTICES
        } else {
            MIN_OPEN_VERTICES
        }
    }

    /// Build a record from the configured outline
    ///
    /// Re-edited shapes keep their identity.
    fn record(&self, vertices: Vec<Vec3>) -> ShapeRecord {
        let mut record = ShapeRecord::new(vertices, self.config.props.clone());
        if let Some(original) = &self.original {
            record.id = original.id;
        }
        record
    }

    // ============== Session ==============

    /// Start authoring a new shape, or re-edit an existing one
    ///
    /// A re-edited object is taken out of the scene until the session
    /// finishes or is cancelled.
    pub fn begin_editing(
        &mut self,
        scene: &mut (dyn Scene + 'static),
        existing: Option<Uuid>,
    ) -> EditorResult<()> {
        self.clean_up(scene);

        let vertices = match existing {
            Some(id) => {
                let object = scene.object(id).ok_or(EditorError::ObjectNotFound(id))?;
                let record = match &object.kind {
                    ObjectKind::Shape { record, .. } if record.kind() == self.kind => {
                        record.clone()
                    }
                    _ => {
                        return Err(EditorError::NotEditable {
                            id,
                            expected: self.kind,
                        });
                    }
                };
                if scene.selected() == Some(id) {
                    scene.deselect();
                }
                self.original = scene.remove(id);
                self.config = ShapeConfig {
                    vertices: record.vertices.clone(),
                    props: record.props,
                };
                tracing::info!("Re-editing {} {}", self.kind, id);
                Some(record.vertices)
            }
            None => {
                self.config = ShapeConfig::new(self.default_props());
                tracing::info!("Authoring new {}", self.kind);
                None
            }
        };

        self.line_editor.begin_editing(scene, vertices.as_deref());
        self.mode = ShapeEditorMode::LineEditing;
        Ok(())
    }

    /// Fix the outline and move on to configuration
    ///
    /// Returns false if the outline is not finished or the kind has no
    /// configuration step; such shapes are committed with [`Self::finish`].
    pub fn finish_vertex_editing(&mut self, scene: &mut (dyn Scene + 'static)) -> bool {
        if self.mode != ShapeEditorMode::LineEditing || !self.kind.has_config() {
            return false;
        }
        let Some(vertices) = self.line_editor.commit(scene) else {
            return false;
        };

        self.config.vertices = vertices;
        self.config_stack.forget();
        self.mode = ShapeEditorMode::Config;
        self.rebuild_preview(scene);
        tracing::info!("{} configuration started", self.kind);
        true
    }

    /// Apply a property edit during configuration
    pub fn update_props(
        &mut self,
        scene: &mut (dyn Scene + 'static),
        command: PropUpdate<ShapeProps>,
    ) -> EditorResult<()> {
        if self.mode != ShapeEditorMode::Config {
            return Err(EditorError::InvalidMode("properties can only change while configuring"));
        }
        let found = command.new_props().kind();
        if found != self.kind {
            return Err(EditorError::KindMismatch {
                expected: self.kind,
                found,
            });
        }

        self.config_stack.execute(command, &mut self.config);
        self.rebuild_preview(scene);
        self.context.events.emit(SessionEvent::ConfigUpdated(self.kind));
        Ok(())
    }

    /// Set one property field
    pub fn set_field(
        &mut self,
        scene: &mut (dyn Scene + 'static),
        field: &str,
        value: PropValue,
    ) -> EditorResult<()> {
        let mut props = self.config.props.clone();
        props.set(field, value)?;
        let command = PropUpdate::new(self.command_name(), props, &self.config);
        self.update_props(scene, command)
    }

    /// Step back once in the current phase
    pub fn undo(&mut self, scene: &mut (dyn Scene + 'static)) {
        match self.mode {
            ShapeEditorMode::Inactive => {}
            ShapeEditorMode::LineEditing => self.line_editor.undo(scene),
            ShapeEditorMode::Config => {
                if self.config_stack.undo(&mut self.config) {
                    self.rebuild_preview(scene);
                    self.context.events.emit(SessionEvent::ConfigUpdated(self.kind));
                }
            }
        }
    }

    /// Commit the shape to the scene
    ///
    /// The new object is added through `history` so the application can
    /// undo it. On error the session is left untouched.
    pub fn finish(
        &mut self,
        scene: &mut (dyn Scene + 'static),
        history: &mut SceneHistory,
        builder: &mut dyn MeshBuilder,
    ) -> EditorResult<Uuid> {
        let vertices = match self.mode {
            ShapeEditorMode::Inactive => {
                return Err(EditorError::InvalidMode("no shape is being edited"));
            }
            ShapeEditorMode::LineEditing => {
                if self.line_editor.mode() != VertexEditorMode::EditVertex {
                    return Err(EditorError::InvalidMode("outline is still being placed"));
                }
                self.line_editor.vertices(scene)
            }
            ShapeEditorMode::Config => self.config.vertices.clone(),
        };

        let required = self.min_vertices();
        if vertices.len() < required {
            return Err(EditorError::TooFewVertices {
                required,
                found: vertices.len(),
            });
        }

        let record = self.record(vertices);
        let mesh = builder
            .build(&record)
            .map_err(|e| EditorError::Mesh(e.to_string()))?;
        tracing::debug!("Built mesh {:?} with {}", mesh, builder.name());

        if self.mode == ShapeEditorMode::LineEditing {
            self.line_editor.commit(scene);
        }

        let id = record.id;
        let position = record.centroid();
        let name = record.props.name().unwrap_or(self.kind.name()).to_string();
        let cast_shadow = match &record.props {
            ShapeProps::Fence(fence) => fence.shadow,
            ShapeProps::Ruler => false,
            _ => true,
        };
        let mut object = SceneObject::new(name, ObjectKind::Shape { record, mesh }).at(position);
        object.id = id;
        object.cast_shadow = cast_shadow;
        if let Some(original) = self.original.take() {
            object.rotation = original.rotation;
            object.scale = original.scale;
            object.visible = original.visible;
        }

        history.execute(CreateObject::new(object), scene);
        self.clean_up(scene);
        tracing::info!("{} {} finished", self.kind, id);
        self.context
            .events
            .emit(SessionEvent::EditingFinished { kind: self.kind, id });
        Ok(id)
    }

    /// Abandon the session, putting a re-edited object back
    pub fn cancel(&mut self, scene: &mut (dyn Scene + 'static), history: &mut SceneHistory) {
        let was_active = self.is_active();
        if let Some(original) = self.original.take() {
            history.execute(CreateObject::new(original), scene);
        }
        self.clean_up(scene);
        if was_active {
            tracing::info!("{} editing cancelled", self.kind);
            self.context
                .events
                .emit(SessionEvent::EditingCancelled(self.kind));
        }
    }

    /// Remove every session object without emitting events
    pub fn clean_up(&mut self, scene: &mut (dyn Scene + 'static)) {
        self.line_editor.clean_up(scene);
        if let Some(preview) = self.preview.take() {
            scene.remove(preview);
        }
        if let Some(original) = self.original.take() {
            scene.add(original);
        }
        self.config_stack.forget();
        self.mode = ShapeEditorMode::Inactive;
    }

    fn rebuild_preview(&mut self, scene: &mut (dyn Scene + 'static)) {
        if let Some(preview) = self.preview.take() {
            scene.remove(preview);
        }
        let record = self.record(self.config.vertices.clone());
        let position = record.centroid();
        let name = format!("{} preview", self.kind);
        let object = SceneObject::new(name, ObjectKind::ShapePreview { record }).at(position);
        self.preview = Some(object.id);
        scene.add(object);
        scene.request_render();
    }

    // ============== Input ==============

    pub fn handle_mouse_move(&mut self, scene: &mut (dyn Scene + 'static), hit: Hit) {
        if self.mode == ShapeEditorMode::LineEditing {
            self.line_editor.handle_mouse_move(scene, hit);
        }
    }

    pub fn handle_mouse_click(&mut self, scene: &mut (dyn Scene + 'static), hit: Hit) {
        if self.mode == ShapeEditorMode::LineEditing {
            self.line_editor.handle_mouse_click(scene, hit);
        }
    }

    /// Returns true if the key was handled
    pub fn handle_key_down(&mut self, scene: &mut (dyn Scene + 'static), event: KeyEvent) -> bool {
        match self.mode {
            ShapeEditorMode::Inactive => false,
            ShapeEditorMode::LineEditing => self.line_editor.handle_key_down(scene, event),
            ShapeEditorMode::Config if event.is_undo() => {
                self.undo(scene);
                true
            }
            ShapeEditorMode::Config => false,
        }
    }

    /// Redraw length labels after the snapper's units change
    pub fn refresh(&mut self, scene: &mut (dyn Scene + 'static)) {
        if self.mode == ShapeEditorMode::LineEditing {
            self.line_editor.refresh(scene);
        }
    }

    // ============== Queries ==============

    /// Live area of the shape, `None` when inactive
    ///
    /// Open polylines report 0 once configured.
    pub fn area(&self, scene: &dyn Scene) -> Option<f32> {
        match self.mode {
            ShapeEditorMode::Inactive => None,
            ShapeEditorMode::LineEditing => self.line_editor.polygon_area(scene),
            ShapeEditorMode::Config => Some(self.record(self.config.vertices.clone()).area()),
        }
    }

    /// Camera framing while configuring
    pub fn config_view(&self) -> Option<CameraView> {
        if self.mode != ShapeEditorMode::Config {
            return None;
        }
        let target = centroid(&self.config.vertices);
        Some(CameraView {
            target,
            eye: target + self.kind.config_camera_offset(),
        })
    }

    /// Outer edge of a bed's border ring
    pub fn border_outline(&self) -> Option<Vec<Vec3>> {
        let bed = self.config.props.bed()?;
        if self.config.vertices.len() < MIN_CLOSED_VERTICES {
            return None;
        }
        Some(offset_polygon(
            &self.config.vertices,
            bed.border_width,
            BORDER_ARC_SEGMENTS,
        ))
    }
}
