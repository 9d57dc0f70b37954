//! Recorded editing sessions
//!
//! A script is a RON file naming a shape kind and a list of input steps.
//! Steps are replayed against an in-memory scene exactly as a viewport
//! would forward pointer and keyboard input.

use std::path::Path;

use glam::Vec3;
use gp_core::{ConfigError, EditorConfig, PropValue, RecordError, ShapeKind, ShapeRecord};
use gp_editor::{
    EditorContext, EditorError, EventBus, Hit, Key, KeyEvent, NullMeshBuilder, Scene, SceneGraph,
    SceneHistory, ShapeEditor,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Script-related errors
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Usage: {0}")]
    Usage(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Step {index}: {reason}")]
    Step { index: usize, reason: String },

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// One input event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Pointer over the ground
    Move { x: f32, z: f32 },
    /// Click on the ground
    Click { x: f32, z: f32 },
    /// Click the n-th vertex handle
    ClickVertex(usize),
    /// Click the n-th outline segment at a ground point
    ClickSegment { index: usize, x: f32, z: f32 },
    Key(Key),
    /// Key pressed with Ctrl held
    Ctrl(Key),
    /// Move from the outline to the configuration step
    FinishVertices,
    /// Change one property
    Set(String, PropValue),
    Undo,
    Finish,
    Cancel,
}

/// A recorded session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub kind: ShapeKind,
    /// Inline configuration, overridden by `--config`
    #[serde(default)]
    pub config: Option<EditorConfig>,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_ron_str(content: &str) -> Result<Self, ScriptError> {
        ron::from_str(content).map_err(|e| ScriptError::Parse(e.to_string()))
    }

    /// Load a script from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ScriptError::Io(e.to_string()))?;
        let script = Self::from_ron_str(&content)?;
        tracing::info!(
            "Loaded {} script with {} steps from {}",
            script.kind,
            script.steps.len(),
            path.display()
        );
        Ok(script)
    }
}

/// Result of a replay
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Committed shape, if the script finished one
    pub record: Option<ShapeRecord>,
    /// Area of the committed shape, or of the outline still being edited
    pub area: Option<f32>,
}

/// Headless editing session
pub struct Replay {
    scene: SceneGraph,
    history: SceneHistory,
    builder: NullMeshBuilder,
    editor: ShapeEditor,
    events: EventBus,
    finished: Option<Uuid>,
}

impl Replay {
    pub fn new(kind: ShapeKind, config: EditorConfig) -> Self {
        let context = EditorContext::new(config);
        let events = context.events.clone();
        Self {
            scene: SceneGraph::with_events(events.clone()),
            history: SceneHistory::new(),
            builder: NullMeshBuilder::new(),
            editor: ShapeEditor::new(kind, context),
            events,
            finished: None,
        }
    }

    /// Start a fresh shape
    pub fn begin(&mut self) -> Result<(), ScriptError> {
        self.editor.begin_editing(&mut self.scene, None)?;
        Ok(())
    }

    /// Apply one step
    pub fn apply(&mut self, index: usize, step: &Step) -> Result<(), ScriptError> {
        tracing::trace!("step {}: {:?}", index, step);
        let scene = &mut self.scene;
        match step {
            Step::Move { x, z } => {
                self.editor
                    .handle_mouse_move(scene, Hit::ground(Vec3::new(*x, 0.0, *z)));
            }
            Step::Click { x, z } => {
                self.editor
                    .handle_mouse_click(scene, Hit::ground(Vec3::new(*x, 0.0, *z)));
            }
            Step::ClickVertex(n) => {
                let handles = self.editor.line_editor().handles(scene);
                let (id, position) = handles
                    .get(*n)
                    .and_then(|id| scene.object(*id).map(|o| (*id, o.position)))
                    .ok_or_else(|| ScriptError::Step {
                        index,
                        reason: format!("no vertex handle {} ({} handles)", n, handles.len()),
                    })?;
                self.editor.handle_mouse_click(scene, Hit::object(id, position));
            }
            Step::ClickSegment { index: segment, x, z } => {
                let id = scene
                    .objects()
                    .find(|o| o.segment_index() == Some(*segment))
                    .map(|o| o.id)
                    .ok_or_else(|| ScriptError::Step {
                        index,
                        reason: format!("no outline segment {}", segment),
                    })?;
                self.editor
                    .handle_mouse_click(scene, Hit::object(id, Vec3::new(*x, 0.0, *z)));
            }
            Step::Key(key) => {
                self.editor.handle_key_down(scene, KeyEvent::new(*key));
            }
            Step::Ctrl(key) => {
                self.editor.handle_key_down(scene, KeyEvent::ctrl(*key));
            }
            Step::FinishVertices => {
                if !self.editor.finish_vertex_editing(scene) {
                    return Err(ScriptError::Step {
                        index,
                        reason: "outline is not ready for configuration".into(),
                    });
                }
            }
            Step::Set(field, value) => {
                self.editor.set_field(scene, field, value.clone())?;
            }
            Step::Undo => self.editor.undo(scene),
            Step::Finish => {
                let id = self
                    .editor
                    .finish(scene, &mut self.history, &mut self.builder)?;
                self.finished = Some(id);
            }
            Step::Cancel => self.editor.cancel(scene, &mut self.history),
        }

        for event in self.events.drain() {
            tracing::debug!("{:?}", event);
        }
        Ok(())
    }

    /// Committed shape record
    pub fn record(&self) -> Option<&ShapeRecord> {
        self.finished
            .and_then(|id| self.scene.object(id))
            .and_then(|o| o.record())
    }

    pub fn outcome(&self) -> Outcome {
        let record = self.record().cloned();
        let area = match &record {
            Some(record) => Some(record.area()),
            None => self.editor.area(&self.scene),
        };
        Outcome { record, area }
    }
}

/// Replay a whole script
pub fn run(script: &Script, config: EditorConfig) -> Result<Outcome, ScriptError> {
    let mut replay = Replay::new(script.kind, config);
    replay.begin()?;
    for (index, step) in script.steps.iter().enumerate() {
        replay.apply(index, step)?;
    }
    Ok(replay.outcome())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gp_core::ShapeProps;

    const BED: &str = include_str!("../scripts/bed.ron");
    const FENCE: &str = include_str!("../scripts/fence.ron");

    #[test]
    fn test_bed_script() {
        let script = Script::from_ron_str(BED).unwrap();
        assert_eq!(script.kind, ShapeKind::Bed);

        let outcome = run(&script, EditorConfig::default()).unwrap();
        let record = outcome.record.unwrap();
        assert_eq!(record.vertices.len(), 4);
        assert_eq!(record.vertices[2], Vec3::new(2.0, 0.0, 2.0));
        assert_relative_eq!(outcome.area.unwrap(), 4.0);

        let ShapeProps::Bed(props) = &record.props else {
            panic!("expected bed props, got {:?}", record.props);
        };
        assert_eq!(props.name, "Herbs");
        assert_eq!(props.bed_height, 0.3);
        assert_eq!(props.border_width, 0.15);
    }

    #[test]
    fn test_fence_script_uses_inline_config() {
        let script = Script::from_ron_str(FENCE).unwrap();
        let config = script.config.clone().unwrap();
        assert!(!config.snap.metric);

        let outcome = run(&script, config).unwrap();
        let record = outcome.record.unwrap();
        assert_eq!(record.vertices.len(), 3);
        assert_eq!(outcome.area, Some(0.0));
        assert_eq!(record.props.fence().map(|f| f.shadow), Some(false));
    }

    #[test]
    fn test_unfinished_script_reports_live_area() {
        let script = Script::from_ron_str(
            "(kind: Bed, steps: [Click(x: 0.0, z: 0.0), Click(x: 1.0, z: 0.0), \
             Click(x: 1.0, z: 1.0), Click(x: 0.0, z: 1.0), Click(x: 0.0, z: 0.0)])",
        )
        .unwrap();
        let outcome = run(&script, EditorConfig::default()).unwrap();
        assert!(outcome.record.is_none());
        assert_relative_eq!(outcome.area.unwrap(), 1.0);
    }

    #[test]
    fn test_step_errors() {
        let script = Script::from_ron_str("(kind: Path, steps: [ClickVertex(0)])").unwrap();
        let err = run(&script, EditorConfig::default()).unwrap_err();
        assert!(matches!(err, ScriptError::Step { index: 0, .. }));

        let script = Script::from_ron_str("(kind: Path, steps: [Finish])").unwrap();
        let err = run(&script, EditorConfig::default()).unwrap_err();
        assert!(matches!(err, ScriptError::Editor(_)));

        assert!(matches!(
            Script::from_ron_str("(kind: Pond, steps: [])"),
            Err(ScriptError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.ron");
        std::fs::write(&path, BED).unwrap();

        let script = Script::load(&path).unwrap();
        assert_eq!(script.steps.len(), 17);
        assert!(matches!(
            Script::load(dir.path().join("missing.ron")),
            Err(ScriptError::Io(_))
        ));
    }
}
