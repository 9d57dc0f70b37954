//! Mesh generation seam
//!
//! Turning a finished outline into renderable geometry (bed extrusion,
//! border rings, fence strips) belongs to the renderer. Editors only call
//! a [`MeshBuilder`] when a shape is committed.

use gp_core::ShapeRecord;
use serde::{Deserialize, Serialize};

/// Handle to a mesh owned by the mesh builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshId(pub u64);

/// Error type for mesh generation
#[derive(Debug, Clone, thiserror::Error)]
pub enum MeshError {
    #[error("Invalid outline: {0}")]
    InvalidOutline(String),
}

/// Builds renderable meshes from committed shapes
pub trait MeshBuilder {
    /// Get the name of this builder
    fn name(&self) -> &str;

    /// Generate the mesh for a committed shape
    fn build(&mut self, record: &ShapeRecord) -> Result<MeshId, MeshError>;
}

/// Builder that produces no geometry, only sequential ids
///
/// Used by headless tools and tests where nothing is drawn.
#[derive(Debug, Default)]
pub struct NullMeshBuilder {
    next: u64,
    built: Vec<MeshId>,
}

impl NullMeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Meshes handed out so far
    pub fn built(&self) -> &[MeshId] {
        &self.built
    }
}

impl MeshBuilder for NullMeshBuilder {
    fn name(&self) -> &str {
        "null"
    }

    fn build(&mut self, record: &ShapeRecord) -> Result<MeshId, MeshError> {
        if record.vertices.len() < 2 {
            return Err(MeshError::InvalidOutline(format!(
                "{} vertices",
                record.vertices.len()
            )));
        }
        let id = MeshId(self.next);
        self.next += 1;
        self.built.push(id);
        Ok(id)
    }
}
