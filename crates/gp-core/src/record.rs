//! Persisted shape records
//!
//! A committed shape is stored as its ordered outline plus its typed
//! properties. Records are written as pretty RON on disk and as JSON for
//! interchange.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{centroid, polygon_area};
use crate::props::{ShapeKind, ShapeProps};

/// Record-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// A committed shape: outline vertices plus properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    /// Stable identifier, shared with the scene object holding the shape
    pub id: Uuid,
    /// Outline in world space, in placement order
    pub vertices: Vec<Vec3>,
    pub props: ShapeProps,
}

impl ShapeRecord {
    /// Create a new record with a fresh identifier
    pub fn new(vertices: Vec<Vec3>, props: ShapeProps) -> Self {
        Self {
            id: Uuid::new_v4(),
            vertices,
            props,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.props.kind()
    }

    /// Whether the outline wraps back to its first vertex
    pub fn is_closed(&self) -> bool {
        self.kind().closed_loop()
    }

    pub fn centroid(&self) -> Vec3 {
        centroid(&self.vertices)
    }

    /// Enclosed area for closed outlines, 0 for open polylines
    pub fn area(&self) -> f32 {
        if self.is_closed() {
            polygon_area(&self.vertices)
        } else {
            0.0
        }
    }

    /// Total length along the outline, including the closing edge if any
    pub fn length(&self) -> f32 {
        let open: f32 = self
            .vertices
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum();
        match (self.is_closed(), self.vertices.first(), self.vertices.last()) {
            (true, Some(first), Some(last)) if self.vertices.len() > 2 => {
                open + last.distance(*first)
            }
            _ => open,
        }
    }

    /// Vertices relative to the centroid
    pub fn local_vertices(&self) -> Vec<Vec3> {
        let c = self.centroid();
        self.vertices.iter().map(|v| *v - c).collect()
    }

    // ============== Serialization ==============

    pub fn to_json(&self) -> Result<String, RecordError> {
        serde_json::to_string_pretty(self).map_err(|e| RecordError::Serialize(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        serde_json::from_str(json).map_err(|e| RecordError::Deserialize(e.to_string()))
    }

    /// Serialize record to RON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, RecordError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| RecordError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Save record to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        let content = self.to_bytes()?;
        std::fs::write(path.as_ref(), content).map_err(|e| RecordError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load record from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| RecordError::Io(e.to_string()))?;
        ron::from_str(&content).map_err(|e| RecordError::Deserialize(e.to_string()))
    }
}
