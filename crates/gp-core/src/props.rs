//! Shape property records
//!
//! Each shape kind carries a typed record of its configurable fields.
//! Numeric fields are *differentiable*: successive edits to the same one
//! can be coalesced into a single undo step. Text and flag fields are
//! atomic and never coalesce.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Error type for property access
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropsError {
    #[error("Unknown field '{field}' for {kind}")]
    UnknownField { kind: ShapeKind, field: String },

    #[error("Field '{field}' expects a {expected} value")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for property access
pub type PropsResult<T> = Result<T, PropsError>;

/// The kinds of shape that can be authored with the vertex editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Raised garden bed (closed outline, extruded with a border)
    Bed,
    /// Fence strip along an open polyline
    Fence,
    /// Walkway along an open polyline
    Path,
    /// Measuring tape, no configuration step
    Ruler,
}

impl ShapeKind {
    /// Get the display name of the shape kind
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Bed => "Bed",
            ShapeKind::Fence => "Fence",
            ShapeKind::Path => "Path",
            ShapeKind::Ruler => "Ruler",
        }
    }

    /// Whether the outline wraps from the last vertex back to the first
    pub fn closed_loop(&self) -> bool {
        matches!(self, ShapeKind::Bed)
    }

    /// Whether a configuration step follows vertex editing
    pub fn has_config(&self) -> bool {
        !matches!(self, ShapeKind::Ruler)
    }

    /// Camera offset from the shape centroid while configuring
    pub fn config_camera_offset(&self) -> Vec3 {
        match self {
            ShapeKind::Bed => Vec3::new(0.0, 2.0, -2.0),
            ShapeKind::Fence => Vec3::new(0.0, 2.0, 2.0),
            ShapeKind::Path => Vec3::new(0.0, 4.0, -4.0),
            ShapeKind::Ruler => Vec3::new(0.0, 2.0, 2.0),
        }
    }

    /// Default properties for a new shape of this kind
    pub fn default_props(&self) -> ShapeProps {
        match self {
            ShapeKind::Bed => ShapeProps::Bed(BedProps::default()),
            ShapeKind::Fence => ShapeProps::Fence(FenceProps::default()),
            ShapeKind::Path => ShapeProps::Path(PathProps::default()),
            ShapeKind::Ruler => ShapeProps::Ruler,
        }
    }

    /// Get all shape kinds
    pub fn all() -> [ShapeKind; 4] {
        [
            ShapeKind::Bed,
            ShapeKind::Fence,
            ShapeKind::Path,
            ShapeKind::Ruler,
        ]
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropValue {
    Number(f32),
    Text(String),
    Flag(bool),
}

impl PropValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PropValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PropValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f32> for PropValue {
    fn from(v: f32) -> Self {
        PropValue::Number(v)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Flag(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Text(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Text(v)
    }
}

/// Static description of a property field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    /// Numeric field whose edits may coalesce
    pub differentiable: bool,
}

impl FieldDef {
    const fn number(name: &'static str) -> Self {
        Self {
            name,
            differentiable: true,
        }
    }

    const fn atomic(name: &'static str) -> Self {
        Self {
            name,
            differentiable: false,
        }
    }
}

/// A typed, field-addressable property record
pub trait Props: Clone + fmt::Debug {
    /// Field layout of this record
    fn fields(&self) -> &'static [FieldDef];

    /// Read a field by name
    fn get(&self, field: &str) -> Option<PropValue>;

    /// Write a field by name
    fn set(&mut self, field: &str, value: PropValue) -> PropsResult<()>;

    /// Look up the definition of a field
    fn field_def(&self, field: &str) -> Option<FieldDef> {
        self.fields().iter().copied().find(|f| f.name == field)
    }

    /// Names of the fields whose values differ between `self` and `other`
    fn changed_fields(&self, other: &Self) -> Vec<&'static str> {
        self.fields()
            .iter()
            .filter(|f| self.get(f.name) != other.get(f.name))
            .map(|f| f.name)
            .collect()
    }

    /// Whether any atomic field differs
    fn non_differentiable_field_changed(&self, other: &Self) -> bool {
        self.changed_fields(other)
            .iter()
            .any(|name| self.field_def(name).is_some_and(|f| !f.differentiable))
    }

    /// The single differentiable field changed between `self` and `other`
    ///
    /// Returns `None` when nothing changed, more than one field changed, or
    /// the changed field is atomic.
    fn single_differentiable_change(&self, other: &Self) -> Option<&'static str> {
        match self.changed_fields(other).as_slice() {
            [name] if self.field_def(name).is_some_and(|f| f.differentiable) => Some(*name),
            _ => None,
        }
    }
}

fn number(field: &str, value: PropValue) -> PropsResult<f32> {
    let v = value.as_number().ok_or_else(|| PropsError::TypeMismatch {
        field: field.to_string(),
        expected: "number",
    })?;
    if !v.is_finite() {
        return Err(PropsError::InvalidValue {
            field: field.to_string(),
            reason: format!("{} is not finite", v),
        });
    }
    Ok(v)
}

fn text(field: &str, value: PropValue) -> PropsResult<String> {
    match value {
        PropValue::Text(s) => Ok(s),
        _ => Err(PropsError::TypeMismatch {
            field: field.to_string(),
            expected: "text",
        }),
    }
}

fn flag(field: &str, value: PropValue) -> PropsResult<bool> {
    value.as_flag().ok_or_else(|| PropsError::TypeMismatch {
        field: field.to_string(),
        expected: "flag",
    })
}

// ============== Bed ==============

/// Properties of a raised bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedProps {
    pub name: String,
    pub bed_height: f32,
    pub border_height: f32,
    pub border_width: f32,
    pub bed_color: String,
    pub border_color: String,
}

impl Default for BedProps {
    fn default() -> Self {
        Self {
            name: "New Bed".to_string(),
            bed_height: DEFAULT_BED_HEIGHT,
            border_height: DEFAULT_BORDER_HEIGHT,
            border_width: DEFAULT_BORDER_WIDTH,
            bed_color: DEFAULT_BED_COLOR.to_string(),
            border_color: DEFAULT_BORDER_COLOR.to_string(),
        }
    }
}

const BED_FIELDS: &[FieldDef] = &[
    FieldDef::atomic("name"),
    FieldDef::number("bed_height"),
    FieldDef::number("border_height"),
    FieldDef::number("border_width"),
    FieldDef::atomic("bed_color"),
    FieldDef::atomic("border_color"),
];

impl Props for BedProps {
    fn fields(&self) -> &'static [FieldDef] {
        BED_FIELDS
    }

    fn get(&self, field: &str) -> Option<PropValue> {
        Some(match field {
            "name" => PropValue::Text(self.name.clone()),
            "bed_height" => PropValue::Number(self.bed_height),
            "border_height" => PropValue::Number(self.border_height),
            "border_width" => PropValue::Number(self.border_width),
            "bed_color" => PropValue::Text(self.bed_color.clone()),
            "border_color" => PropValue::Text(self.border_color.clone()),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: PropValue) -> PropsResult<()> {
        match field {
            "name" => self.name = text(field, value)?,
            "bed_height" => self.bed_height = number(field, value)?,
            "border_height" => self.border_height = number(field, value)?,
            "border_width" => self.border_width = number(field, value)?,
            "bed_color" => self.bed_color = text(field, value)?,
            "border_color" => self.border_color = text(field, value)?,
            _ => {
                return Err(PropsError::UnknownField {
                    kind: ShapeKind::Bed,
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

// ============== Fence ==============

/// Properties of a fence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FenceProps {
    pub name: String,
    pub fence_height: f32,
    pub fence_color: String,
    /// Whether the fence casts shadows
    pub shadow: bool,
}

impl Default for FenceProps {
    fn default() -> Self {
        Self {
            name: "New Fence".to_string(),
            fence_height: DEFAULT_FENCE_HEIGHT,
            fence_color: DEFAULT_FENCE_COLOR.to_string(),
            shadow: true,
        }
    }
}

const FENCE_FIELDS: &[FieldDef] = &[
    FieldDef::atomic("name"),
    FieldDef::number("fence_height"),
    FieldDef::atomic("fence_color"),
    FieldDef::atomic("shadow"),
];

impl Props for FenceProps {
    fn fields(&self) -> &'static [FieldDef] {
        FENCE_FIELDS
    }

    fn get(&self, field: &str) -> Option<PropValue> {
        Some(match field {
            "name" => PropValue::Text(self.name.clone()),
            "fence_height" => PropValue::Number(self.fence_height),
            "fence_color" => PropValue::Text(self.fence_color.clone()),
            "shadow" => PropValue::Flag(self.shadow),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: PropValue) -> PropsResult<()> {
        match field {
            "name" => self.name = text(field, value)?,
            "fence_height" => self.fence_height = number(field, value)?,
            "fence_color" => self.fence_color = text(field, value)?,
            "shadow" => self.shadow = flag(field, value)?,
            _ => {
                return Err(PropsError::UnknownField {
                    kind: ShapeKind::Fence,
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

// ============== Path ==============

/// Properties of a path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathProps {
    pub name: String,
    /// Segments used to round the path's corners
    pub num_arc_segments: u32,
    pub path_width: f32,
    pub path_height: f32,
    pub path_color: String,
}

impl Default for PathProps {
    fn default() -> Self {
        Self {
            name: "New Path".to_string(),
            num_arc_segments: DEFAULT_PATH_ARC_SEGMENTS,
            path_width: DEFAULT_PATH_WIDTH,
            path_height: DEFAULT_PATH_HEIGHT,
            path_color: DEFAULT_PATH_COLOR.to_string(),
        }
    }
}

const PATH_FIELDS: &[FieldDef] = &[
    FieldDef::atomic("name"),
    FieldDef::atomic("num_arc_segments"),
    FieldDef::number("path_width"),
    FieldDef::number("path_height"),
    FieldDef::atomic("path_color"),
];

impl Props for PathProps {
    fn fields(&self) -> &'static [FieldDef] {
        PATH_FIELDS
    }

    fn get(&self, field: &str) -> Option<PropValue> {
        Some(match field {
            "name" => PropValue::Text(self.name.clone()),
            "num_arc_segments" => PropValue::Number(self.num_arc_segments as f32),
            "path_width" => PropValue::Number(self.path_width),
            "path_height" => PropValue::Number(self.path_height),
            "path_color" => PropValue::Text(self.path_color.clone()),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: PropValue) -> PropsResult<()> {
        match field {
            "name" => self.name = text(field, value)?,
            "num_arc_segments" => {
                let v = number(field, value)?;
                if v < 1.0 {
                    return Err(PropsError::InvalidValue {
                        field: field.to_string(),
                        reason: "at least one segment is required".to_string(),
                    });
                }
                self.num_arc_segments = v.round() as u32;
            }
            "path_width" => self.path_width = number(field, value)?,
            "path_height" => self.path_height = number(field, value)?,
            "path_color" => self.path_color = text(field, value)?,
            _ => {
                return Err(PropsError::UnknownField {
                    kind: ShapeKind::Path,
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

// ============== Shape Props ==============

/// Properties of any shape, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeProps {
    Bed(BedProps),
    Fence(FenceProps),
    Path(PathProps),
    Ruler,
}

impl ShapeProps {
    /// Get the shape kind
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeProps::Bed(_) => ShapeKind::Bed,
            ShapeProps::Fence(_) => ShapeKind::Fence,
            ShapeProps::Path(_) => ShapeKind::Path,
            ShapeProps::Ruler => ShapeKind::Ruler,
        }
    }

    /// Get the display name of the shape, if it has one
    pub fn name(&self) -> Option<&str> {
        match self {
            ShapeProps::Bed(p) => Some(&p.name),
            ShapeProps::Fence(p) => Some(&p.name),
            ShapeProps::Path(p) => Some(&p.name),
            ShapeProps::Ruler => None,
        }
    }

    /// Get as bed properties, if applicable
    pub fn bed(&self) -> Option<&BedProps> {
        match self {
            ShapeProps::Bed(p) => Some(p),
            _ => None,
        }
    }

    /// Get as fence properties, if applicable
    pub fn fence(&self) -> Option<&FenceProps> {
        match self {
            ShapeProps::Fence(p) => Some(p),
            _ => None,
        }
    }

    /// Get as path properties, if applicable
    pub fn path(&self) -> Option<&PathProps> {
        match self {
            ShapeProps::Path(p) => Some(p),
            _ => None,
        }
    }
}

impl Props for ShapeProps {
    fn fields(&self) -> &'static [FieldDef] {
        match self {
            ShapeProps::Bed(p) => p.fields(),
            ShapeProps::Fence(p) => p.fields(),
            ShapeProps::Path(p) => p.fields(),
            ShapeProps::Ruler => &[],
        }
    }

    fn get(&self, field: &str) -> Option<PropValue> {
        match self {
            ShapeProps::Bed(p) => p.get(field),
            ShapeProps::Fence(p) => p.get(field),
            ShapeProps::Path(p) => p.get(field),
            ShapeProps::Ruler => None,
        }
    }

    fn set(&mut self, field: &str, value: PropValue) -> PropsResult<()> {
        match self {
            ShapeProps::Bed(p) => p.set(field, value),
            ShapeProps::Fence(p) => p.set(field, value),
            ShapeProps::Path(p) => p.set(field, value),
            ShapeProps::Ruler => Err(PropsError::UnknownField {
                kind: ShapeKind::Ruler,
                field: field.to_string(),
            }),
        }
    }

    fn changed_fields(&self, other: &Self) -> Vec<&'static str> {
        if self.kind() != other.kind() {
            // Records of different kinds share no field layout
            return self.fields().iter().map(|f| f.name).collect();
        }
        self.fields()
            .iter()
            .filter(|f| self.get(f.name) != other.get(f.name))
            .map(|f| f.name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bed_defaults() {
        let bed = BedProps::default();
        assert_eq!(bed.name, "New Bed");
        assert_eq!(bed.bed_height, 0.15);
        assert_eq!(bed.border_width, 0.10);
        assert_eq!(bed.bed_color, "#999999");
        assert_eq!(bed.border_color, "#DDDDDD");
    }

    #[test]
    fn test_set_and_get_by_name() {
        let mut fence = FenceProps::default();
        fence.set("fence_height", PropValue::Number(1.2)).unwrap();
        fence.set("shadow", false.into()).unwrap();

        assert_eq!(fence.get("fence_height"), Some(PropValue::Number(1.2)));
        assert_eq!(fence.get("shadow"), Some(PropValue::Flag(false)));
        assert_eq!(fence.get("missing"), None);
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut bed = BedProps::default();
        assert!(matches!(
            bed.set("bed_height", "tall".into()),
            Err(PropsError::TypeMismatch { .. })
        ));
        assert!(matches!(
            bed.set("bed_height", f32::NAN.into()),
            Err(PropsError::InvalidValue { .. })
        ));
        assert!(matches!(
            bed.set("fence_height", PropValue::Number(1.0)),
            Err(PropsError::UnknownField { .. })
        ));
        assert_eq!(bed, BedProps::default(), "failed sets must not mutate");
    }

    #[test]
    fn test_single_differentiable_change() {
        let before = BedProps::default();

        let mut taller = before.clone();
        taller.bed_height = 0.3;
        assert_eq!(before.single_differentiable_change(&taller), Some("bed_height"));

        let mut recolored = before.clone();
        recolored.bed_color = "#000000".to_string();
        assert_eq!(before.single_differentiable_change(&recolored), None);
        assert!(before.non_differentiable_field_changed(&recolored));

        let mut both = taller.clone();
        both.border_width = 0.2;
        assert_eq!(before.single_differentiable_change(&both), None);

        assert_eq!(before.single_differentiable_change(&before), None);
    }

    #[test]
    fn test_path_arc_segments_are_atomic() {
        let before = PathProps::default();
        let mut after = before.clone();
        after.set("num_arc_segments", PropValue::Number(4.0)).unwrap();
        assert_eq!(after.num_arc_segments, 4);
        assert_eq!(before.single_differentiable_change(&after), None);
        assert!(after.set("num_arc_segments", PropValue::Number(0.0)).is_err());
    }

    #[test]
    fn test_shape_props_dispatch() {
        let mut props = ShapeKind::Fence.default_props();
        assert_eq!(props.kind(), ShapeKind::Fence);
        assert_eq!(props.name(), Some("New Fence"));

        props.set("fence_height", PropValue::Number(1.5)).unwrap();
        assert_eq!(props.fence().map(|f| f.fence_height), Some(1.5));

        let bed = ShapeKind::Bed.default_props();
        assert_eq!(bed.changed_fields(&props).len(), bed.fields().len());
        assert!(ShapeProps::Ruler.set("name", "x".into()).is_err());
    }

    #[test]
    fn test_shape_kind_layout() {
        assert!(ShapeKind::Bed.closed_loop());
        assert!(!ShapeKind::Fence.closed_loop());
        assert!(!ShapeKind::Ruler.has_config());
        assert_eq!(ShapeKind::all().len(), 4);
    }
}
