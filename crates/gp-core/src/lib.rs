//! Garden Planner Core
//!
//! This crate provides:
//! - Polygon geometry on the ground plane (centroid, area, offsetting)
//! - Grid snapping and metric/imperial unit conversion
//! - Typed property records for beds, fences and paths
//! - Serializable shape records and editor configuration

pub mod config;
pub mod constants;
pub mod geometry;
pub mod props;
pub mod record;
pub mod snap;

// Re-exports for convenience
pub use config::{ConfigError, EditorConfig};
pub use geometry::{
    angle_between, centroid, north_vector, offset_polygon, polygon_area, segment_midpoint,
    signed_area, to_ground,
};
pub use props::{
    BedProps, FenceProps, FieldDef, PathProps, PropValue, Props, PropsError, PropsResult,
    ShapeKind, ShapeProps,
};
pub use record::{RecordError, ShapeRecord};
pub use snap::{SharedSnapper, SnapConfig, Snapper, create_shared_snapper};
