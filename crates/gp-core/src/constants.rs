//! Global constants for gp-core

/// Grab radius for closing a loop on its first vertex, in meters
pub const CLOSE_THRESHOLD: f32 = 0.05;

/// Height the editing plane is clamped to while dragging handles
pub const GROUND_HEIGHT: f32 = 0.0;

/// Default grid step in metric mode (10 cm)
pub const METRIC_GRID_SPACING: f32 = 0.1;

/// Default grid step in imperial mode (1 inch)
pub const IMPERIAL_GRID_SPACING: f32 = 0.0254;

/// Conversion factor between meters and inches
pub const INCHES_PER_METER: f32 = 39.370_08;

/// Below this length an edge is treated as degenerate
pub const GEOMETRY_EPSILON: f32 = 1e-6;

/// Arc segments used when rounding the outer corners of a bed border
pub const BORDER_ARC_SEGMENTS: u32 = 1;

/// Minimum vertex count of a closed outline
pub const MIN_CLOSED_VERTICES: usize = 3;

/// Minimum vertex count of an open polyline
pub const MIN_OPEN_VERTICES: usize = 2;

// ============== Bed Defaults ==============

pub const DEFAULT_BED_HEIGHT: f32 = 0.15;
pub const DEFAULT_BORDER_HEIGHT: f32 = 0.15;
pub const DEFAULT_BORDER_WIDTH: f32 = 0.10;
pub const DEFAULT_BED_COLOR: &str = "#999999";
pub const DEFAULT_BORDER_COLOR: &str = "#DDDDDD";

// ============== Fence Defaults ==============

pub const DEFAULT_FENCE_HEIGHT: f32 = 2.0;
pub const DEFAULT_FENCE_COLOR: &str = "#ffffff";

// ============== Path Defaults ==============

pub const DEFAULT_PATH_WIDTH: f32 = 0.3;
pub const DEFAULT_PATH_HEIGHT: f32 = 0.03;
pub const DEFAULT_PATH_ARC_SEGMENTS: u32 = 1;
pub const DEFAULT_PATH_COLOR: &str = "#ffffff";
