//! Shared editing context

use gp_core::{EditorConfig, SharedSnapper, create_shared_snapper};

use crate::event::EventBus;

/// Services every editor of a session is constructed with
#[derive(Debug, Clone)]
pub struct EditorContext {
    pub config: EditorConfig,
    pub snapper: SharedSnapper,
    pub events: EventBus,
}

impl EditorContext {
    /// Create a context with a fresh snapper and event bus
    pub fn new(config: EditorConfig) -> Self {
        let snapper = create_shared_snapper(config.snap);
        Self {
            config,
            snapper,
            events: EventBus::new(),
        }
    }
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
