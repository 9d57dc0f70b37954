//! Session notifications
//!
//! Editors publish [`SessionEvent`]s on an [`EventBus`] and never wait for
//! a reply. Property panels, the renderer and tests drain the queue at
//! their own pace.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use gp_core::ShapeKind;
use parking_lot::Mutex;
use uuid::Uuid;

/// Named editing-session events
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Handles are on screen and can be dragged
    VertexEditingStarted(ShapeKind),
    /// The outline changed while editing
    VertexEditingUpdated(ShapeKind),
    /// The outline was committed
    VertexEditingFinished(ShapeKind),
    /// The session was discarded
    EditingCancelled(ShapeKind),
    /// Shape properties changed during configuration
    ConfigUpdated(ShapeKind),
    /// A finished shape was added to the scene
    EditingFinished { kind: ShapeKind, id: Uuid },
    /// A scene object was mutated in place
    ObjectChanged(Uuid),
}

/// Fire-and-forget event queue shared between editors and observers
#[derive(Clone, Default)]
pub struct EventBus {
    queue: Arc<Mutex<VecDeque<SessionEvent>>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("queued", &format!("<{} events>", self.queue.lock().len()))
            .finish()
    }
}

impl EventBus {
    /// Create a bus with an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event
    pub fn emit(&self, event: SessionEvent) {
        tracing::trace!("event: {:?}", event);
        self.queue.lock().push_back(event);
    }

    /// Take every queued event, oldest first
    pub fn drain(&self) -> Vec<SessionEvent> {
        self.queue.lock().drain(..).collect()
    }

    /// Get the number of queued events
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Check if no events are waiting
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_queue() {
        let bus = EventBus::new();
        let observer = bus.clone();

        bus.emit(SessionEvent::VertexEditingStarted(ShapeKind::Bed));
        bus.emit(SessionEvent::ConfigUpdated(ShapeKind::Bed));
        assert_eq!(observer.len(), 2);

        let events = observer.drain();
        assert_eq!(events[0], SessionEvent::VertexEditingStarted(ShapeKind::Bed));
        assert!(bus.is_empty());
    }
}
