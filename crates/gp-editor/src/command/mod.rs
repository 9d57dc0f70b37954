//! Undoable commands
//!
//! A [`Command`] is applied to a target (usually a [`crate::scene::Scene`])
//! and knows how to revert itself from the snapshots it captured when it
//! was built. A [`CommandStack`] records executed commands and coalesces
//! compatible successive ones, so a continuous drag or slider edit
//! becomes a single undo step.

mod object;
mod props;
mod transform;
mod value;
mod vertex;

use std::any::Any;
use std::fmt;

use uuid::Uuid;

pub use object::{CreateObject, DeleteObject};
pub use props::{PropUpdate, PropsTarget, UiCallback};
pub use transform::{SetPosition, SetRotation, SetScale};
pub use value::{SetValue, SetVisibility};
pub use vertex::{DeleteVertex, InsertVertex};

use crate::scene::Scene;

/// Type tag of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    CreateObject,
    DeleteObject,
    SetPosition,
    SetRotation,
    SetScale,
    SetValue,
    SetVisibility,
    PropUpdate,
    InsertVertex,
    DeleteVertex,
}

/// An undoable operation on a target of type `T`
pub trait Command<T: ?Sized>: fmt::Debug {
    /// Type tag used for coalescing
    fn kind(&self) -> CommandKind;

    /// Identity of the object this command acts on
    fn target(&self) -> Option<Uuid>;

    /// Whether later commands may be folded into this one
    fn updateable(&self) -> bool {
        false
    }

    /// Apply the "after" state
    fn execute(&mut self, target: &mut T);

    /// Restore the "before" state
    fn undo(&mut self, target: &mut T);

    /// Whether `other` can be folded into this command
    ///
    /// The default policy requires the same type tag, the same target and
    /// an updateable command.
    fn can_merge(&self, other: &dyn Command<T>) -> bool {
        self.updateable()
            && self.kind() == other.kind()
            && self.target().is_some()
            && self.target() == other.target()
    }

    /// Fold `other` into this command, keeping this command's "before"
    /// state and taking the "after" state of `other`
    fn merge_into(&mut self, _other: &dyn Command<T>) {}

    fn as_any(&self) -> &dyn Any;
}

/// Ordered list of already-executed commands
///
/// Undoing every entry in reverse order restores the state the target was
/// in before the first command ran.
pub struct CommandStack<T: ?Sized> {
    stack: Vec<Box<dyn Command<T>>>,
}

impl<T: ?Sized> Default for CommandStack<T> {
    fn default() -> Self {
        Self { stack: Vec::new() }
    }
}

impl<T: ?Sized> fmt::Debug for CommandStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("stack", &self.stack)
            .finish()
    }
}

impl<T: ?Sized> CommandStack<T> {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of undoable entries
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Check if there is nothing to undo
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Type tag of the most recent entry
    pub fn peek_kind(&self) -> Option<CommandKind> {
        self.stack.last().map(|c| c.kind())
    }

    /// Execute a command, merging it into the top entry when compatible
    pub fn execute<C>(&mut self, mut command: C, target: &mut T)
    where
        C: Command<T> + 'static,
    {
        if let Some(top) = self.stack.last_mut() {
            if top.can_merge(&command) {
                top.merge_into(&command);
                top.execute(target);
                tracing::trace!("Merged {:?} into top of stack", command.kind());
                return;
            }
        }

        command.execute(target);
        tracing::debug!(
            "Executed {:?} (stack depth {})",
            command.kind(),
            self.stack.len() + 1
        );
        self.stack.push(Box::new(command));
    }

    /// Undo the most recent entry
    ///
    /// Returns false if the stack was empty.
    pub fn undo(&mut self, target: &mut T) -> bool {
        match self.stack.pop() {
            Some(mut command) => {
                command.undo(target);
                tracing::debug!("Undid {:?}", command.kind());
                true
            }
            None => false,
        }
    }

    /// Undo every entry, newest first
    pub fn clear(&mut self, target: &mut T) {
        while self.undo(target) {}
    }

    /// Drop every entry without undoing it
    pub fn forget(&mut self) {
        self.stack.clear();
    }
}

/// Downcast a command to a concrete type for merge checks
pub(crate) fn downcast<'a, C: 'static, T: ?Sized>(command: &'a dyn Command<T>) -> Option<&'a C> {
    command.as_any().downcast_ref::<C>()
}

/// Undo history of scene edits
pub type SceneHistory = CommandStack<dyn Scene>;
