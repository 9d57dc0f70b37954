//! Property record edits

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use gp_core::Props;
use uuid::Uuid;

use super::{Command, CommandKind, downcast};

/// Anything whose configuration is a property record
pub trait PropsTarget<P> {
    /// Current properties
    fn props(&self) -> &P;

    /// Replace the properties and refresh whatever depends on them
    fn update_from_props(&mut self, props: &P);
}

/// Called after every execute and undo, e.g. to refresh a property panel
pub type UiCallback<P> = Rc<dyn Fn(&P)>;

/// Replace a target's property record
///
/// Successive updates with the same name coalesce while both change exactly
/// the same single numeric field. An update that changes nothing folds into
/// its neighbour. An edit to a different field, or to any text/flag field,
/// starts a new undo step.
pub struct PropUpdate<P: Props> {
    name: String,
    old_props: P,
    new_props: P,
    ui_callback: Option<UiCallback<P>>,
}

impl<P: Props> fmt::Debug for PropUpdate<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropUpdate")
            .field("name", &self.name)
            .field("old_props", &self.old_props)
            .field("new_props", &self.new_props)
            .field("ui_callback", &self.ui_callback.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl<P: Props> PropUpdate<P> {
    /// Snapshot the target's current properties as the "before" state
    pub fn new<T>(name: impl Into<String>, new_props: P, target: &T) -> Self
    where
        T: PropsTarget<P> + ?Sized,
    {
        Self {
            name: name.into(),
            old_props: target.props().clone(),
            new_props,
            ui_callback: None,
        }
    }

    /// Set the UI callback (builder pattern)
    pub fn with_callback(mut self, callback: UiCallback<P>) -> Self {
        self.ui_callback = Some(callback);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn old_props(&self) -> &P {
        &self.old_props
    }

    pub fn new_props(&self) -> &P {
        &self.new_props
    }

    /// The single numeric field this update changes, if that is all it does
    fn mergeable_field(&self) -> Option<&'static str> {
        self.old_props.single_differentiable_change(&self.new_props)
    }

    /// Whether applying this update leaves the properties as they are
    fn is_noop(&self) -> bool {
        self.old_props.changed_fields(&self.new_props).is_empty()
    }

    fn notify(&self, props: &P) {
        if let Some(callback) = &self.ui_callback {
            callback(props);
        }
    }
}

impl<P, T> Command<T> for PropUpdate<P>
where
    P: Props + 'static,
    T: PropsTarget<P> + ?Sized,
{
    fn kind(&self) -> CommandKind {
        CommandKind::PropUpdate
    }

    fn target(&self) -> Option<Uuid> {
        None
    }

    fn updateable(&self) -> bool {
        true
    }

    fn execute(&mut self, target: &mut T) {
        target.update_from_props(&self.new_props);
        self.notify(&self.new_props);
    }

    fn undo(&mut self, target: &mut T) {
        target.update_from_props(&self.old_props);
        self.notify(&self.old_props);
    }

    fn can_merge(&self, other: &dyn Command<T>) -> bool {
        let Some(other) = downcast::<Self, _>(other) else {
            return false;
        };
        if other.name != self.name {
            return false;
        }
        if self.is_noop() || other.is_noop() {
            return true;
        }
        match (self.mergeable_field(), other.mergeable_field()) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => false,
        }
    }

    fn merge_into(&mut self, other: &dyn Command<T>) {
        if let Some(other) = downcast::<Self, _>(other) {
            self.new_props = other.new_props.clone();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
