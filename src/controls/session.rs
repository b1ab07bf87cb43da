//! Session objects that descriptors can bind to.

/// Handles to the live session, resolved by the pass-through descriptor kinds
/// (`TreeCollection`, `Window`, `InstanceStateData`).
///
/// Each handle is an opaque identifier owned by the host application; a descriptor that needs
/// a binding the context lacks fails compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub tree_collection: Option<String>,
    pub window: Option<String>,
    pub instance_state: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree_collection(mut self, handle: impl Into<String>) -> Self {
        self.tree_collection = Some(handle.into());
        self
    }

    pub fn with_window(mut self, handle: impl Into<String>) -> Self {
        self.window = Some(handle.into());
        self
    }

    pub fn with_instance_state(mut self, handle: impl Into<String>) -> Self {
        self.instance_state = Some(handle.into());
        self
    }
}
