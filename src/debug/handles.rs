use crate::remote::MetaType;
use std::collections::HashMap;

/// First handle ever issued. Zero is reserved for "not expandable".
pub const START_HANDLE: i32 = 1000;

/// A node of the remote variable tree the front end may expand.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableNode {
    pub id: String,
    pub name: String,
    pub meta: Option<MetaType>,
    /// Row count, only meaningful for tables.
    pub lines: u32,
}

impl VariableNode {
    pub fn scope(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            meta: None,
            lines: 0,
        }
    }

    pub fn is_table(&self) -> bool {
        self.meta == Some(MetaType::Table)
    }
}

/// Maps opaque integer handles to variable nodes.
///
/// The counter is never rewound: after a [`reset`](HandleTable::reset) every
/// previously issued handle stays dead instead of aliasing a new node.
#[derive(Debug)]
pub struct HandleTable {
    next: i32,
    nodes: HashMap<i32, VariableNode>,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleTable {
    pub fn new() -> Self {
        Self {
            next: START_HANDLE,
            nodes: HashMap::new(),
        }
    }

    /// Issue a new handle. The counter wraps back to [`START_HANDLE`]
    /// after `i32::MAX`.
    pub fn create(&mut self, node: VariableNode) -> i32 {
        let handle = self.next;
        self.next = self.next.checked_add(1).unwrap_or(START_HANDLE);
        self.nodes.insert(handle, node);
        handle
    }

    pub fn get(&self, handle: i32) -> Option<&VariableNode> {
        self.nodes.get(&handle)
    }

    pub fn reset(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
