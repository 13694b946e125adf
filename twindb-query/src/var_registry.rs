//! Variable registry for query compilation
//!
//! Maps variable names (e.g. "?s", "?batteryLevel") to compact [`VarId`]
//! indices used as direct row offsets throughout planning and execution.

use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Compact variable identifier - index into a binding row
///
/// u16 supports 65K variables per query, far beyond any realistic pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u16);

impl VarId {
    /// Row offset for this variable
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Registry mapping variable names to compact VarId indices
#[derive(Debug, Default)]
pub struct VarRegistry {
    name_to_id: FxHashMap<Arc<str>, VarId>,
    id_to_name: Vec<Arc<str>>,
}

impl VarRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get existing VarId or mint a new one
    pub fn get_or_insert(&mut self, name: &str) -> VarId {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }

        // VarId is u16; wrapping would silently cross-wire bindings. This
        // only runs when a query introduces a new variable name.
        if self.id_to_name.len() >= u16::MAX as usize {
            panic!(
                "VarRegistry capacity exceeded ({}); refusing to wrap VarId",
                self.id_to_name.len()
            );
        }

        let id = VarId(self.id_to_name.len() as u16);
        let arc_name: Arc<str> = Arc::from(name);
        self.name_to_id.insert(arc_name.clone(), id);
        self.id_to_name.push(arc_name);
        id
    }

    /// Look up an existing variable by name
    pub fn get(&self, name: &str) -> Option<VarId> {
        self.name_to_id.get(name).copied()
    }

    /// Name of a registered variable
    pub fn name(&self, id: VarId) -> Option<&Arc<str>> {
        self.id_to_name.get(id.index())
    }

    /// Number of registered variables
    pub fn len(&self) -> usize {
        self.id_to_name.len()
    }

    /// Whether no variables are registered
    pub fn is_empty(&self) -> bool {
        self.id_to_name.is_empty()
    }
}
