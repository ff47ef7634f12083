use std::any::Any;
use std::collections::HashMap;

/// Stable handle to a block of effect state
pub type StateId = u32;

/// Arena of persistent effect state, keyed by stable id
///
/// Each effect instance owns one entry for its whole lifetime. Commands carry
/// only the `StateId` and look their state up with the concrete type they
/// expect, so a mismatched handle is a failed lookup rather than a reinterpret.
#[derive(Default)]
pub struct EffectStatePool {
    states: HashMap<StateId, Box<dyn Any + Send>>,
    next_id: StateId,
}

impl std::fmt::Debug for EffectStatePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectStatePool")
            .field("states", &self.states.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EffectStatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a state block and return its handle
    pub fn insert<T: Any + Send>(&mut self, state: T) -> StateId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.states.insert(id, Box::new(state));
        id
    }

    pub fn get<T: Any>(&self, id: StateId) -> Option<&T> {
        self.states.get(&id)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Any>(&mut self, id: StateId) -> Option<&mut T> {
        self.states.get_mut(&id)?.downcast_mut::<T>()
    }

    /// True if `id` exists and holds a `T`
    pub fn contains<T: Any>(&self, id: StateId) -> bool {
        self.get::<T>(id).is_some()
    }

    /// Drop a state block. Returns false if the id was unknown.
    pub fn remove(&mut self, id: StateId) -> bool {
        self.states.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
