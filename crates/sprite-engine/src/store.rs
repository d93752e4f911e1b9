use std::collections::HashMap;

use log::debug;

use crate::costume::{Costume, CostumeId};
use crate::error::{EngineError, Result};

/// Owns every costume; sprites refer to them by [`CostumeId`].
pub struct CostumeStore {
    costumes: HashMap<CostumeId, Costume>,
    by_name: HashMap<String, CostumeId>,
    next_id: u64,
}

impl Default for CostumeStore {
    fn default() -> Self {
        Self {
            costumes: HashMap::new(),
            by_name: HashMap::new(),
            next_id: 1,
        }
    }
}

impl CostumeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> CostumeId {
        let id = CostumeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a costume. Names are unique within the store.
    pub fn insert(&mut self, costume: Costume) -> Result<CostumeId> {
        if self.by_name.contains_key(costume.name()) {
            return Err(EngineError::DuplicateCostume(costume.name().to_string()));
        }
        let id = self.alloc_id();
        debug!(
            "registered costume {:?} as {:?} ({} frames)",
            costume.name(),
            id,
            costume.frame_count()
        );
        self.by_name.insert(costume.name().to_string(), id);
        self.costumes.insert(id, costume);
        Ok(id)
    }

    pub fn get(&self, id: CostumeId) -> Result<&Costume> {
        self.costumes.get(&id).ok_or(EngineError::UnknownCostume(id))
    }

    pub fn get_mut(&mut self, id: CostumeId) -> Result<&mut Costume> {
        self.costumes
            .get_mut(&id)
            .ok_or(EngineError::UnknownCostume(id))
    }

    pub fn id_of(&self, name: &str) -> Option<CostumeId> {
        self.by_name.get(name).copied()
    }

    /// Deep-copy `id` under `name` and register the copy.
    pub fn copy(&mut self, id: CostumeId, name: &str) -> Result<CostumeId> {
        let copy = self.get(id)?.deep_copy(name);
        self.insert(copy)
    }

    pub fn remove(&mut self, id: CostumeId) -> Result<Costume> {
        let costume = self
            .costumes
            .remove(&id)
            .ok_or(EngineError::UnknownCostume(id))?;
        self.by_name.remove(costume.name());
        Ok(costume)
    }

    /// Tick every costume's animation clock.
    pub fn advance_all(&mut self, elapsed_seconds: f32) {
        for costume in self.costumes.values_mut() {
            costume.advance(elapsed_seconds);
        }
    }

    pub fn len(&self) -> usize {
        self.costumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costumes.is_empty()
    }
}
