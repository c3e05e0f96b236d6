use super::FactStore;
use crate::availability::FactSet;
use crate::error::StoreError;

/// In-memory fact store for demo runs and tests; contents vanish on
/// shutdown.
#[derive(Debug, Default)]
pub struct MemoryStore {
    facts: FactSet,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FactStore for MemoryStore {
    fn read_all(&self) -> Result<FactSet, StoreError> {
        Ok(self.facts.clone())
    }

    fn replace_all(&mut self, facts: &FactSet) -> Result<(), StoreError> {
        self.facts = facts.clone();
        Ok(())
    }
}
