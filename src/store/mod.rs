//! Persistence port for availability facts.
//!
//! The web layer and the CLI depend on this abstraction, not on a concrete
//! backend. Backends implement the capability set {read, replace} and
//! nothing more.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::availability::FactSet;
use crate::error::StoreError;

/// Storage port for the availability fact set.
///
/// `replace_all` must be all-or-nothing: a failed replace never leaves a
/// partially cleared set visible to readers. A backend that cannot commit
/// atomically reports `StoreError::PartialReplace` so the caller knows to
/// re-read and reconcile.
pub trait FactStore: Send {
    /// Reads the complete current fact set. A store that has never been
    /// written reads as the empty set.
    fn read_all(&self) -> Result<FactSet, StoreError>;

    /// Atomically replaces the entire fact set with `facts`.
    fn replace_all(&mut self, facts: &FactSet) -> Result<(), StoreError>;
}
