pub mod engine;
pub mod mutator;
pub mod types;

pub use engine::{recommend, summarize};
pub use mutator::{normalize_entries, require_known_ids, toggle};
pub use types::{AvailabilityFact, EligibilityFilter, FactSet, GameSummary, Recommendation};
