use serde_json::Value;

use super::types::{AvailabilityFact, FactSet};
use crate::catalog::{Catalog, GameId, PlayerId};
use crate::error::ValidationError;

/// Extracts a 1-based id from a raw JSON field. Anything that is not an
/// integer in 1..=u32::MAX (missing field, float, string, zero, negative)
/// yields None.
fn positive_id(value: Option<&Value>) -> Option<u32> {
    value?
        .as_i64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| n >= 1)
}

/// Turns an untrusted entry list into a valid, deduplicated fact set.
///
/// Entries that are not objects, are missing `playerId` or `gameId`, or
/// carry non-positive or non-integer ids are dropped silently (best-effort
/// sanitize; the drop count is logged at debug level). Duplicate pairs
/// collapse. A raw list longer than `max_entries` fails with
/// `PayloadTooLarge` before any per-entry work.
pub fn normalize_entries(
    raw: &[Value],
    max_entries: usize,
) -> Result<FactSet, ValidationError> {
    if raw.len() > max_entries {
        return Err(ValidationError::PayloadTooLarge {
            count: raw.len(),
            max: max_entries,
        });
    }

    let mut facts = FactSet::new();
    let mut dropped = 0usize;

    for entry in raw {
        let player_id = positive_id(entry.get("playerId"));
        let game_id = positive_id(entry.get("gameId"));
        match (player_id, game_id) {
            (Some(player_id), Some(game_id)) => {
                facts.insert(AvailabilityFact::new(player_id, game_id));
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!(
            "normalize: dropped {} of {} raw entries, kept {} facts",
            dropped,
            raw.len(),
            facts.len()
        );
    }

    Ok(facts)
}

/// Ingestion-side id screening: every fact must reference a player on the
/// roster and a game in the catalog. The first unknown id fails the batch;
/// the aggregation engine additionally drops strays that reach a snapshot
/// some other way.
pub fn require_known_ids(facts: &FactSet, catalog: &Catalog) -> Result<(), ValidationError> {
    for fact in facts {
        if catalog.player(fact.player_id).is_none() {
            return Err(ValidationError::UnknownPlayer(fact.player_id));
        }
        if catalog.game(fact.game_id).is_none() {
            return Err(ValidationError::UnknownGame(fact.game_id));
        }
    }
    Ok(())
}

/// Sets or clears a single availability mark. Idempotent: marking an
/// already-present pair or clearing an absent one returns the same set.
pub fn toggle(
    current: &FactSet,
    player_id: PlayerId,
    game_id: GameId,
    available: bool,
) -> FactSet {
    let mut next = current.clone();
    let fact = AvailabilityFact::new(player_id, game_id);
    if available {
        next.insert(fact);
    } else {
        next.remove(&fact);
    }
    next
}
