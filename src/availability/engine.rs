use std::collections::BTreeMap;

use super::types::{AvailabilityFact, EligibilityFilter, FactSet, GameSummary, Recommendation};
use crate::catalog::{Catalog, Game, GameId, Player};

/// Computes the attendance summary for every game in `games`, zero-fact
/// games included. Attendees are listed in roster order, so the output is
/// independent of how the fact snapshot was assembled. A fact whose player
/// or game is not in the provided lists is never counted.
pub fn summarize(
    players: &[Player],
    games: &[Game],
    facts: &FactSet,
) -> BTreeMap<GameId, GameSummary> {
    let mut summaries = BTreeMap::new();

    for game in games {
        let attendees: Vec<Player> = players
            .iter()
            .filter(|p| facts.contains(&AvailabilityFact::new(p.id, game.id)))
            .cloned()
            .collect();
        summaries.insert(
            game.id,
            GameSummary {
                count: attendees.len(),
                players: attendees,
            },
        );
    }

    summaries
}

/// Picks the best slot: the eligible game with the highest attendance.
/// Ties break to the first game in catalog order, which makes repeated
/// calls over the same catalog reproducible. Returns None when no game
/// passes the filter or when every eligible game is unattended; the two
/// causes only differ in the debug log.
pub fn recommend(
    catalog: &Catalog,
    facts: &FactSet,
    filter: &EligibilityFilter,
) -> Option<Recommendation> {
    let eligible: Vec<Game> = catalog
        .games
        .iter()
        .filter(|g| filter.allows(g))
        .cloned()
        .collect();

    if eligible.is_empty() {
        log::debug!("recommend: no games eligible under {:?}", filter);
        return None;
    }

    let summaries = summarize(&catalog.players, &eligible, facts);

    // Keep the first strict maximum so equal counts resolve to the
    // earliest game in catalog order.
    let mut best: Option<(&Game, usize)> = None;
    for game in &eligible {
        let count = summaries.get(&game.id).map_or(0, |s| s.count);
        let beats = match best {
            None => true,
            Some((_, best_count)) => count > best_count,
        };
        if beats {
            best = Some((game, count));
        }
    }

    let (game, count) = best?;
    if count == 0 {
        log::debug!(
            "recommend: {} eligible games, none with availability marks",
            eligible.len()
        );
        return None;
    }

    let attendees = summaries
        .get(&game.id)
        .map(|s| s.players.clone())
        .unwrap_or_default();

    Some(Recommendation {
        game: game.clone(),
        attendee_count: count,
        attendees,
    })
}
