use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{Game, GameId, Player, PlayerId};

/// One declared availability: "this player can make this game". Presence of
/// the pair means available, absence means no response; there is no
/// explicit "unavailable" fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityFact {
    pub player_id: PlayerId,
    pub game_id: GameId,
}

impl AvailabilityFact {
    pub fn new(player_id: PlayerId, game_id: GameId) -> Self {
        Self { player_id, game_id }
    }
}

/// A snapshot of all declared availability. Set semantics: duplicates
/// collapse, iteration order is the derived (player, game) order.
pub type FactSet = BTreeSet<AvailabilityFact>;

/// Query-time filter applied to the game list before aggregation. Never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityFilter {
    /// Every game is eligible (the fixed-schedule setup).
    All,
    /// Only games whose venue is within the given distance of the home
    /// ground. A game with no recorded distance is not eligible.
    MaxDistance(u32),
}

impl EligibilityFilter {
    pub fn allows(&self, game: &Game) -> bool {
        match self {
            EligibilityFilter::All => true,
            EligibilityFilter::MaxDistance(max) => {
                game.distance_km.map(|d| d <= *max).unwrap_or(false)
            }
        }
    }
}

/// Attendance summary for a single game: the distinct players who declared
/// availability, in roster order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub count: usize,
    pub players: Vec<Player>,
}

/// The best slot: the eligible game with the highest attendance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub game: Game,
    pub attendee_count: usize,
    pub attendees: Vec<Player>,
}
