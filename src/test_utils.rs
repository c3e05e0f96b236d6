//! Shared fixtures for unit tests.

use chrono::NaiveDate;

use crate::availability::types::{AvailabilityFact, FactSet};
use crate::catalog::{Catalog, Game, GameId, Player, PlayerId};

pub fn player(id: PlayerId, name: &str) -> Player {
    Player {
        id,
        name: name.to_string(),
        locality: None,
        rating: None,
    }
}

pub fn game(id: GameId, opponent: &str, distance_km: Option<u32>) -> Game {
    Game {
        id,
        opponent: opponent.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 9, 5).unwrap(),
        time: "14:00".to_string(),
        venue: format!("{} Ground", opponent),
        home: distance_km == Some(0),
        distance_km,
    }
}

/// Three players, three games: game 1 at 10 km, game 2 at 40 km, game 3
/// with no recorded distance.
pub fn small_catalog() -> Catalog {
    Catalog {
        cycle: "test-cycle".to_string(),
        players: vec![player(1, "Anna"), player(2, "Bram"), player(3, "Cato")],
        games: vec![
            game(1, "Harbour Rovers", Some(10)),
            game(2, "Valley United", Some(40)),
            game(3, "Wanderers", None),
        ],
    }
}

pub fn facts(pairs: &[(PlayerId, GameId)]) -> FactSet {
    pairs
        .iter()
        .map(|&(player_id, game_id)| AvailabilityFact::new(player_id, game_id))
        .collect()
}
