use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;
use serde::{Deserialize, Serialize};

pub type PlayerId = u32;
pub type GameId = u32;

/// A roster entry for the current planning cycle. Loaded once at startup,
/// never mutated by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub locality: Option<String>,
    pub rating: Option<u32>,
}

/// An upcoming match. `distance_km` is the venue's distance from the home
/// ground and feeds the eligibility filter; games without a recorded
/// distance never pass a distance filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    pub opponent: String,
    pub date: NaiveDate,
    pub time: String,
    pub venue: String,
    pub home: bool,
    pub distance_km: Option<u32>,
}

/// The versioned configuration object for one planning cycle: the roster
/// plus the match catalog, labelled with a cycle name. Loaded once and
/// passed explicitly into every engine call.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub cycle: String,
    pub players: Vec<Player>,
    pub games: Vec<Game>,
}

impl Catalog {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }
}

/// Raw players.csv row before validation.
#[derive(Debug, Deserialize)]
struct PlayerRow {
    id: u32,
    name: String,
    locality: Option<String>,
    rating: Option<u32>,
}

/// Raw games.csv row before validation. Date and flag columns stay strings
/// so that validation failures can name the row.
#[derive(Debug, Deserialize)]
struct GameRow {
    id: u32,
    opponent: String,
    date: String,
    time: String,
    venue: String,
    home: String,
    distance_km: Option<u32>,
}

/// Parses a boolean value from various string representations
fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "yes" || lower == "true" || lower == "1"
}

/// Loads the roster and match catalog for one cycle from `players.csv` and
/// `games.csv` in `dir`. The catalog is authoritative configuration, so a
/// malformed row is a startup error rather than a skipped record.
pub fn load_catalog<P: AsRef<Path>>(
    dir: P,
    cycle: String,
) -> Result<Catalog, Box<dyn std::error::Error>> {
    let dir = dir.as_ref();
    let players = load_players(&dir.join("players.csv"))?;
    let games = load_games(&dir.join("games.csv"))?;
    Ok(Catalog {
        cycle,
        players,
        games,
    })
}

fn load_players(path: &Path) -> Result<Vec<Player>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut players = Vec::new();
    let mut seen_ids = HashSet::new();

    for (index, result) in reader.deserialize().enumerate() {
        let row: PlayerRow = result?;
        let line = index + 2; // header is line 1

        if row.id == 0 {
            return Err(format!("players.csv line {}: player id must be >= 1", line).into());
        }
        if !seen_ids.insert(row.id) {
            return Err(format!("players.csv line {}: duplicate player id {}", line, row.id).into());
        }
        let name = row.name.trim().to_string();
        if name.is_empty() {
            return Err(format!("players.csv line {}: player name is empty", line).into());
        }

        players.push(Player {
            id: row.id,
            name,
            locality: row.locality.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
            rating: row.rating,
        });
    }

    Ok(players)
}

fn load_games(path: &Path) -> Result<Vec<Game>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut games = Vec::new();
    let mut seen_ids = HashSet::new();

    for (index, result) in reader.deserialize().enumerate() {
        let row: GameRow = result?;
        let line = index + 2;

        if row.id == 0 {
            return Err(format!("games.csv line {}: game id must be >= 1", line).into());
        }
        if !seen_ids.insert(row.id) {
            return Err(format!("games.csv line {}: duplicate game id {}", line, row.id).into());
        }
        let opponent = row.opponent.trim().to_string();
        if opponent.is_empty() {
            return Err(format!("games.csv line {}: opponent is empty", line).into());
        }
        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d").map_err(|e| {
            format!("games.csv line {}: bad date {:?}: {}", line, row.date, e)
        })?;

        games.push(Game {
            id: row.id,
            opponent,
            date,
            time: row.time.trim().to_string(),
            venue: row.venue.trim().to_string(),
            home: parse_bool(&row.home),
            distance_km: row.distance_km,
        });
    }

    // Catalog order is the tie-break order for recommendations, so keep
    // the file order rather than sorting.
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_catalog(dir: &TempDir, players: &str, games: &str) {
        fs::write(dir.path().join("players.csv"), players).unwrap();
        fs::write(dir.path().join("games.csv"), games).unwrap();
    }

    #[test]
    fn loads_players_and_games() {
        let dir = TempDir::new().unwrap();
        write_catalog(
            &dir,
            "id,name,locality,rating\n\
             1,Anna,Northside,1420\n\
             2,Bram,,\n",
            "id,opponent,date,time,venue,home,distance_km\n\
             1,Harbour Rovers,2026-09-05,19:30,Dockyard Park,no,12\n\
             2,Hillcrest,2026-09-12,14:00,Home Ground,yes,0\n\
             3,Valley United,2026-09-19,15:15,Valley Arena,no,\n",
        );

        let catalog = load_catalog(dir.path(), "autumn".to_string()).unwrap();
        assert_eq!(catalog.cycle, "autumn");
        assert_eq!(catalog.players.len(), 2);
        assert_eq!(catalog.games.len(), 3);

        let anna = catalog.player(1).unwrap();
        assert_eq!(anna.name, "Anna");
        assert_eq!(anna.locality.as_deref(), Some("Northside"));
        assert_eq!(anna.rating, Some(1420));

        let bram = catalog.player(2).unwrap();
        assert_eq!(bram.locality, None);
        assert_eq!(bram.rating, None);

        let rovers = catalog.game(1).unwrap();
        assert!(!rovers.home);
        assert_eq!(rovers.distance_km, Some(12));
        assert_eq!(rovers.date, NaiveDate::from_ymd_opt(2026, 9, 5).unwrap());

        assert!(catalog.game(2).unwrap().home);
        assert_eq!(catalog.game(3).unwrap().distance_km, None);
    }

    #[test]
    fn games_keep_file_order() {
        let dir = TempDir::new().unwrap();
        write_catalog(
            &dir,
            "id,name,locality,rating\n1,Anna,,\n",
            "id,opponent,date,time,venue,home,distance_km\n\
             9,Ninth,2026-09-05,10:00,A,yes,0\n\
             2,Second,2026-09-06,10:00,B,yes,0\n\
             5,Fifth,2026-09-07,10:00,C,yes,0\n",
        );

        let catalog = load_catalog(dir.path(), "c".to_string()).unwrap();
        let ids: Vec<GameId> = catalog.games.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }

    #[test]
    fn rejects_duplicate_player_id() {
        let dir = TempDir::new().unwrap();
        write_catalog(
            &dir,
            "id,name,locality,rating\n1,Anna,,\n1,Bram,,\n",
            "id,opponent,date,time,venue,home,distance_km\n",
        );

        let err = load_catalog(dir.path(), "c".to_string()).unwrap_err();
        assert!(err.to_string().contains("duplicate player id 1"));
    }

    #[test]
    fn rejects_zero_game_id() {
        let dir = TempDir::new().unwrap();
        write_catalog(
            &dir,
            "id,name,locality,rating\n1,Anna,,\n",
            "id,opponent,date,time,venue,home,distance_km\n\
             0,Nobody,2026-09-05,10:00,A,yes,0\n",
        );

        let err = load_catalog(dir.path(), "c".to_string()).unwrap_err();
        assert!(err.to_string().contains("game id must be >= 1"));
    }

    #[test]
    fn rejects_bad_date() {
        let dir = TempDir::new().unwrap();
        write_catalog(
            &dir,
            "id,name,locality,rating\n1,Anna,,\n",
            "id,opponent,date,time,venue,home,distance_km\n\
             1,Rovers,05/09/2026,10:00,A,yes,0\n",
        );

        let err = load_catalog(dir.path(), "c".to_string()).unwrap_err();
        assert!(err.to_string().contains("bad date"));
    }

    #[test]
    fn parses_bool_variants() {
        assert!(parse_bool("Yes"));
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("No"));
        assert!(!parse_bool(""));
    }
}
