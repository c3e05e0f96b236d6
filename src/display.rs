use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::availability::{EligibilityFilter, GameSummary, Recommendation};
use crate::catalog::{Catalog, Game, GameId, Player};

/// Formats a player name with locality tag
pub fn format_player_name(player: &Player) -> String {
    match &player.locality {
        Some(locality) => format!("{} ({})", player.name, locality),
        None => player.name.clone(),
    }
}

/// One line per game: date, time, opponent, venue, distance.
fn format_game_line(game: &Game) -> String {
    let place = if game.home {
        "home".to_string()
    } else {
        format!("away, {}", game.venue)
    };
    let distance = match game.distance_km {
        Some(km) => format!(", {} km", km),
        None => String::new(),
    };
    format!(
        "{} {} vs {} ({}{})",
        game.date, game.time, game.opponent, place, distance
    )
}

/// Renders the attendance report: every game in catalog order with its
/// attendee list, then the best slot (or the reason there is none).
pub fn render_report(
    catalog: &Catalog,
    summaries: &BTreeMap<GameId, GameSummary>,
    recommendation: Option<&Recommendation>,
    filter: &EligibilityFilter,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("** Availability: {} **\n", catalog.cycle));
    match filter {
        EligibilityFilter::All => out.push_str("Filter: all games\n\n"),
        EligibilityFilter::MaxDistance(km) => {
            out.push_str(&format!("Filter: venues within {} km\n\n", km))
        }
    }

    for game in &catalog.games {
        out.push_str(&format_game_line(game));
        out.push('\n');
        match summaries.get(&game.id) {
            Some(summary) if summary.count > 0 => {
                let names: Vec<String> = summary.players.iter().map(format_player_name).collect();
                out.push_str(&format!(
                    "    {} available: {}\n",
                    summary.count,
                    names.join(", ")
                ));
            }
            _ => out.push_str("    0 available\n"),
        }
    }

    out.push('\n');
    match recommendation {
        Some(rec) => {
            out.push_str(&format!("Best slot: {}\n", format_game_line(&rec.game)));
            out.push_str(&format!(
                "{} of {} players available:\n",
                rec.attendee_count,
                catalog.players.len()
            ));
            for player in &rec.attendees {
                out.push_str(&format!("  - {}\n", format_player_name(player)));
            }
        }
        None => out.push_str("No recommendation yet.\n"),
    }

    out
}

/// Writes the rendered report to a file.
pub fn write_report_to_file(
    path: &Path,
    catalog: &Catalog,
    summaries: &BTreeMap<GameId, GameSummary>,
    recommendation: Option<&Recommendation>,
    filter: &EligibilityFilter,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(path)?;
    file.write_all(render_report(catalog, summaries, recommendation, filter).as_bytes())?;
    Ok(())
}

/// Exports the per-game attendance table as CSV, one row per game in
/// catalog order, attendee names joined with "; ".
pub fn write_summary_csv(
    path: &Path,
    catalog: &Catalog,
    summaries: &BTreeMap<GameId, GameSummary>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "game_id",
        "date",
        "time",
        "opponent",
        "venue",
        "home",
        "distance_km",
        "count",
        "players",
    ])?;

    for game in &catalog.games {
        let (count, names) = match summaries.get(&game.id) {
            Some(summary) => (
                summary.count,
                summary
                    .players
                    .iter()
                    .map(format_player_name)
                    .collect::<Vec<String>>()
                    .join("; "),
            ),
            None => (0, String::new()),
        };

        writer.write_record([
            game.id.to_string(),
            game.date.to_string(),
            game.time.clone(),
            game.opponent.clone(),
            game.venue.clone(),
            if game.home { "yes" } else { "no" }.to_string(),
            game.distance_km
                .map(|km| km.to_string())
                .unwrap_or_default(),
            count.to_string(),
            names,
        ])?;
    }

    writer.flush()?;
    Ok(())
}
