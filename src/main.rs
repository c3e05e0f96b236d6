mod availability;
mod catalog;
mod display;
mod error;
mod store;
#[cfg(test)]
mod test_utils;
mod web;

use std::path::{Path, PathBuf};

use rand::Rng;

use availability::{recommend, summarize, AvailabilityFact, EligibilityFilter, FactSet};
use catalog::{load_catalog, Catalog};
use display::{render_report, write_report_to_file, write_summary_csv};
use store::{FactStore, JsonFileStore, MemoryStore};

struct Settings {
    data_dir: PathBuf,
    cycle: String,
    store_kind: String,
    max_entries: usize,
    max_distance: Option<u32>,
}

fn settings_from_env() -> Settings {
    Settings {
        data_dir: PathBuf::from(
            std::env::var("MATCHDAY_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        ),
        cycle: std::env::var("MATCHDAY_CYCLE").unwrap_or_else(|_| "2026-autumn".to_string()),
        store_kind: std::env::var("MATCHDAY_STORE").unwrap_or_else(|_| "file".to_string()),
        max_entries: std::env::var("MATCHDAY_MAX_ENTRIES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10_000),
        max_distance: std::env::var("MATCHDAY_MAX_DISTANCE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok()),
    }
}

fn open_store(settings: &Settings) -> Box<dyn FactStore> {
    match settings.store_kind.as_str() {
        "memory" => Box::new(MemoryStore::new()),
        _ => {
            let store = JsonFileStore::new(settings.data_dir.join("availability.json"));
            println!("Facts file: {}", store.path().display());
            Box::new(store)
        }
    }
}

// Random but plausible demo marks, roughly 60% attendance
fn seed_demo_facts(catalog: &Catalog) -> FactSet {
    let mut rng = rand::thread_rng();
    let mut facts = FactSet::new();
    for player in &catalog.players {
        for game in &catalog.games {
            if rng.gen_bool(0.6) {
                facts.insert(AvailabilityFact {
                    player_id: player.id,
                    game_id: game.id,
                });
            }
        }
    }
    facts
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let settings = settings_from_env();
    let args: Vec<String> = std::env::args().collect();

    println!("Loading catalog from {}...", settings.data_dir.display());
    let catalog = load_catalog(&settings.data_dir, settings.cycle.clone())?;
    println!(
        "Loaded {} players and {} games for cycle {}",
        catalog.players.len(),
        catalog.games.len(),
        catalog.cycle
    );

    // Check if we should run in web mode
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let store = open_store(&settings);

        println!("Starting web server on port {}...", port);
        println!("Access the site at http://localhost:{}", port);

        web::start_server(port, catalog, store, settings.max_entries).await?;
        return Ok(());
    }

    // CLI mode: one-shot attendance report
    let mut store = open_store(&settings);

    if args.len() > 1 && args[1] == "demo" {
        let facts = seed_demo_facts(&catalog);
        println!("Seeding {} demo availability marks", facts.len());
        store.replace_all(&facts)?;
    }

    let facts = store.read_all()?;
    println!("Loaded {} availability marks\n", facts.len());

    let filter = match settings.max_distance {
        Some(km) => EligibilityFilter::MaxDistance(km),
        None => EligibilityFilter::All,
    };

    let summaries = summarize(&catalog.players, &catalog.games, &facts);
    let recommendation = recommend(&catalog, &facts, &filter);

    print!(
        "{}",
        render_report(&catalog, &summaries, recommendation.as_ref(), &filter)
    );

    write_report_to_file(
        Path::new("report.txt"),
        &catalog,
        &summaries,
        recommendation.as_ref(),
        &filter,
    )?;
    write_summary_csv(Path::new("summary.csv"), &catalog, &summaries)?;
    println!("\nReport saved to:");
    println!("  - report.txt");
    println!("  - summary.csv");

    Ok(())
}
