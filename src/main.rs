//! # Sway - Talking Practice Metronome
//!
//! Sway catalogs dance moves and the transitions between them, then runs
//! practice sessions: a metronome with a count-in and accented beats,
//! plus a voice that announces which connected move to dance next.
//!
//! ## Usage
//!
//! ```bash
//! # Create a catalog and add moves
//! sway init
//! sway add-move "Basic Step"
//! sway add-move "Cross Body Lead"
//!
//! # Wire them up
//! sway connect "Basic Step" "Cross Body Lead" --smoothness 5
//!
//! # Practice
//! sway practice "Basic Step" --bpm 96 --priority
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use sway::announcer::Announcer;
use sway::audio::ClickPlayer;
use sway::catalog::{Catalog, Sequence, SMOOTHNESS_MAX, SMOOTHNESS_MIN};
use sway::cli;
use sway::completion;
use sway::config;
use sway::scheduler::{BeatSound, NullSound, SchedulerConfig};
use sway::selector;
use sway::session::{self, SessionOptions};

/// Main entry point for the Sway application.
///
/// Initializes logging, parses command-line arguments, and routes
/// commands to the appropriate module functions. All operations return
/// Results for consistent error handling throughout the application.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug sway command` - Enable debug logging
/// - `RUST_LOG=sway::scheduler=debug sway practice …` - Module-specific logging
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Init { force } => cmd_init(force),
        cli::Command::AddMove { name, notes } => cmd_add_move(&name, &notes),
        cli::Command::Connect {
            from,
            to,
            smoothness,
            broken,
            notes,
        } => cmd_connect(&from, &to, smoothness, broken, notes),
        cli::Command::List => cmd_list(),
        cli::Command::Graph { mov } => cmd_graph(mov.as_deref()),
        cli::Command::Next {
            mov,
            priority,
            seed,
        } => cmd_next(&mov, priority, seed),
        cli::Command::Practice {
            mov,
            bpm,
            accent_every,
            count_in,
            every,
            beats,
            priority,
            no_click,
            no_voice,
            seed,
            save,
        } => cmd_practice(PracticeArgs {
            mov,
            bpm,
            accent_every,
            count_in,
            every,
            beats,
            priority,
            no_click,
            no_voice,
            seed,
            save,
        }),
        cli::Command::Sequences => cmd_sequences(),
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(to_clap_shell(shell), &mut cmd);
            Ok(())
        }
        cli::Command::CompletionEnhanced { shell } => match shell {
            cli::Shell::Fish => {
                completion::generate_enhanced_fish_completion();
                Ok(())
            }
            cli::Shell::Bash => {
                completion::generate_enhanced_bash_completion();
                Ok(())
            }
            _ => Err(anyhow!(
                "Enhanced completion is only available for bash and fish; use 'sway completion' instead"
            )),
        },
        cli::Command::CompleteMoves => completion::complete_moves(),
        cli::Command::CompleteMovesFish => completion::complete_moves_fish(),
    }
}

fn to_clap_shell(shell: cli::Shell) -> clap_complete::Shell {
    match shell {
        cli::Shell::Bash => clap_complete::Shell::Bash,
        cli::Shell::Zsh => clap_complete::Shell::Zsh,
        cli::Shell::Fish => clap_complete::Shell::Fish,
        cli::Shell::PowerShell => clap_complete::Shell::PowerShell,
        cli::Shell::Elvish => clap_complete::Shell::Elvish,
    }
}

fn cmd_init(force: bool) -> Result<()> {
    let path = config::get_catalog_path()?;
    if path.exists() && !force {
        return Err(anyhow!(
            "Catalog already exists at {}. Use --force to overwrite it.",
            path.display()
        ));
    }
    Catalog::default().save(&path)?;
    println!("Created empty catalog at {}", path.display());
    Ok(())
}

fn cmd_add_move(name: &str, notes: &str) -> Result<()> {
    let path = config::get_catalog_path()?;
    let mut catalog = Catalog::load_or_default(&path)?;
    let added = catalog.add_move(name, notes)?.clone();
    catalog.save(&path)?;
    println!("Added '{}' (id: {})", added.name, added.id);
    Ok(())
}

fn cmd_connect(
    from: &str,
    to: &str,
    smoothness: i32,
    broken: bool,
    notes: Option<String>,
) -> Result<()> {
    let path = config::get_catalog_path()?;
    let mut catalog = Catalog::load_or_default(&path)?;

    let from_id = resolve_move(&catalog, from)?.id.clone();
    let to_id = resolve_move(&catalog, to)?.id.clone();

    if !(SMOOTHNESS_MIN..=SMOOTHNESS_MAX).contains(&smoothness) {
        warn!("Smoothness {smoothness} is outside {SMOOTHNESS_MIN}..={SMOOTHNESS_MAX} and will be clamped");
    }

    let updated = catalog.upsert_connection(&from_id, &to_id, smoothness, !broken, notes)?;
    catalog.save(&path)?;

    let verb = if updated { "Updated" } else { "Added" };
    println!("{verb} connection {from_id} -> {to_id}");
    Ok(())
}

fn cmd_list() -> Result<()> {
    let path = config::get_catalog_path()?;
    let catalog = Catalog::load_or_default(&path)?;

    if catalog.moves.is_empty() {
        println!("No moves yet. Add one with: sway add-move \"Name\"");
        return Ok(());
    }

    let mut moves: Vec<_> = catalog.moves.iter().collect();
    moves.sort_by(|a, b| a.name.cmp(&b.name));

    for mov in moves {
        let out = catalog.connections_from(&mov.id).len();
        if mov.notes.is_empty() {
            println!("{} [{}] - {} transitions out", mov.name, mov.id, out);
        } else {
            println!("{} [{}] - {} transitions out - {}", mov.name, mov.id, out, mov.notes);
        }
    }
    Ok(())
}

fn cmd_graph(mov: Option<&str>) -> Result<()> {
    let path = config::get_catalog_path()?;
    let catalog = Catalog::load_or_default(&path)?;

    let focus = match mov {
        Some(query) => Some(resolve_move(&catalog, query)?.id.clone()),
        None => None,
    };

    for m in &catalog.moves {
        if let Some(focus_id) = &focus {
            if &m.id != focus_id {
                continue;
            }
        }
        println!("{} [{}]", m.name, m.id);
        for conn in catalog.connections_from(&m.id) {
            let target = catalog
                .move_by_id(&conn.to_id)
                .map_or(format!("{} (missing!)", conn.to_id), |t| t.name.clone());
            let marker = if conn.works { "→" } else { "✗" };
            match &conn.notes {
                Some(note) => {
                    println!("  {marker} {target} (smoothness {}) - {note}", conn.smoothness);
                }
                None => println!("  {marker} {target} (smoothness {})", conn.smoothness),
            }
        }
    }
    Ok(())
}

fn cmd_next(mov: &str, priority: bool, seed: Option<u64>) -> Result<()> {
    let path = config::get_catalog_path()?;
    let catalog = Catalog::load_or_default(&path)?;
    let from = resolve_move(&catalog, mov)?.clone();

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match selector::select_next(&catalog.moves, &catalog.connections, &from, priority, &mut rng) {
        Some(next) => {
            match &next.note {
                Some(note) => println!("{} → {} ({note})", from.name, next.to.name),
                None => println!("{} → {}", from.name, next.to.name),
            }
        }
        None => println!("{} is a dead end, no usable connection", from.name),
    }
    Ok(())
}

struct PracticeArgs {
    mov: String,
    bpm: f64,
    accent_every: u32,
    count_in: u32,
    every: u32,
    beats: Option<u64>,
    priority: bool,
    no_click: bool,
    no_voice: bool,
    seed: Option<u64>,
    save: Option<String>,
}

fn cmd_practice(args: PracticeArgs) -> Result<()> {
    let path = config::get_catalog_path()?;
    let mut catalog = Catalog::load(&path)
        .context("No usable catalog found. Run 'sway init' and add some moves first.")?;
    let start = resolve_move(&catalog, &args.mov)?.clone();

    let options = SessionOptions {
        scheduler: SchedulerConfig {
            bpm: args.bpm,
            accent_every: args.accent_every,
            count_in_beats: args.count_in,
        },
        priority_mode: args.priority,
        announce_every: args.every,
        max_beats: args.beats,
        seed: args.seed,
    };

    let sound: Box<dyn BeatSound> = if args.no_click {
        Box::new(NullSound)
    } else {
        Box::new(ClickPlayer::spawn())
    };
    let announcer = if args.no_voice {
        Announcer::disabled()
    } else {
        Announcer::spawn()
    };
    if !args.no_voice && !announcer.is_ready() {
        warn!("Speech engine unavailable; continuing without voice");
    }

    let stop_requested = Arc::new(AtomicBool::new(false));
    spawn_stop_watcher(Arc::clone(&stop_requested));

    println!(
        "Practicing from '{}' at {} bpm (press Enter to stop)",
        start.name, args.bpm
    );
    let summary = session::run(&catalog, &start, &options, sound, &announcer, &stop_requested)?;

    println!();
    let tail = if summary.dead_end { " (ended at a dead end)" } else { "" };
    println!(
        "Danced {} moves over {} beats{}",
        summary.moves.len(),
        summary.beats,
        tail
    );

    if let Some(name) = args.save {
        catalog.sequences.push(Sequence {
            name: name.clone(),
            moves: summary.moves,
        });
        catalog.save(&path)?;
        println!("Saved sequence '{name}'");
    }
    Ok(())
}

fn cmd_sequences() -> Result<()> {
    let path = config::get_catalog_path()?;
    let catalog = Catalog::load_or_default(&path)?;

    if catalog.sequences.is_empty() {
        println!("No saved sequences. Save one with: sway practice \"Move\" --save \"Name\"");
        return Ok(());
    }

    for sequence in &catalog.sequences {
        let steps: Vec<String> = sequence
            .moves
            .iter()
            .map(|id| {
                catalog
                    .move_by_id(id)
                    .map_or_else(|| format!("{id}?"), |m| m.name.clone())
            })
            .collect();
        println!("{}: {}", sequence.name, steps.join(" → "));
    }
    Ok(())
}

fn resolve_move<'a>(catalog: &'a Catalog, query: &str) -> Result<&'a sway::catalog::Move> {
    catalog
        .find_move(query)
        .ok_or_else(|| anyhow!("No move matches '{query}'. See 'sway list'."))
}

/// Watch stdin so the user can end a practice session with Enter; the
/// session loop polls the flag once per beat.
fn spawn_stop_watcher(flag: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_ok() {
            debug!("Stop requested from stdin");
            flag.store(true, Ordering::SeqCst);
        }
    });
}
