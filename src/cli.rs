//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for Sway using Clap
//! derive macros. It provides a type-safe way to parse command-line
//! arguments and route them to appropriate functionality.
//!
//! ## Commands
//!
//! - `init`: Create an empty move catalog
//! - `add-move`: Add a dance move to the catalog
//! - `connect`: Create or update a connection between two moves
//! - `list`: Display all catalogued moves
//! - `graph`: Show the connection network as text
//! - `next`: Preview a single selection step from a move
//! - `practice`: Run a metronome session with voice announcements
//! - `sequences`: List saved practice sequences
//!
//! ## Examples
//!
//! ```bash
//! sway add-move "Cross Body Lead"
//! sway connect "Basic Step" "Cross Body Lead" --smoothness 5
//! sway practice "Basic Step" --bpm 96 --priority
//! ```

use clap::{Parser, Subcommand, ValueEnum};

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// Uses Clap derive macros to automatically generate argument parsing,
/// help text, and validation. The main structure contains only a
/// subcommand since all functionality is accessed through specific
/// commands.
#[derive(Parser)]
#[command(name = "sway")]
#[command(about = "Sway: practice dance moves with a talking metronome")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
///
/// Each variant corresponds to a major piece of functionality in Sway.
/// Command arguments are embedded directly in the enum variants for
/// type safety and automatic validation.
#[derive(Subcommand)]
pub enum Command {
    /// Create an empty move catalog
    ///
    /// Writes a fresh, empty catalog file to the platform data directory.
    /// Fails if a catalog already exists unless --force is given.
    Init {
        /// Overwrite an existing catalog
        #[arg(long)]
        force: bool,
    },

    /// Add a dance move to the catalog
    ///
    /// The move id is derived from the name as a slug ("Cross Body Lead"
    /// becomes cross-body-lead) and uniquified if taken. Ids are stable:
    /// connections and sequences refer to them.
    AddMove {
        /// Display name of the move, as it will be announced
        name: String,

        /// Free-text notes about the move
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Create or update a directed connection between two moves
    ///
    /// Connections are one-way; add the reverse direction separately if
    /// it also works. Smoothness is clamped into 1..=5.
    Connect {
        /// Move the transition departs from (name, id, or part of a name)
        from: String,

        /// Move the transition arrives at
        to: String,

        /// How smoothly the transition flows, 1 (clunky) to 5 (seamless)
        #[arg(short, long, default_value_t = 3)]
        smoothness: i32,

        /// Mark the transition as not (currently) usable
        ///
        /// Broken connections stay in the catalog as a reminder but are
        /// never selected during practice.
        #[arg(long)]
        broken: bool,

        /// Free-text note shown when the transition is selected
        #[arg(long)]
        notes: Option<String>,
    },

    /// List all moves in the catalog
    ///
    /// Displays each move with its id, outgoing connection count, and
    /// notes. Output is sorted alphabetically by name.
    List,

    /// Show the connection network as text
    ///
    /// For each move (or only the given one), prints the outgoing
    /// connections with their smoothness and whether they work.
    Graph {
        /// Restrict the output to one move (name, id, or part of a name)
        mov: Option<String>,
    },

    /// Preview one selection step from a move
    ///
    /// Runs the same selection the practice session uses and prints the
    /// result without starting a metronome. Useful for checking what a
    /// move can lead into.
    Next {
        /// Move to depart from (name, id, or part of a name)
        mov: String,

        /// Weight the pick by smoothness instead of choosing uniformly
        #[arg(short, long)]
        priority: bool,

        /// Seed for the random pick, for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run a practice session: metronome plus voice announcements
    ///
    /// Starts a count-in, then announces a connected move at the end of
    /// every phrase. Press Enter to stop; the session also ends at the
    /// beat limit or when the walk dead-ends.
    Practice {
        /// Move to start from (name, id, or part of a name)
        mov: String,

        /// Tempo in beats per minute
        #[arg(long, default_value_t = 100.0)]
        bpm: f64,

        /// Accent every n-th beat (0 disables accents)
        #[arg(long, default_value_t = 4)]
        accent_every: u32,

        /// Count-in beats before the session proper
        #[arg(long, default_value_t = 4)]
        count_in: u32,

        /// Phrase length in beats between move announcements
        #[arg(long, default_value_t = 4)]
        every: u32,

        /// Stop after this many beats (count-in included)
        #[arg(long)]
        beats: Option<u64>,

        /// Weight selection by smoothness instead of choosing uniformly
        #[arg(short, long)]
        priority: bool,

        /// Disable the metronome click
        #[arg(long)]
        no_click: bool,

        /// Disable voice announcements
        #[arg(long)]
        no_voice: bool,

        /// Seed for the selection, for reproducible sessions
        #[arg(long)]
        seed: Option<u64>,

        /// Save the danced sequence under this name when the session ends
        #[arg(long)]
        save: Option<String>,
    },

    /// List saved practice sequences
    Sequences,

    /// Generate shell completions
    ///
    /// Usage: sway completion bash > ~/.local/share/bash-completion/completions/sway
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// Generate enhanced completion with move name completion
    ///
    /// Generates an enhanced completion script that includes dynamic move
    /// name completion for the connect, next, graph and practice commands.
    ///
    /// Usage: sway completion-enhanced fish > ~/.config/fish/completions/sway.fish
    CompletionEnhanced {
        /// Shell to generate enhanced completions for (currently bash and fish supported)
        shell: Shell,
    },

    /// List move names for completion (hidden command)
    #[command(hide = true)]
    CompleteMoves,

    /// List move names for fish shell completion (hidden command)
    #[command(hide = true)]
    CompleteMovesFish,
}
