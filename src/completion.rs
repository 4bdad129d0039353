//! # Shell Completion Module
//!
//! This module provides shell completion functionality for Sway,
//! including:
//! - Generation of completion scripts for various shells
//! - Custom completion for move names from the catalog
//! - Integration with clap's completion system
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! sway completion bash > ~/.local/share/bash-completion/completions/sway
//!
//! # Generate fish completions with move name completion
//! sway completion-enhanced fish > ~/.config/fish/completions/sway.fish
//! ```

use crate::catalog::Catalog;
use crate::config;
use anyhow::Result;
use clap::Command;
use clap_complete::{generate, Generator};
use std::io;

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

/// Print all move names, one per line, for bash completion
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub fn complete_moves() -> Result<()> {
    let catalog = Catalog::load_or_default(&config::get_catalog_path()?)?;
    for mov in &catalog.moves {
        println!("{}", mov.name);
    }
    Ok(())
}

/// Print move names with descriptions in fish's `name\tdescription`
/// completion format
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub fn complete_moves_fish() -> Result<()> {
    let catalog = Catalog::load_or_default(&config::get_catalog_path()?)?;
    for mov in &catalog.moves {
        if mov.notes.is_empty() {
            println!("{}\tmove", mov.name);
        } else {
            println!("{}\t{}", mov.name, mov.notes);
        }
    }
    Ok(())
}

/// Generate enhanced fish completion script with move name completion
pub fn generate_enhanced_fish_completion() {
    println!(
        r#"# Enhanced Sway completion script for Fish shell with move name completion
# Install with: sway completion-enhanced fish > ~/.config/fish/completions/sway.fish

# Function to get move completions
function __sway_complete_moves
    # Get move completions from sway command, suppress errors
    if command -sq sway
        sway complete-moves-fish 2>/dev/null
    end
end

# Clear existing completions to avoid conflicts
complete -c sway -e

# Global options
complete -c sway -s h -l help -d 'Print help information'
complete -c sway -s V -l version -d 'Print version information'

# Main commands
complete -c sway -f -n '__fish_is_first_token' -a 'init' -d 'Create an empty move catalog'
complete -c sway -f -n '__fish_is_first_token' -a 'add-move' -d 'Add a dance move to the catalog'
complete -c sway -f -n '__fish_is_first_token' -a 'connect' -d 'Create or update a connection between two moves'
complete -c sway -f -n '__fish_is_first_token' -a 'list' -d 'List all moves in the catalog'
complete -c sway -f -n '__fish_is_first_token' -a 'graph' -d 'Show the connection network as text'
complete -c sway -f -n '__fish_is_first_token' -a 'next' -d 'Preview one selection step from a move'
complete -c sway -f -n '__fish_is_first_token' -a 'practice' -d 'Run a practice session'
complete -c sway -f -n '__fish_is_first_token' -a 'sequences' -d 'List saved practice sequences'
complete -c sway -f -n '__fish_is_first_token' -a 'completion' -d 'Generate shell completions'
complete -c sway -f -n '__fish_is_first_token' -a 'completion-enhanced' -d 'Generate enhanced shell completions'
complete -c sway -f -n '__fish_is_first_token' -a 'help' -d 'Print help for commands'

# Commands that take a move name
complete -c sway -f -n '__fish_seen_subcommand_from connect' -a '(__sway_complete_moves)' -d 'Move'
complete -c sway -f -n '__fish_seen_subcommand_from graph' -a '(__sway_complete_moves)' -d 'Move'
complete -c sway -f -n '__fish_seen_subcommand_from next' -a '(__sway_complete_moves)' -d 'Move'
complete -c sway -f -n '__fish_seen_subcommand_from practice' -a '(__sway_complete_moves)' -d 'Move'

# connect options
complete -c sway -f -n '__fish_seen_subcommand_from connect' -s s -l smoothness -d 'Transition smoothness 1-5'
complete -c sway -f -n '__fish_seen_subcommand_from connect' -l broken -d 'Mark the transition as not usable'
complete -c sway -f -n '__fish_seen_subcommand_from connect' -l notes -d 'Note shown when selected'

# next options
complete -c sway -f -n '__fish_seen_subcommand_from next' -s p -l priority -d 'Weight by smoothness'
complete -c sway -f -n '__fish_seen_subcommand_from next' -l seed -d 'Seed the random pick'

# practice options
complete -c sway -f -n '__fish_seen_subcommand_from practice' -l bpm -d 'Tempo in beats per minute'
complete -c sway -f -n '__fish_seen_subcommand_from practice' -l accent-every -d 'Accent every n-th beat'
complete -c sway -f -n '__fish_seen_subcommand_from practice' -l count-in -d 'Count-in beats'
complete -c sway -f -n '__fish_seen_subcommand_from practice' -l every -d 'Beats between announcements'
complete -c sway -f -n '__fish_seen_subcommand_from practice' -l beats -d 'Stop after this many beats'
complete -c sway -f -n '__fish_seen_subcommand_from practice' -s p -l priority -d 'Weight by smoothness'
complete -c sway -f -n '__fish_seen_subcommand_from practice' -l no-click -d 'Disable the metronome click'
complete -c sway -f -n '__fish_seen_subcommand_from practice' -l no-voice -d 'Disable voice announcements'
complete -c sway -f -n '__fish_seen_subcommand_from practice' -l save -d 'Save the danced sequence'

# completion commands
complete -c sway -f -n '__fish_seen_subcommand_from completion completion-enhanced' -a 'bash zsh fish power-shell elvish' -d 'Shell'
"#
    );
}

/// Generate enhanced bash completion script with move name completion
pub fn generate_enhanced_bash_completion() {
    println!(
        r#"# Enhanced Sway completion script for Bash with move name completion
# Install with: sway completion-enhanced bash > ~/.local/share/bash-completion/completions/sway

_sway_complete_moves() {{
    if command -v sway >/dev/null 2>&1; then
        sway complete-moves 2>/dev/null
    fi
}}

_sway() {{
    local cur prev commands
    COMPREPLY=()
    cur="${{COMP_WORDS[COMP_CWORD]}}"
    prev="${{COMP_WORDS[COMP_CWORD-1]}}"
    commands="init add-move connect list graph next practice sequences completion completion-enhanced help"

    if [[ ${{COMP_CWORD}} -eq 1 ]]; then
        COMPREPLY=( $(compgen -W "${{commands}}" -- "${{cur}}") )
        return 0
    fi

    case "${{COMP_WORDS[1]}}" in
        connect|graph|next|practice)
            local IFS=$'\n'
            COMPREPLY=( $(compgen -W "$(_sway_complete_moves)" -- "${{cur}}") )
            ;;
        completion|completion-enhanced)
            COMPREPLY=( $(compgen -W "bash zsh fish power-shell elvish" -- "${{cur}}") )
            ;;
    esac
    return 0
}}

complete -F _sway sway
"#
    );
}
