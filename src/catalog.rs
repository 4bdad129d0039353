//! # Move Catalog Module
//!
//! Storage layer for everything the practice algorithms work on: dance
//! moves, the directed connections between them, and saved practice
//! sequences. The whole catalog lives in one pretty-printed JSON file in
//! the platform data directory (see [`crate::config`]).
//!
//! Moves are treated as immutable value data by the selection and
//! announcement code; all mutation happens here, at edit time.

use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A single dance move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Stable unique identifier, derived from the name at creation time.
    pub id: String,
    /// Display name, as announced during practice.
    pub name: String,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

/// A directed edge between two moves.
///
/// `smoothness` is clamped into [1, 5] when the connection is edited;
/// selection clamps again on read in case the file was edited by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from_id: String,
    pub to_id: String,
    /// How smoothly the transition flows, 1 (clunky) to 5 (seamless).
    pub smoothness: i32,
    /// Whether the transition is usable at all. A connection with
    /// `works == false` is never eligible for selection.
    pub works: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A saved practice sequence: the ordered move ids a session walked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    pub moves: Vec<String>,
}

/// The on-disk catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub moves: Vec<Move>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub sequences: Vec<Sequence>,
}

/// Range the smoothness score is kept in.
pub const SMOOTHNESS_MIN: i32 = 1;
pub const SMOOTHNESS_MAX: i32 = 5;

impl Catalog {
    /// Read the catalog from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not valid catalog JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog at {}", path.display()))?;
        let catalog: Catalog = serde_json::from_str(&raw)
            .with_context(|| format!("Catalog at {} is not valid JSON", path.display()))?;
        debug!(
            "Loaded catalog: {} moves, {} connections, {} sequences",
            catalog.moves.len(),
            catalog.connections.len(),
            catalog.sequences.len()
        );
        Ok(catalog)
    }

    /// Read the catalog from `path`, or start an empty one if the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No catalog at {}, starting empty", path.display());
            Ok(Self::default())
        }
    }

    /// Write the catalog to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("Failed to serialize catalog")?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write catalog to {}", path.display()))?;
        info!("Saved catalog to {}", path.display());
        Ok(())
    }

    /// Look up a move by its exact id.
    #[must_use]
    pub fn move_by_id(&self, id: &str) -> Option<&Move> {
        self.moves.iter().find(|m| m.id == id)
    }

    /// Resolve a user-supplied query to a move.
    ///
    /// Tries, in order: exact id, exact name (case-insensitive), then the
    /// first case-insensitive substring match on the name. The ordering
    /// makes ids always win, so scripts can rely on them.
    #[must_use]
    pub fn find_move(&self, query: &str) -> Option<&Move> {
        let query = query.trim();
        if let Some(found) = self.move_by_id(query) {
            return Some(found);
        }
        let lowered = query.to_lowercase();
        if let Some(found) = self.moves.iter().find(|m| m.name.to_lowercase() == lowered) {
            return Some(found);
        }
        self.moves
            .iter()
            .find(|m| m.name.to_lowercase().contains(&lowered))
    }

    /// Add a new move, deriving a unique slug id from the name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or only whitespace.
    pub fn add_move(&mut self, name: &str, notes: &str) -> Result<&Move> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Move name cannot be empty");
        }

        let base = slugify(name);
        let mut id = base.clone();
        let mut n = 2;
        while self.move_by_id(&id).is_some() {
            id = format!("{base}-{n}");
            n += 1;
        }

        self.moves.push(Move {
            id,
            name: name.to_string(),
            notes: notes.to_string(),
        });
        info!("Added move '{}'", name);
        Ok(self.moves.last().expect("just pushed"))
    }

    /// Create or update the connection `from_id -> to_id`.
    ///
    /// Smoothness is clamped into [1, 5] here; callers may pass any
    /// integer. Returns `true` if an existing connection was updated.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint id is not in the catalog.
    pub fn upsert_connection(
        &mut self,
        from_id: &str,
        to_id: &str,
        smoothness: i32,
        works: bool,
        notes: Option<String>,
    ) -> Result<bool> {
        if self.move_by_id(from_id).is_none() {
            bail!("Unknown move id: {from_id}");
        }
        if self.move_by_id(to_id).is_none() {
            bail!("Unknown move id: {to_id}");
        }

        let smoothness = smoothness.clamp(SMOOTHNESS_MIN, SMOOTHNESS_MAX);

        if let Some(existing) = self
            .connections
            .iter_mut()
            .find(|c| c.from_id == from_id && c.to_id == to_id)
        {
            existing.smoothness = smoothness;
            existing.works = works;
            existing.notes = notes;
            debug!("Updated connection {from_id} -> {to_id}");
            return Ok(true);
        }

        self.connections.push(Connection {
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            smoothness,
            works,
            notes,
        });
        debug!("Added connection {from_id} -> {to_id}");
        Ok(false)
    }

    /// All connections departing from the given move id.
    #[must_use]
    pub fn connections_from(&self, id: &str) -> Vec<&Connection> {
        self.connections.iter().filter(|c| c.from_id == id).collect()
    }
}

/// Lowercase the name and replace runs of non-alphanumerics with single
/// dashes, so "Cross Body Lead" becomes "cross-body-lead".
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("move");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.add_move("Basic Step", "the home base").unwrap();
        catalog.add_move("Cross Body Lead", "").unwrap();
        catalog.add_move("Right Turn", "").unwrap();
        catalog
            .upsert_connection("basic-step", "cross-body-lead", 5, true, None)
            .unwrap();
        catalog
            .upsert_connection("basic-step", "right-turn", 2, true, Some("rushed".into()))
            .unwrap();
        catalog
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("catalog.json");

        let catalog = sample_catalog();
        catalog.save(&path).expect("Save should succeed");

        let loaded = Catalog::load(&path).expect("Load should succeed");
        assert_eq!(loaded.moves, catalog.moves);
        assert_eq!(loaded.connections, catalog.connections);
        assert_eq!(loaded.sequences, catalog.sequences);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nope.json");

        let catalog = Catalog::load_or_default(&path).expect("Missing file should be fine");
        assert!(catalog.moves.is_empty());
        assert!(catalog.connections.is_empty());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("catalog.json");
        std::fs::write(&path, "not json at all").unwrap();

        assert!(Catalog::load(&path).is_err(), "Garbage input must not parse");
    }

    #[test]
    fn test_find_move_resolution_order() {
        let catalog = sample_catalog();

        // Exact id wins.
        assert_eq!(catalog.find_move("basic-step").unwrap().name, "Basic Step");
        // Exact name, case-insensitive.
        assert_eq!(catalog.find_move("cross body lead").unwrap().id, "cross-body-lead");
        // Substring fallback.
        assert_eq!(catalog.find_move("turn").unwrap().id, "right-turn");
        // No match.
        assert!(catalog.find_move("dip").is_none());
    }

    #[test]
    fn test_add_move_uniquifies_ids() {
        let mut catalog = Catalog::default();
        let first = catalog.add_move("Spin", "").unwrap().id.clone();
        let second = catalog.add_move("Spin", "").unwrap().id.clone();
        let third = catalog.add_move("Spin!", "").unwrap().id.clone();

        assert_eq!(first, "spin");
        assert_eq!(second, "spin-2");
        assert_eq!(third, "spin-3");
    }

    #[test]
    fn test_add_move_rejects_empty_name() {
        let mut catalog = Catalog::default();
        assert!(catalog.add_move("   ", "").is_err());
    }

    #[test]
    fn test_upsert_connection_clamps_smoothness() {
        let mut catalog = sample_catalog();

        catalog
            .upsert_connection("basic-step", "right-turn", 99, true, None)
            .unwrap();
        let conn = catalog
            .connections_from("basic-step")
            .into_iter()
            .find(|c| c.to_id == "right-turn")
            .unwrap();
        assert_eq!(conn.smoothness, SMOOTHNESS_MAX);

        catalog
            .upsert_connection("basic-step", "right-turn", -4, true, None)
            .unwrap();
        let conn = catalog
            .connections_from("basic-step")
            .into_iter()
            .find(|c| c.to_id == "right-turn")
            .unwrap();
        assert_eq!(conn.smoothness, SMOOTHNESS_MIN);
    }

    #[test]
    fn test_upsert_connection_updates_in_place() {
        let mut catalog = sample_catalog();
        let before = catalog.connections.len();

        let updated = catalog
            .upsert_connection("basic-step", "cross-body-lead", 3, false, None)
            .unwrap();
        assert!(updated, "Existing edge should be updated, not duplicated");
        assert_eq!(catalog.connections.len(), before);

        let conn = catalog
            .connections_from("basic-step")
            .into_iter()
            .find(|c| c.to_id == "cross-body-lead")
            .unwrap();
        assert_eq!(conn.smoothness, 3);
        assert!(!conn.works);
    }

    #[test]
    fn test_upsert_connection_requires_known_ids() {
        let mut catalog = sample_catalog();
        assert!(catalog
            .upsert_connection("basic-step", "ghost", 3, true, None)
            .is_err());
        assert!(catalog
            .upsert_connection("ghost", "basic-step", 3, true, None)
            .is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Cross Body Lead"), "cross-body-lead");
        assert_eq!(slugify("  Dip & Hold  "), "dip-hold");
        assert_eq!(slugify("番号"), "番号");
        assert_eq!(slugify("!!!"), "move");
    }
}
