// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Display metadata for known sessions.
//!
//! Transcript files are named after the session they record
//! (`day1-01-initial-appraisal.jsonl`). A [`SessionCatalog`] maps those file
//! stems to a display date and title; stems it does not know get a title
//! derived from the stem itself.

use serde::Deserialize;
use snafu::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Error type for loading a session catalog from JSON.
#[derive(Debug, Snafu)]
pub enum CatalogError {
    /// Failed to read the catalog file.
    #[snafu(display("failed to read session table {}: {source}", path.display()))]
    ReadCatalog {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The catalog is not a valid JSON object of session entries.
    #[snafu(display("invalid session table: {source}"))]
    InvalidCatalog {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },
}

/// Date and title shown in a rendered transcript's header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionMeta {
    /// Human-readable date, e.g. "February 10, 2026".
    pub date: String,
    /// Session title.
    pub title: String,
}

impl SessionMeta {
    /// Creates session metadata from a date and title.
    pub fn new(date: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            title: title.into(),
        }
    }

    /// Metadata for a stem with no catalog entry.
    ///
    /// The date is `Unknown` and the title is [`humanize_stem`] of the stem.
    #[must_use]
    pub fn fallback(stem: &str) -> Self {
        Self::new("Unknown", humanize_stem(stem))
    }
}

const BUILTIN_SESSIONS: &[(&str, &str, &str)] = &[
    (
        "day1-01-initial-appraisal",
        "February 10, 2026",
        "Day 1, Session 1 \u{2014} Initial Appraisal",
    ),
    (
        "day1-02-footsteps-crickets-spatial-audio",
        "February 10, 2026",
        "Day 1, Session 2 \u{2014} Footsteps, Crickets & Spatial Audio",
    ),
    (
        "day1-03-water-ponds-shores",
        "February 10, 2026",
        "Day 1, Session 3 \u{2014} Water, Ponds & Shores",
    ),
    (
        "day2-01-shadows-creatures-morepork",
        "February 11, 2026",
        "Day 2, Session 1 \u{2014} Shadows, Creatures & Morepork",
    ),
    (
        "day2-02-shadows-creatures-continued",
        "February 11, 2026",
        "Day 2, Session 2 \u{2014} Shadows & Creatures Continued",
    ),
    (
        "day2-03-moon-shadows-water-ambience",
        "February 11, 2026",
        "Day 2, Session 3 \u{2014} Moon Shadows & Water Ambience",
    ),
    (
        "day3-01-collectibles-minimap-terrain",
        "February 12, 2026",
        "Day 3, Session 1 \u{2014} Collectibles, Minimap & Terrain",
    ),
    (
        "day3-02-water-edge-effects",
        "February 12, 2026",
        "Day 3, Session 2 \u{2014} Water Edge Effects",
    ),
    (
        "day4-01-cloud-diversity",
        "February 13, 2026",
        "Day 4, Session 1 \u{2014} Cloud Diversity",
    ),
    (
        "day4-02-weather-system",
        "February 13, 2026",
        "Day 4, Session 2 \u{2014} Weather System",
    ),
    (
        "day4-03-weather-polish-stormy-water",
        "February 13, 2026",
        "Day 4, Session 3 \u{2014} Weather Polish & Stormy Water",
    ),
];

/// Read-only lookup from file stem to [`SessionMeta`].
///
/// # Example
///
/// ```
/// use transcript2md::sessions::{SessionCatalog, SessionMeta};
///
/// let mut catalog = SessionCatalog::empty();
/// catalog.insert("intro", SessionMeta::new("May 1", "Kickoff"));
///
/// assert_eq!(catalog.resolve("intro").title, "Kickoff");
/// assert_eq!(catalog.resolve("bug-bash-2").title, "Bug Bash 2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCatalog {
    entries: HashMap<String, SessionMeta>,
}

impl SessionCatalog {
    /// A catalog with no entries; every stem resolves to its fallback.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The sessions of the VR Endless Forest development log.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for (stem, date, title) in BUILTIN_SESSIONS {
            catalog.insert(*stem, SessionMeta::new(*date, *title));
        }
        catalog
    }

    /// Parses a catalog from a JSON object of `stem -> {date, title}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or an entry lacks a field.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let entries = serde_json::from_str(json).context(InvalidCatalogSnafu)?;
        Ok(Self { entries })
    }

    /// Reads a catalog from a JSON file. See [`SessionCatalog::from_json_str`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).context(ReadCatalogSnafu { path })?;
        Self::from_json_str(&json)
    }

    /// Adds or replaces the entry for `stem`.
    pub fn insert(&mut self, stem: impl Into<String>, meta: SessionMeta) {
        self.entries.insert(stem.into(), meta);
    }

    /// Merges `other` into this catalog; its entries win on conflict.
    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Number of known sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up `stem`, falling back to [`SessionMeta::fallback`].
    #[must_use]
    pub fn resolve(&self, stem: &str) -> SessionMeta {
        self.entries
            .get(stem)
            .cloned()
            .unwrap_or_else(|| SessionMeta::fallback(stem))
    }
}

/// Turns a file stem into a title.
///
/// Dashes become spaces and every run of letters is capitalized:
/// `day5-01-night-sky` becomes `Day5 01 Night Sky`.
#[must_use]
pub fn humanize_stem(stem: &str) -> String {
    let mut title = String::with_capacity(stem.len());
    let mut in_word = false;

    for c in stem.chars() {
        let c = if c == '-' { ' ' } else { c };
        if c.is_alphabetic() {
            if in_word {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            title.push(c);
            in_word = false;
        }
    }

    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_knows_all_sessions() {
        let catalog = SessionCatalog::builtin();
        assert_eq!(catalog.len(), 11);

        let meta = catalog.resolve("day2-03-moon-shadows-water-ambience");
        assert_eq!(meta.date, "February 11, 2026");
        assert_eq!(meta.title, "Day 2, Session 3 — Moon Shadows & Water Ambience");
    }

    #[test]
    fn unknown_stem_falls_back() {
        let meta = SessionCatalog::builtin().resolve("day5-01-night-sky");
        assert_eq!(meta, SessionMeta::new("Unknown", "Day5 01 Night Sky"));
    }

    #[test]
    fn humanize_matches_title_case() {
        assert_eq!(humanize_stem("initial-appraisal"), "Initial Appraisal");
        assert_eq!(humanize_stem("LOUD-stem"), "Loud Stem");
        assert_eq!(humanize_stem("abc1def"), "Abc1Def");
        assert_eq!(humanize_stem("snake_case"), "Snake_Case");
        assert_eq!(humanize_stem(""), "");
    }

    #[test]
    fn parses_catalog_json() {
        let catalog = SessionCatalog::from_json_str(
            r#"{
                "kickoff": { "date": "March 1, 2026", "title": "Kickoff" },
                "retro": { "date": "March 9, 2026", "title": "Retrospective" }
            }"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.resolve("retro").date, "March 9, 2026");
    }

    #[test]
    fn rejects_catalog_with_missing_fields() {
        let result = SessionCatalog::from_json_str(r#"{"kickoff": {"date": "March 1"}}"#);
        assert!(matches!(result, Err(CatalogError::InvalidCatalog { .. })));
    }

    #[test]
    fn extend_overrides_existing_entries() {
        let mut catalog = SessionCatalog::builtin();
        let mut overrides = SessionCatalog::empty();
        overrides.insert("day1-01-initial-appraisal", SessionMeta::new("Today", "Renamed"));
        catalog.extend(overrides);

        assert_eq!(catalog.len(), 11);
        assert_eq!(
            catalog.resolve("day1-01-initial-appraisal"),
            SessionMeta::new("Today", "Renamed")
        );
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        let result = SessionCatalog::from_path(Path::new("/nonexistent/sessions.json"));
        assert!(matches!(result, Err(CatalogError::ReadCatalog { .. })));
    }
}
