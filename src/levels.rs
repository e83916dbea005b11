//! Level catalog repository
//!
//! Levels live in a single text blob: ASCII layout grids separated by a
//! delimiter line of 21 semicolons. Each character of a layout row is a
//! brick token resolved by the brick registry (space = empty cell).
//! Parsing is pure; loading the same index twice yields the same grid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delimiter between layouts in the catalog blob
const LEVEL_DELIMITER: &str = ";;;;;;;;;;;;;;;;;;;;;";

/// Catalog shipped with the crate, used by the demo binary and tests.
const BUILTIN_CATALOG: &str = include_str!("../assets/levels.txt");

/// Errors from the level repository
#[derive(Debug, Error)]
pub enum LevelError {
    /// Requested level index past the end of the catalog
    #[error("level {index} not found (catalog has {count} levels)")]
    NotFound { index: usize, count: usize },

    /// Backing store unreadable
    #[error("failed to read level catalog")]
    Io(#[from] std::io::Error),

    /// Catalog contained no usable layouts
    #[error("level catalog is empty")]
    Empty,
}

/// A single level: an immutable grid of brick tokens plus its index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Layout rows, each character a brick token
    pub layout: Vec<String>,
    /// Zero-based index in the catalog
    pub number: usize,
}

impl Level {
    /// Length of the longest layout row (grid width in cells)
    pub fn width(&self) -> usize {
        self.layout.iter().map(|row| row.len()).max().unwrap_or(0)
    }

    /// Number of layout rows (grid height in cells)
    pub fn height(&self) -> usize {
        self.layout.len()
    }
}

/// A parsed level catalog.
#[derive(Debug, Clone)]
pub struct LevelSet {
    layouts: Vec<Vec<String>>,
}

impl LevelSet {
    /// Parse a catalog blob into a level set.
    pub fn from_str(blob: &str) -> Result<Self, LevelError> {
        let layouts: Vec<Vec<String>> = blob
            .split(LEVEL_DELIMITER)
            .filter(|chunk| !chunk.trim().is_empty())
            .map(|chunk| {
                chunk
                    .lines()
                    .skip_while(|line| line.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .collect();

        if layouts.is_empty() {
            return Err(LevelError::Empty);
        }

        log::debug!("parsed level catalog: {} levels", layouts.len());
        Ok(Self { layouts })
    }

    /// Read and parse a catalog file.
    pub fn load(path: &std::path::Path) -> Result<Self, LevelError> {
        let blob = std::fs::read_to_string(path)?;
        Self::from_str(&blob)
    }

    /// The catalog embedded in the crate.
    pub fn builtin() -> Self {
        Self::from_str(BUILTIN_CATALOG).expect("builtin catalog is non-empty")
    }

    /// Number of levels in the catalog.
    pub fn level_count(&self) -> usize {
        self.layouts.len()
    }

    /// Load the level at `index`.
    pub fn level(&self, index: usize) -> Result<Level, LevelError> {
        let layout = self
            .layouts
            .get(index)
            .ok_or(LevelError::NotFound {
                index,
                count: self.layouts.len(),
            })?
            .clone();
        Ok(Level {
            layout,
            number: index,
        })
    }
}
