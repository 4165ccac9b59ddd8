//! # OSD Module
//!
//! On-screen display output for link quality.
//!
//! This module handles:
//! - The [`DisplayPort`] seam that elements draw into
//! - A character-grid display used for terminal output and tests
//! - The link quality element with its low-quality alarm

pub mod element;

/// PAL character grid width
pub const OSD_COLUMNS: usize = 30;
/// PAL character grid height
pub const OSD_ROWS: usize = 16;

/// Character cell display the OSD draws into
#[cfg_attr(test, mockall::automock)]
pub trait DisplayPort {
    /// Write `text` starting at column `x`, row `y`
    fn write_string(&mut self, x: u8, y: u8, text: &str);
}

/// In-memory character grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDisplay {
    cells: Vec<[char; OSD_COLUMNS]>,
}

impl Default for TextDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDisplay {
    /// Blank display of [`OSD_COLUMNS`] x [`OSD_ROWS`]
    pub fn new() -> Self {
        Self {
            cells: vec![[' '; OSD_COLUMNS]; OSD_ROWS],
        }
    }

    /// Blank every cell
    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(' ');
        }
    }

    /// Contents of row `y`, or an empty string when off screen
    pub fn row(&self, y: u8) -> String {
        self.cells
            .get(y as usize)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    /// `len` characters of row `y` starting at column `x`
    pub fn substring(&self, x: u8, y: u8, len: usize) -> String {
        self.row(y).chars().skip(x as usize).take(len).collect()
    }

    /// Whether every cell is blank
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|row| row.iter().all(|&c| c == ' '))
    }
}

impl DisplayPort for TextDisplay {
    fn write_string(&mut self, x: u8, y: u8, text: &str) {
        let Some(row) = self.cells.get_mut(y as usize) else {
            return;
        };

        // Text running past the right edge is cut off
        for (cell, c) in row.iter_mut().skip(x as usize).zip(text.chars()) {
            *cell = c;
        }
    }
}
