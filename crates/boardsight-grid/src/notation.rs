//! FEN-style board notation.

use std::fmt;

use boardsight_core::Piece;
use serde::{Deserialize, Serialize};

use crate::{OccupancyGrid, Square, BOARD_SIZE};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum NotationError {
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {rank} describes {files} files")]
    RankWidth { rank: usize, files: usize },
    #[error("invalid character {ch:?} in rank {rank}")]
    InvalidChar { rank: usize, ch: char },
}

/// Position fields that cannot be read from a static image.
///
/// Defaults are the conventional placeholders: white to move, all castling
/// rights, no en-passant target, halfmove clock 0, fullmove number 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMetadata {
    pub side_to_move: char,
    pub castling: String,
    pub en_passant: String,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Default for PositionMetadata {
    fn default() -> Self {
        Self {
            side_to_move: 'w',
            castling: "KQkq".to_string(),
            en_passant: "-".to_string(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl fmt::Display for PositionMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.side_to_move,
            self.castling,
            self.en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

/// Placement field plus metadata; `Display` gives the full notation string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardNotation {
    pub placement: String,
    pub metadata: PositionMetadata,
}

impl BoardNotation {
    pub fn from_grid(grid: &OccupancyGrid) -> Self {
        Self {
            placement: encode_placement(grid),
            metadata: PositionMetadata::default(),
        }
    }
}

impl fmt::Display for BoardNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.placement, self.metadata)
    }
}

/// Rank-major placement field: rows top to bottom joined by `/`, runs of
/// empty cells written as a digit.
pub fn encode_placement(grid: &OccupancyGrid) -> String {
    let ranks: Vec<String> = grid
        .rows()
        .iter()
        .map(|row| {
            let mut out = String::with_capacity(BOARD_SIZE);
            let mut empty = 0u32;
            for cell in row {
                match cell {
                    None => empty += 1,
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.symbol());
                    }
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            out
        })
        .collect();
    ranks.join("/")
}

/// Full notation string with the default metadata suffix.
pub fn encode(grid: &OccupancyGrid) -> String {
    BoardNotation::from_grid(grid).to_string()
}

impl OccupancyGrid {
    /// Parse a placement field. Anything after the first whitespace (the
    /// metadata fields of a full notation string) is ignored.
    pub fn from_placement(notation: &str) -> Result<Self, NotationError> {
        let placement = notation.split_whitespace().next().unwrap_or("");
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != BOARD_SIZE {
            return Err(NotationError::RankCount(ranks.len()));
        }

        let mut grid = OccupancyGrid::empty();
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0usize;
            for ch in rank.chars() {
                if let Some(skip) = ch.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    col += skip as usize;
                } else {
                    let piece =
                        Piece::from_symbol(ch).ok_or(NotationError::InvalidChar { rank: row, ch })?;
                    if let Some(sq) = Square::new(row, col) {
                        grid.set(sq, Some(piece));
                    }
                    col += 1;
                }
            }
            if col != BOARD_SIZE {
                return Err(NotationError::RankWidth {
                    rank: row,
                    files: col,
                });
            }
        }
        Ok(grid)
    }
}
