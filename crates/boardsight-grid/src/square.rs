use serde::{Deserialize, Serialize};
use std::fmt;

use crate::BOARD_SIZE;

/// A board cell in image orientation: `row` 0 is rank 8, `col` 0 is file a.
/// Both indices are always in `0..8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "SquareIndices")]
pub struct Square {
    pub(crate) row: usize,
    pub(crate) col: usize,
}

#[derive(Deserialize)]
struct SquareIndices {
    row: usize,
    col: usize,
}

impl TryFrom<SquareIndices> for Square {
    type Error = String;

    fn try_from(ix: SquareIndices) -> Result<Self, Self::Error> {
        Square::new(ix.row, ix.col)
            .ok_or_else(|| format!("square ({}, {}) is off the board", ix.row, ix.col))
    }
}

impl Square {
    /// `None` when either index is outside `0..8`.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Self { row, col })
    }

    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    #[inline]
    pub fn col(&self) -> usize {
        self.col
    }

    /// Algebraic name, e.g. `a8` for `(0, 0)` and `h1` for `(7, 7)`.
    pub fn algebraic(&self) -> String {
        let file = (b'a' + self.col as u8) as char;
        let rank = BOARD_SIZE - self.row;
        format!("{file}{rank}")
    }

    pub fn from_algebraic(name: &str) -> Option<Self> {
        let bytes = name.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = bytes[0].checked_sub(b'a')? as usize;
        let rank = bytes[1].checked_sub(b'0')? as usize;
        if !(1..=BOARD_SIZE).contains(&rank) {
            return None;
        }
        Square::new(BOARD_SIZE - rank, col)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.algebraic())
    }
}
