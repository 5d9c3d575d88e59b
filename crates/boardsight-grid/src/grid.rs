use boardsight_core::{Detection, ImageSize, Piece};
use log::debug;

use crate::{CollisionPolicy, GridParams, Square};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Board side length in cells.
pub const BOARD_SIZE: usize = 8;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidImageDimensions { width: u32, height: u32 },
}

/// Fixed 8x8 board; each cell holds at most one piece.
///
/// `cells[row][col]` with row 0 at the top of the image (rank 8) and column 0
/// at the left edge (file a).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OccupancyGrid {
    cells: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl OccupancyGrid {
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.cells[square.row][square.col]
    }

    #[inline]
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.cells[square.row][square.col] = piece;
    }

    pub fn rows(&self) -> &[[Option<Piece>; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Occupied cells in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, c)| c.map(|p| (Square { row, col }, p)))
        })
    }
}

/// Grid produced from one detection list.
#[derive(Clone, Debug)]
pub struct GridMapping {
    pub grid: OccupancyGrid,
    /// Cell assigned to each input detection, in input order.
    pub squares: Vec<Square>,
    /// Number of writes that hit an already occupied cell.
    pub collisions: usize,
}

/// Cell containing the pixel `(x, y)`, clamped onto the board.
pub(crate) fn cell_for_point(x: f32, y: f32, size: ImageSize) -> Square {
    let cell_w = size.width as f32 / BOARD_SIZE as f32;
    let cell_h = size.height as f32 / BOARD_SIZE as f32;
    let max = (BOARD_SIZE - 1) as f32;
    Square {
        row: (y / cell_h).floor().clamp(0.0, max) as usize,
        col: (x / cell_w).floor().clamp(0.0, max) as usize,
    }
}

/// Discretizes detection centers onto the 8x8 board.
#[derive(Clone, Debug, Default)]
pub struct GridMapper {
    params: GridParams,
}

impl GridMapper {
    pub fn new(params: GridParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &GridParams {
        &self.params
    }

    /// Map every detection onto a fresh grid.
    ///
    /// Each detection is written exactly once, in iteration order. Centers on
    /// or past the image edge land in the nearest border cell.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, detections), fields(width = size.width, height = size.height))
    )]
    pub fn map<'a, I>(&self, detections: I, size: ImageSize) -> Result<GridMapping, GridError>
    where
        I: IntoIterator<Item = &'a Detection>,
    {
        if !size.is_valid() {
            return Err(GridError::InvalidImageDimensions {
                width: size.width,
                height: size.height,
            });
        }

        let mut grid = OccupancyGrid::empty();
        let mut best = [[f32::NEG_INFINITY; BOARD_SIZE]; BOARD_SIZE];
        let mut squares = Vec::new();
        let mut collisions = 0usize;

        for det in detections {
            let (cx, cy) = det.bbox.center();
            let sq = cell_for_point(cx, cy, size);
            squares.push(sq);

            if let Some(previous) = grid.get(sq) {
                collisions += 1;
                debug!(
                    "cell {} collision: {} ({:.3}) vs {} ({:.3})",
                    sq,
                    previous,
                    best[sq.row][sq.col],
                    det.piece,
                    det.confidence
                );
            }

            let write = match self.params.collision {
                CollisionPolicy::LastWriteWins => true,
                CollisionPolicy::HighestConfidence => det.confidence >= best[sq.row][sq.col],
            };
            if write {
                grid.set(sq, Some(det.piece));
                best[sq.row][sq.col] = det.confidence;
            }
        }

        Ok(GridMapping {
            grid,
            squares,
            collisions,
        })
    }
}
