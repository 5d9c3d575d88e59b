//! Board-state reconstruction from piece detections.
//!
//! ## Quickstart
//!
//! ```
//! use boardsight_core::{BoundingBox, ImageSize, RawDetection};
//! use boardsight_grid::{encode_placement, GridMapper, GridParams};
//!
//! let size = ImageSize::new(640, 640);
//! let king = RawDetection::new("white-king", 0.9, BoundingBox::new(100.0, 100.0, 140.0, 140.0))
//!     .normalize("specialist", size)
//!     .unwrap();
//!
//! let mapping = GridMapper::new(GridParams::default()).map([&king], size).unwrap();
//! assert_eq!(encode_placement(&mapping.grid), "8/1K6/8/8/8/8/8/8");
//! ```
//!
//! Pipeline:
//! 1. Take the center of each detection box.
//! 2. Divide the image into 8x8 equal cells; row 0 is the top of the image
//!    (rank 8), column 0 the left edge (file a).
//! 3. Clamp the cell index into `[0, 7]` on each axis.
//! 4. Write the canonical symbol; collisions follow [`CollisionPolicy`].
//! 5. Serialize rank by rank with run-length encoded empty squares.

mod grid;
mod notation;
mod params;
mod square;

pub use grid::{GridError, GridMapper, GridMapping, OccupancyGrid, BOARD_SIZE};
pub use notation::{encode, encode_placement, BoardNotation, NotationError, PositionMetadata};
pub use params::{CollisionPolicy, GridParams};
pub use square::Square;
