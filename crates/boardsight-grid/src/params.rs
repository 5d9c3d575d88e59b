use serde::{Deserialize, Serialize};

/// What happens when two detections land on the same cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The later detection in processing order overwrites the earlier one.
    #[default]
    LastWriteWins,
    /// The cell keeps the detection with the higher confidence; ties go to
    /// the later one.
    HighestConfidence,
}

/// Parameters for the grid mapper.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    #[serde(default)]
    pub collision: CollisionPolicy,
}
