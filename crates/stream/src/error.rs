use dashstream_timeline::SpeedError;

/// Errors from configuration loading and level loads.
///
/// A level load that fails leaves the world empty; no partial level is kept.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row {row}: item type index {index} is unknown (official content: {official})")]
    UnknownItemType {
        row: usize,
        index: usize,
        official: bool,
    },
    #[error("row {row}: no prefab for item type index {index}")]
    MissingPrefab { row: usize, index: usize },
    #[error("invalid level speed: {0}")]
    Speed(#[from] SpeedError),
}
