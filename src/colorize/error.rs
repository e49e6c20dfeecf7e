use thiserror::Error;

/// Errors that can occur while fetching features or deriving colors
///
/// Cloneable so the latest failure can sit in the observable display state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    /// The remote feature call was rejected
    #[error("Remote call error: {0}")]
    Rpc(String),

    /// The display's own track is not among the view's tracks
    #[error("Track '{0}' is not shown in the view")]
    MissingTrack(String),

    /// The track configuration has no adapter
    #[error("Track '{0}' has no adapter configuration")]
    MissingAdapter(String),

    /// Configuration error (unknown property values, malformed JSON, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Palette definitions could not be read
    #[error("Palette error: {0}")]
    Palette(String),

    /// The remote call was dropped before it resolved
    #[error("Remote call cancelled")]
    Cancelled,
}

/// Type alias for Results using DisplayError
pub type Result<T> = std::result::Result<T, DisplayError>;
