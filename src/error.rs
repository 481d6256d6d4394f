use thiserror::Error;

/// Errors raised while driving the browser or converting a captured page
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Script evaluation failed: {0}")]
    EvaluationFailed(String),

    /// The element query returned something that is not a path -> record map
    #[error("Failed to parse element query result: {0}")]
    DomParseFailed(String),

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Path '{path}' appears more than once (as '{first}' and '{second}')")]
    DuplicatePath { path: String, first: String, second: String },

    #[error("Document has more than one root: '{first}' and '{second}'")]
    MultipleRoots { first: String, second: String },

    #[error("Path '{path}' has no parent entry '{missing}' in the query result")]
    MissingAncestor { path: String, missing: String },

    #[error("No record for path '{0}' in the query result")]
    MissingRecord(String),

    #[error("Cannot determine tag for path '{0}'")]
    MissingTag(String),

    #[error("Query result contains no elements")]
    EmptyDocument,

    #[error("Frame at '{path}' is unavailable: {reason}")]
    FrameUnavailable { path: String, reason: String },

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Cannot capture objects of kind '{0}'")]
    UnsupportedTarget(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SnapshotError {
    /// Whether this error means the query result was internally inconsistent
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            SnapshotError::InvalidPath { .. }
                | SnapshotError::DuplicatePath { .. }
                | SnapshotError::MultipleRoots { .. }
                | SnapshotError::MissingAncestor { .. }
                | SnapshotError::MissingRecord(_)
                | SnapshotError::MissingTag(_)
                | SnapshotError::EmptyDocument
        )
    }
}

pub type Result<T> = std::result::Result<T, SnapshotError>;
