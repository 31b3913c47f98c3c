use thiserror::Error;

/// Errors surfaced by scan operations
///
/// Component failures are translated into this taxonomy at the scanner,
/// which is the only place that maps them onto scan outcomes.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A startup asset is missing or malformed; scanning cannot begin
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The recognition backend failed
    #[error("recognition failed: {0}")]
    Recognition(#[from] ClassifierError),

    /// A statistics lookup failed; surfaced once, never retried
    #[error("statistics lookup failed: {0}")]
    Repository(#[from] RepositoryError),

    /// Frame acquisition failed
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// A scan is already in flight; a busy signal, not a failure
    #[error("a scan is already in progress")]
    ScanInProgress,

    /// The recognition phase exceeded its deadline
    #[error("recognition timed out after {0} ms")]
    Timeout(u64),

    /// The session was reset while the scan was in flight
    #[error("scan discarded by session reset")]
    Cancelled,

    /// An owner selection referenced a seat that does not draft
    #[error("owner seat {0} out of range")]
    OwnerOutOfRange(u8),
}

/// Errors from classifier backends and the model server
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("request to model server failed: {0}")]
    Request(String),

    #[error("model server returned HTTP {0}")]
    Status(u16),

    #[error("unusable response from model server: {0}")]
    InvalidResponse(String),

    #[error("failed to encode region crop: {0}")]
    Encoding(String),

    #[error("region lies outside the frame: {0}")]
    OutOfFrame(String),

    #[error("failed to launch model server: {0}")]
    SpawnFailed(String),

    #[error("model server not ready: {0}")]
    NotReady(String),

    /// Restart budget exhausted; cleared only by explicit re-initialization
    #[error("model server unavailable after {0} failed restart attempts")]
    Unavailable(u32),
}

/// Errors from statistics repositories
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("statistics store unreadable: {0}")]
    Unreadable(String),

    #[error("statistics store malformed: {0}")]
    Malformed(String),
}

/// Errors from frame sources
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("frame capture failed: {0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    /// True for the busy signal, which callers treat as "try again later"
    pub fn is_busy(&self) -> bool {
        matches!(self, ScanError::ScanInProgress)
    }
}
