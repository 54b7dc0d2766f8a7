use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Target process unavailable: {0}")]
    TargetUnavailable(String),

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("Failed to write process memory at address {address:#x}: {message}")]
    MemoryWriteFailed { address: u64, message: String },

    #[error("Null pointer at depth {depth} while resolving chain (read from {address:#x})")]
    NullPointer { depth: usize, address: u64 },

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),

    #[error("Unsupported game version: {0}")]
    UnsupportedVersion(String),

    #[error("Failed to detect game version: {0}")]
    VersionDetectionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error means the target process went away
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Error::ProcessNotFound(_) | Error::ProcessOpenFailed(_) | Error::TargetUnavailable(_)
        )
    }

    /// Check if this error comes from a build the offset tables don't cover
    pub fn is_version_mismatch(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedVersion(_) | Error::VersionDetectionFailed(_)
        )
    }
}
