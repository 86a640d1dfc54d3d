use std::io;
use thiserror::Error;
use ufs::UfsError;

pub type ToolResult<T> = Result<T, ToolError>;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Fs(#[from] UfsError),
    #[error("{0}")]
    InvalidArgument(String),
}

impl ToolError {
    /// The engine's numeric code when the failure came from the file system.
    pub fn fs_code(&self) -> Option<i32> {
        return match self {
            ToolError::Fs(e) => Some(e.code()),
            _ => None,
        };
    }
}
