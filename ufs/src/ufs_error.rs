use std::io;
use thiserror::Error;

pub type UfsResult<T> = Result<T, UfsError>;

/// Everything the file system engine can fail with. Each kind maps onto a stable negative code
/// so that callers speaking the numeric protocol (the inspection tools, older clients) can still
/// tell them apart.
#[derive(Debug, Error)]
pub enum UfsError {
    #[error("invalid inode")]
    InvalidInode,
    #[error("invalid name")]
    InvalidName,
    #[error("invalid type")]
    InvalidType,
    #[error("invalid size")]
    InvalidSize,
    #[error("entry not found")]
    NotFound,
    #[error("not enough space")]
    NotEnoughSpace,
    #[error("directory not empty")]
    DirNotEmpty,
    #[error("unlinking not allowed")]
    UnlinkNotAllowed,
    #[error("corrupted super block")]
    CorruptedSuperBlock,
    #[error("disk error: {0}")]
    Disk(#[from] io::Error),
}

impl UfsError {
    pub fn code(&self) -> i32 {
        use UfsError::*;

        match self {
            InvalidInode => -1,
            InvalidName => -2,
            InvalidType => -3,
            InvalidSize => -4,
            NotFound => -5,
            NotEnoughSpace => -6,
            DirNotEmpty => -7,
            UnlinkNotAllowed => -8,
            CorruptedSuperBlock => -9,
            Disk(_) => -10,
        }
    }
}
