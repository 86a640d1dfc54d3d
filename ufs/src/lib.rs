mod bitmap;
mod byte_serializable;
mod disk;
pub mod ds3;
pub mod fs;
mod ufs_error;

pub use bitmap::{clear_bit, count_available, first_available, get_bit, set_bit};
pub use byte_serializable::ByteSerializable;
pub use disk::*;
pub use fs::{DirectoryListing, LocalFileSystem};
pub use ufs_error::{UfsError, UfsResult};

/// Size of every block on the device, in bytes.
pub const BLOCK_SIZE: usize = 4096;
/// Number of direct block pointers held by an inode.
pub const DIRECT_PTRS: usize = 30;
/// Largest file (or directory) an inode can describe.
pub const MAX_FILE_SIZE: usize = DIRECT_PTRS * BLOCK_SIZE;
/// Width of the name field of a directory entry, including the terminating NUL.
pub const DIR_ENT_NAME_SIZE: usize = 28;
/// The inode number of the root directory.
pub const ROOT_INODE: InodeNumber = 0;

/// Inode numbers are signed on disk so that `-1` can mark unused directory slots.
pub type InodeNumber = i32;
