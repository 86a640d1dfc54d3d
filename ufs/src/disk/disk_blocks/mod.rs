mod dir_entry;
mod inode;
mod super_block;

pub use dir_entry::{DirEntry, UNUSED_INODE};
pub(crate) use inode::blocks_for;
pub use inode::{Inode, InodeType, UNUSED_BLOCK};
pub use super_block::SuperBlock;
