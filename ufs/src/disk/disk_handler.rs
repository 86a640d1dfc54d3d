use std::io;

/// Implementors provide block granular access to a physical disk or an image file. Block numbers
/// are absolute and every buffer is exactly `BLOCK_SIZE` bytes.
///
/// Writes issued between `begin_transaction` and `commit` must not reach the medium before the
/// commit, and must be discarded entirely by `rollback`. Reads issued inside a transaction see the
/// writes staged by that same transaction.
pub trait DiskHandler {
    /// Read one block.
    fn read_block(&self, block_number: u32) -> io::Result<Vec<u8>>;

    /// Write one block. Buffers shorter than a block are zero padded, longer ones are rejected.
    fn write_block(&mut self, block_number: u32, bytes: &[u8]) -> io::Result<()>;

    fn begin_transaction(&mut self) -> io::Result<()>;

    fn commit(&mut self) -> io::Result<()>;

    fn rollback(&mut self) -> io::Result<()>;

    /// The number of blocks on the device.
    fn block_count(&self) -> u32;
}
