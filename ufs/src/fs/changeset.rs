use crate::{ByteSerializable, DiskHandler, BLOCK_SIZE};
use log::{trace, warn};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io;

/// Every block a mutating operation is going to write, fully materialised before the device is
/// touched. Nothing reaches the disk until `commit`, which hands the whole set to a single device
/// transaction.
#[derive(Debug, Default)]
pub(crate) struct Changeset {
    blocks: BTreeMap<u32, Vec<u8>>,
}

impl Changeset {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Replace a whole block. Short buffers are zero padded.
    pub fn stage(&mut self, block_number: u32, mut bytes: Vec<u8>) {
        bytes.resize(BLOCK_SIZE, 0);
        self.blocks.insert(block_number, bytes);
    }

    /// The staged contents of a block, loading the current on-disk contents the first time the
    /// block is touched.
    pub fn block_mut<D: DiskHandler>(
        &mut self,
        disk: &D,
        block_number: u32,
    ) -> io::Result<&mut Vec<u8>> {
        return match self.blocks.entry(block_number) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let mut bytes = disk.read_block(block_number)?;
                bytes.resize(BLOCK_SIZE, 0);
                Ok(e.insert(bytes))
            }
        };
    }

    /// Patch a fixed-size record into a block at a byte offset.
    pub fn write_record<D: DiskHandler, T: ByteSerializable>(
        &mut self,
        disk: &D,
        block_number: u32,
        offset: usize,
        record: &T,
    ) -> io::Result<()> {
        let block = self.block_mut(disk, block_number)?;
        record.write_to(block, offset);

        return Ok(());
    }

    /// Stage the blocks of a multi-block region (a bitmap) whose contents differ from `original`.
    /// Both buffers span the whole region.
    pub fn stage_region_changes(&mut self, start: u32, original: &[u8], updated: &[u8]) {
        let chunks = original.chunks(BLOCK_SIZE).zip(updated.chunks(BLOCK_SIZE));

        for (i, (before, after)) in chunks.enumerate() {
            if before != after {
                self.stage(start + i as u32, after.to_vec());
            }
        }
    }

    pub fn len(&self) -> usize {
        return self.blocks.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.blocks.is_empty();
    }

    /// Write every staged block inside one transaction. If any write or the commit itself fails
    /// the transaction is rolled back and the first error returned.
    pub fn commit<D: DiskHandler>(self, disk: &mut D) -> io::Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        disk.begin_transaction()?;

        for (block_number, bytes) in self.blocks.iter() {
            if let Err(e) = disk.write_block(*block_number, bytes) {
                warn!("write of block {} failed, rolling back: {}", block_number, e);
                disk.rollback()?;
                return Err(e);
            }
        }

        if let Err(e) = disk.commit() {
            warn!("commit failed, rolling back: {}", e);
            disk.rollback()?;
            return Err(e);
        }

        trace!("committed {} blocks", self.len());

        return Ok(());
    }
}
