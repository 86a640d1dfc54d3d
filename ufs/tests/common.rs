#![allow(dead_code)]
extern crate ufs;
use std::collections::BTreeMap;
use std::io;
use ufs::{DiskHandler, LocalFileSystem, BLOCK_SIZE};

/// An in-memory device. Writes inside a transaction land in an overlay that reads see and that
/// commit folds into `disk`.
pub struct Handler {
    pub disk: Vec<u8>,
    pending: Option<BTreeMap<u32, Vec<u8>>>,
    /// Writes to this block fail, for exercising rollback.
    pub fail_writes_to: Option<u32>,
    pub commits: usize,
}

impl Handler {
    pub fn new(blocks: usize) -> Self {
        return Self {
            disk: vec![0u8; blocks * BLOCK_SIZE],
            pending: None,
            fail_writes_to: None,
            commits: 0,
        };
    }

    pub fn dump_disk(&self) -> Vec<u8> {
        return self.disk.clone();
    }

    pub fn block(&self, block_number: u32) -> &[u8] {
        let start = block_number as usize * BLOCK_SIZE;
        return &self.disk[start..start + BLOCK_SIZE];
    }

    fn check_range(&self, block_number: u32) -> io::Result<()> {
        if block_number >= self.block_count() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("block {} out of range", block_number),
            ));
        }

        return Ok(());
    }
}

impl DiskHandler for Handler {
    fn read_block(&self, block_number: u32) -> io::Result<Vec<u8>> {
        self.check_range(block_number)?;

        if let Some(bytes) = self.pending.as_ref().and_then(|p| p.get(&block_number)) {
            return Ok(bytes.clone());
        }

        return Ok(self.block(block_number).to_vec());
    }

    fn write_block(&mut self, block_number: u32, bytes: &[u8]) -> io::Result<()> {
        self.check_range(block_number)?;

        if self.fail_writes_to == Some(block_number) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write failure"));
        }

        let mut bytes = bytes.to_vec();
        bytes.resize(BLOCK_SIZE, 0);

        match self.pending.as_mut() {
            Some(pending) => {
                pending.insert(block_number, bytes);
            }
            None => {
                let start = block_number as usize * BLOCK_SIZE;
                self.disk[start..start + BLOCK_SIZE].copy_from_slice(&bytes);
            }
        }

        return Ok(());
    }

    fn begin_transaction(&mut self) -> io::Result<()> {
        self.pending = Some(BTreeMap::new());
        return Ok(());
    }

    fn commit(&mut self) -> io::Result<()> {
        if let Some(pending) = self.pending.take() {
            for (block_number, bytes) in pending {
                let start = block_number as usize * BLOCK_SIZE;
                self.disk[start..start + BLOCK_SIZE].copy_from_slice(&bytes);
            }
        }

        self.commits += 1;
        return Ok(());
    }

    fn rollback(&mut self) -> io::Result<()> {
        self.pending = None;
        return Ok(());
    }

    fn block_count(&self) -> u32 {
        return (self.disk.len() / BLOCK_SIZE) as u32;
    }
}

/// A formatted image with 32 inodes and 32 data blocks (36 blocks in total).
pub fn new_filesystem() -> LocalFileSystem<Handler> {
    return new_filesystem_with(32, 32);
}

pub fn new_filesystem_with(num_inodes: u32, num_data: u32) -> LocalFileSystem<Handler> {
    let sb = ufs::SuperBlock::with_capacity(num_inodes, num_data);
    let handler = Handler::new(sb.total_blocks() as usize);

    return LocalFileSystem::format(handler, num_inodes, num_data).unwrap();
}

pub fn free_data_blocks(fs: &LocalFileSystem<Handler>) -> usize {
    let sb = fs.read_super_block().unwrap();
    return ufs::count_available(&fs.read_data_bitmap().unwrap(), sb.num_data as usize);
}

pub fn free_inodes(fs: &LocalFileSystem<Handler>) -> usize {
    let sb = fs.read_super_block().unwrap();
    return ufs::count_available(&fs.read_inode_bitmap().unwrap(), sb.num_inodes as usize);
}
