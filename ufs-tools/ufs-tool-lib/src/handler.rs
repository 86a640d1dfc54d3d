use log::trace;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use ufs::{DiskHandler, BLOCK_SIZE};

/// A disk image stored in a regular file. Transactional writes are held in memory until
/// `commit`, which writes them out and syncs the file.
pub struct ImageHandler {
    file: RefCell<File>,
    block_count: u32,
    pending: Option<BTreeMap<u32, Vec<u8>>>,
}

impl ImageHandler {
    /// Opens an existing image. Trailing bytes that do not fill a block are ignored.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let block_count = file.metadata()?.len() / BLOCK_SIZE as u64;

        return Ok(Self::with_file(file, block_count as u32));
    }

    /// This will create a new zero filled image of `block_count` blocks, replacing any file at
    /// `path`.
    pub fn create<P: AsRef<Path>>(path: P, block_count: u32) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(block_count as u64 * BLOCK_SIZE as u64)?;

        return Ok(Self::with_file(file, block_count));
    }

    fn with_file(file: File, block_count: u32) -> Self {
        return Self {
            file: RefCell::new(file),
            block_count,
            pending: None,
        };
    }

    fn check_block(&self, block_number: u32) -> io::Result<()> {
        if block_number >= self.block_count {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "block {} out of range, the image holds {} blocks",
                    block_number, self.block_count
                ),
            ));
        }

        return Ok(());
    }

    fn write_through(&self, block_number: u32, bytes: &[u8]) -> io::Result<()> {
        let mut file = self.file.borrow_mut();

        file.seek(SeekFrom::Start(block_number as u64 * BLOCK_SIZE as u64))?;
        file.write_all(bytes)?;

        return Ok(());
    }
}

impl DiskHandler for ImageHandler {
    fn read_block(&self, block_number: u32) -> io::Result<Vec<u8>> {
        self.check_block(block_number)?;

        if let Some(bytes) = self.pending.as_ref().and_then(|p| p.get(&block_number)) {
            return Ok(bytes.clone());
        }

        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(block_number as u64 * BLOCK_SIZE as u64))?;

        let mut result = vec![0u8; BLOCK_SIZE];
        file.read_exact(&mut result)?;

        return Ok(result);
    }

    fn write_block(&mut self, block_number: u32, bytes: &[u8]) -> io::Result<()> {
        self.check_block(block_number)?;

        if bytes.len() > BLOCK_SIZE {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("{} bytes do not fit in a block", bytes.len()),
            ));
        }

        let mut block = bytes.to_vec();
        block.resize(BLOCK_SIZE, 0);

        return match self.pending.as_mut() {
            Some(pending) => {
                pending.insert(block_number, block);
                Ok(())
            }
            None => self.write_through(block_number, &block),
        };
    }

    fn begin_transaction(&mut self) -> io::Result<()> {
        if self.pending.is_some() {
            return Err(io::Error::new(
                ErrorKind::Other,
                "a transaction is already open",
            ));
        }

        self.pending = Some(BTreeMap::new());
        return Ok(());
    }

    fn commit(&mut self) -> io::Result<()> {
        let pending = match self.pending.take() {
            Some(p) => p,
            None => return Ok(()),
        };

        for (block_number, bytes) in pending.iter() {
            self.write_through(*block_number, bytes)?;
        }

        self.file.borrow().sync_data()?;
        trace!("flushed {} blocks", pending.len());

        return Ok(());
    }

    fn rollback(&mut self) -> io::Result<()> {
        if let Some(pending) = self.pending.take() {
            trace!("discarded {} blocks", pending.len());
        }

        return Ok(());
    }

    fn block_count(&self) -> u32 {
        return self.block_count;
    }
}
