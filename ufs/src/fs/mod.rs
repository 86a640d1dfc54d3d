mod changeset;
mod mkfs;
mod walk;

pub use walk::{DirectoryListing, MAX_WALK_DEPTH};

use crate::disk::blocks_for;
use crate::{
    clear_bit, count_available, first_available, get_bit, set_bit, ByteSerializable, DirEntry,
    DiskHandler, Inode, InodeNumber, InodeType, SuperBlock, UfsError, UfsResult, BLOCK_SIZE,
    DIRECT_PTRS, MAX_FILE_SIZE, UNUSED_BLOCK,
};
use changeset::Changeset;
use log::{debug, warn};

/// The local file system engine. Every call re-reads the super block from block 0 and every
/// mutating call commits all of its block writes in a single device transaction.
pub struct LocalFileSystem<D: DiskHandler> {
    disk: D,
}

impl<D: DiskHandler> LocalFileSystem<D> {
    /// Wraps an already formatted device.
    pub fn new(disk: D) -> Self {
        return Self { disk };
    }

    pub fn disk(&self) -> &D {
        return &self.disk;
    }

    pub fn into_disk(self) -> D {
        return self.disk;
    }

    pub fn read_super_block(&self) -> UfsResult<SuperBlock> {
        let block = self.disk.read_block(0)?;

        let super_block = match SuperBlock::from_bytes(&block) {
            Some(s) if s.is_consistent() => s,
            _ => return Err(UfsError::CorruptedSuperBlock),
        };

        if super_block.total_blocks() > self.disk.block_count() {
            warn!(
                "super block describes {} blocks but the device holds {}",
                super_block.total_blocks(),
                self.disk.block_count()
            );
            return Err(UfsError::CorruptedSuperBlock);
        }

        return Ok(super_block);
    }

    /// The whole inode bitmap region, one bit per inode.
    pub fn read_inode_bitmap(&self) -> UfsResult<Vec<u8>> {
        let sb = self.read_super_block()?;

        return self.read_region(sb.inode_bitmap_addr, sb.inode_bitmap_len);
    }

    /// The whole data bitmap region, one bit per data block.
    pub fn read_data_bitmap(&self) -> UfsResult<Vec<u8>> {
        let sb = self.read_super_block()?;

        return self.read_region(sb.data_bitmap_addr, sb.data_bitmap_len);
    }

    pub fn stat(&self, inum: InodeNumber) -> UfsResult<Inode> {
        let sb = self.read_super_block()?;

        return self.load_inode(&sb, inum);
    }

    /// Find `name` in the directory `parent`. The comparison is exact and `.`/`..` are ordinary
    /// entries.
    pub fn lookup(&self, parent: InodeNumber, name: &str) -> UfsResult<InodeNumber> {
        let sb = self.read_super_block()?;
        let (_, entries) = self.load_directory(&sb, parent)?;

        return match entries.iter().find(|e| e.is_used() && e.name() == name) {
            Some(entry) => Ok(entry.inum()),
            None => Err(UfsError::NotFound),
        };
    }

    /// Read up to `size` bytes from the start of a file or directory. The result is exactly
    /// `min(size, inode size)` bytes long.
    pub fn read(&self, inum: InodeNumber, size: usize) -> UfsResult<Vec<u8>> {
        let sb = self.read_super_block()?;
        let inode = self.load_inode(&sb, inum)?;

        if size > MAX_FILE_SIZE {
            return Err(UfsError::InvalidSize);
        }

        return self.read_content(&sb, &inode, size.min(inode.file_size()));
    }

    /// The entries of a directory in on-disk order, including `.` and `..`.
    pub fn read_dir(&self, inum: InodeNumber) -> UfsResult<Vec<DirEntry>> {
        let sb = self.read_super_block()?;
        let (_, entries) = self.load_directory(&sb, inum)?;

        return Ok(entries.into_iter().filter(|e| e.is_used()).collect());
    }

    /// Create `name` inside `parent`. Creating a name that already exists with the same type
    /// returns the existing inode; with the other type it fails with `InvalidType`.
    pub fn create(
        &mut self,
        parent: InodeNumber,
        file_type: InodeType,
        name: &str,
    ) -> UfsResult<InodeNumber> {
        let sb = self.read_super_block()?;
        let (mut parent_inode, entries) = self.load_directory(&sb, parent)?;

        DirEntry::validate_name(name)?;

        if let Some(existing) = entries.iter().find(|e| e.is_used() && e.name() == name) {
            let inode = self.load_inode(&sb, existing.inum())?;

            if inode.file_type() != file_type {
                return Err(UfsError::InvalidType);
            }

            debug!("[inode #{}] \"{}\" already exists as #{}", parent, name, existing.inum());
            return Ok(existing.inum());
        }

        let original_inode_bitmap = self.read_region(sb.inode_bitmap_addr, sb.inode_bitmap_len)?;
        let original_data_bitmap = self.read_region(sb.data_bitmap_addr, sb.data_bitmap_len)?;
        let mut inode_bitmap = original_inode_bitmap.clone();
        let mut data_bitmap = original_data_bitmap.clone();

        let inum = match first_available(&inode_bitmap, sb.num_inodes as usize) {
            Some(i) => i,
            None => return Err(UfsError::NotEnoughSpace),
        };

        let parent_size = parent_inode.file_size();
        let parent_blocks = parent_inode.block_count();
        let parent_needs_block = parent_size % BLOCK_SIZE == 0;

        if parent_needs_block && parent_blocks >= DIRECT_PTRS {
            return Err(UfsError::NotEnoughSpace);
        }

        let blocks_needed =
            parent_needs_block as usize + (file_type == InodeType::Directory) as usize;
        if count_available(&data_bitmap, sb.num_data as usize) < blocks_needed {
            return Err(UfsError::NotEnoughSpace);
        }

        set_bit(&mut inode_bitmap, inum);
        let inum = inum as InodeNumber;

        let mut changes = Changeset::new();
        let mut inode = Inode::new(file_type);

        if file_type == InodeType::Directory {
            let block = allocate_data_block(&sb, &mut data_bitmap)?;
            let dots = [DirEntry::new(".", inum)?, DirEntry::new("..", parent)?];

            changes.stage(block, encode_entries(&dots, 1));
            inode.set_direct(0, block);
            inode.set_file_size(dots.len() * DirEntry::size());
        }

        let entry = DirEntry::new(name, inum)?;
        if parent_needs_block {
            let block = allocate_data_block(&sb, &mut data_bitmap)?;

            changes.stage(block, encode_entries(&[entry], 1));
            parent_inode.set_direct(parent_blocks, block);
        } else {
            let block = parent_inode.direct(parent_blocks - 1);
            check_data_block(&sb, block)?;

            changes.write_record(&self.disk, block, parent_size % BLOCK_SIZE, &entry)?;
        }

        parent_inode.set_file_size(parent_size + DirEntry::size());

        self.stage_inode(&sb, &mut changes, inum, &inode)?;
        self.stage_inode(&sb, &mut changes, parent, &parent_inode)?;
        changes.stage_region_changes(
            sb.inode_bitmap_addr as u32,
            &original_inode_bitmap,
            &inode_bitmap,
        );
        changes.stage_region_changes(
            sb.data_bitmap_addr as u32,
            &original_data_bitmap,
            &data_bitmap,
        );

        changes.commit(&mut self.disk)?;

        debug!("[inode #{}] created {:?} \"{}\" as #{}", parent, file_type, name, inum);

        return Ok(inum);
    }

    /// Replace the whole content of a regular file, growing or shrinking its block list as
    /// needed. Returns the new size.
    pub fn write(&mut self, inum: InodeNumber, bytes: &[u8]) -> UfsResult<usize> {
        let sb = self.read_super_block()?;
        let mut inode = self.load_inode(&sb, inum)?;

        if bytes.len() > MAX_FILE_SIZE {
            return Err(UfsError::InvalidSize);
        }

        if inode.file_type() != InodeType::RegularFile {
            return Err(UfsError::InvalidType);
        }

        let present = inode.block_count();
        let needed = blocks_for(bytes.len());

        for block in inode.blocks() {
            check_data_block(&sb, *block)?;
        }

        let original_data_bitmap = self.read_region(sb.data_bitmap_addr, sb.data_bitmap_len)?;
        let mut data_bitmap = original_data_bitmap.clone();

        if needed > present
            && count_available(&data_bitmap, sb.num_data as usize) < needed - present
        {
            return Err(UfsError::NotEnoughSpace);
        }

        for index in present..needed {
            let block = allocate_data_block(&sb, &mut data_bitmap)?;
            inode.set_direct(index, block);
        }

        for index in (needed..present).rev() {
            let block = inode.direct(index);
            clear_bit(&mut data_bitmap, data_bit(&sb, block)?);
            inode.set_direct(index, UNUSED_BLOCK);
        }

        let mut changes = Changeset::new();

        for (index, chunk) in bytes.chunks(BLOCK_SIZE).enumerate() {
            changes.stage(inode.direct(index), chunk.to_vec());
        }

        inode.set_file_size(bytes.len());

        self.stage_inode(&sb, &mut changes, inum, &inode)?;
        changes.stage_region_changes(
            sb.data_bitmap_addr as u32,
            &original_data_bitmap,
            &data_bitmap,
        );

        changes.commit(&mut self.disk)?;

        debug!(
            "[inode #{}] wrote {} bytes ({} -> {} blocks)",
            inum,
            bytes.len(),
            present,
            needed
        );

        return Ok(bytes.len());
    }

    /// Remove `name` from `parent` and release its inode and data blocks. Removing a name that
    /// does not exist succeeds without touching the disk.
    pub fn unlink(&mut self, parent: InodeNumber, name: &str) -> UfsResult<()> {
        let sb = self.read_super_block()?;
        let (mut parent_inode, mut entries) = self.load_directory(&sb, parent)?;

        DirEntry::validate_name(name)?;

        if name == "." || name == ".." {
            return Err(UfsError::UnlinkNotAllowed);
        }

        let position = match entries.iter().position(|e| e.is_used() && e.name() == name) {
            Some(p) => p,
            None => {
                debug!("[inode #{}] unlink of missing \"{}\" ignored", parent, name);
                return Ok(());
            }
        };

        let target_inum = entries[position].inum();
        let target = self.load_inode(&sb, target_inum)?;

        if target.is_directory() {
            let (_, children) = self.load_directory(&sb, target_inum)?;

            if children.iter().any(|e| e.is_used() && !e.is_dot_entry()) {
                return Err(UfsError::DirNotEmpty);
            }
        }

        let original_inode_bitmap = self.read_region(sb.inode_bitmap_addr, sb.inode_bitmap_len)?;
        let original_data_bitmap = self.read_region(sb.data_bitmap_addr, sb.data_bitmap_len)?;
        let mut inode_bitmap = original_inode_bitmap.clone();
        let mut data_bitmap = original_data_bitmap.clone();

        clear_bit(&mut inode_bitmap, target_inum as usize);
        for block in target.blocks() {
            clear_bit(&mut data_bitmap, data_bit(&sb, *block)?);
        }

        let old_size = parent_inode.file_size();
        let new_size = old_size - DirEntry::size();
        let old_blocks = parent_inode.block_count();
        let new_blocks = blocks_for(new_size);

        entries.remove(position);

        // Entries from the removed slot onwards shift down by one; rewrite every block from the
        // one holding the removed slot to the new last block.
        let mut changes = Changeset::new();
        let content = encode_entries(&entries, new_blocks);
        let first_dirty = position * DirEntry::size() / BLOCK_SIZE;

        for index in first_dirty..new_blocks {
            let block = parent_inode.direct(index);
            check_data_block(&sb, block)?;

            let start = index * BLOCK_SIZE;
            changes.stage(block, content[start..start + BLOCK_SIZE].to_vec());
        }

        for index in (new_blocks..old_blocks).rev() {
            let block = parent_inode.direct(index);
            clear_bit(&mut data_bitmap, data_bit(&sb, block)?);
            parent_inode.set_direct(index, UNUSED_BLOCK);
        }

        parent_inode.set_file_size(new_size);

        self.stage_inode(&sb, &mut changes, parent, &parent_inode)?;
        changes.stage_region_changes(
            sb.inode_bitmap_addr as u32,
            &original_inode_bitmap,
            &inode_bitmap,
        );
        changes.stage_region_changes(
            sb.data_bitmap_addr as u32,
            &original_data_bitmap,
            &data_bitmap,
        );

        changes.commit(&mut self.disk)?;

        debug!("[inode #{}] unlinked \"{}\" (#{})", parent, name, target_inum);

        return Ok(());
    }

    /// Concatenation of `len` blocks starting at `addr`.
    fn read_region(&self, addr: i32, len: i32) -> UfsResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(len as usize * BLOCK_SIZE);

        for block in addr..addr + len {
            let mut contents = self.disk.read_block(block as u32)?;
            contents.resize(BLOCK_SIZE, 0);
            bytes.extend_from_slice(&contents);
        }

        return Ok(bytes);
    }

    /// An allocated inode. Free slots are rejected even though they decode.
    fn load_inode(&self, sb: &SuperBlock, inum: InodeNumber) -> UfsResult<Inode> {
        let (block_number, offset) = inode_location(sb, inum)?;

        if !self.is_allocated(sb, inum)? {
            debug!("[inode #{}] slot is free", inum);
            return Err(UfsError::InvalidInode);
        }

        let block = self.disk.read_block(block_number)?;

        return match block.get(offset..).and_then(Inode::from_bytes) {
            Some(inode) => Ok(inode),
            None => {
                warn!("[inode #{}] slot does not hold a valid inode", inum);
                Err(UfsError::InvalidInode)
            }
        };
    }

    fn is_allocated(&self, sb: &SuperBlock, inum: InodeNumber) -> UfsResult<bool> {
        let bits_per_block = BLOCK_SIZE * 8;
        let block_number = sb.inode_bitmap_addr as usize + inum as usize / bits_per_block;
        let bit = inum as usize % bits_per_block;

        let block = self.disk.read_block(block_number as u32)?;

        return Ok(bit < block.len() * 8 && get_bit(&block, bit));
    }

    /// A directory inode with every slot within its size, used or not.
    fn load_directory(&self, sb: &SuperBlock, inum: InodeNumber) -> UfsResult<(Inode, Vec<DirEntry>)> {
        let inode = self.load_inode(sb, inum)?;

        if !inode.is_directory() {
            return Err(UfsError::InvalidInode);
        }

        let content = self.read_content(sb, &inode, inode.file_size())?;
        let entries = content
            .chunks_exact(DirEntry::size())
            .filter_map(DirEntry::from_bytes)
            .collect();

        return Ok((inode, entries));
    }

    fn read_content(&self, sb: &SuperBlock, inode: &Inode, length: usize) -> UfsResult<Vec<u8>> {
        let mut content = Vec::with_capacity(length);

        for block in inode.blocks().iter().take(blocks_for(length)) {
            check_data_block(sb, *block)?;

            let bytes = self.disk.read_block(*block)?;
            let remaining = (length - content.len()).min(BLOCK_SIZE).min(bytes.len());
            content.extend_from_slice(&bytes[..remaining]);
        }

        return Ok(content);
    }

    fn stage_inode(
        &self,
        sb: &SuperBlock,
        changes: &mut Changeset,
        inum: InodeNumber,
        inode: &Inode,
    ) -> UfsResult<()> {
        let (block_number, offset) = inode_location(sb, inum)?;
        changes.write_record(&self.disk, block_number, offset, inode)?;

        return Ok(());
    }
}

/// The block holding an inode and the byte offset of the inode inside it.
fn inode_location(sb: &SuperBlock, inum: InodeNumber) -> UfsResult<(u32, usize)> {
    if inum < 0 || inum >= sb.num_inodes {
        return Err(UfsError::InvalidInode);
    }

    let byte_offset = inum as usize * Inode::size();
    let block = sb.inode_region_addr as usize + byte_offset / BLOCK_SIZE;

    return Ok((block as u32, byte_offset % BLOCK_SIZE));
}

/// Data bitmap bit of an absolute data block number.
fn data_bit(sb: &SuperBlock, block: u32) -> UfsResult<usize> {
    check_data_block(sb, block)?;

    return Ok((block - sb.data_region_addr as u32) as usize);
}

fn check_data_block(sb: &SuperBlock, block: u32) -> UfsResult<()> {
    let start = sb.data_region_addr as u32;

    if block < start || block - start >= sb.num_data as u32 {
        warn!("block {} is outside the data region", block);
        return Err(UfsError::InvalidInode);
    }

    return Ok(());
}

fn allocate_data_block(sb: &SuperBlock, data_bitmap: &mut [u8]) -> UfsResult<u32> {
    let bit = match first_available(data_bitmap, sb.num_data as usize) {
        Some(b) => b,
        None => return Err(UfsError::NotEnoughSpace),
    };

    set_bit(data_bitmap, bit);

    return Ok(sb.data_region_addr as u32 + bit as u32);
}

/// Pack entries into `block_count` blocks, filling the remaining slots with unused entries.
fn encode_entries(entries: &[DirEntry], block_count: usize) -> Vec<u8> {
    let unused = DirEntry::unused().to_bytes();
    let mut bytes = Vec::with_capacity(block_count * BLOCK_SIZE);

    for entry in entries {
        bytes.extend_from_slice(&entry.to_bytes());
    }

    while bytes.len() < block_count * BLOCK_SIZE {
        bytes.extend_from_slice(&unused);
    }

    bytes.truncate(block_count * BLOCK_SIZE);

    return bytes;
}
