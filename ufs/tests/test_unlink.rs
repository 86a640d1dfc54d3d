extern crate ufs;
use ufs::{get_bit, InodeType, UfsError, BLOCK_SIZE, ROOT_INODE};

mod common;
use common::*;

#[test]
fn test_unlink_file() {
    let mut fs = new_filesystem();
    let free_data = free_data_blocks(&fs);
    let free = free_inodes(&fs);

    let inum = fs.create(ROOT_INODE, InodeType::RegularFile, "f").unwrap();
    fs.write(inum, &vec![7u8; 2 * BLOCK_SIZE]).unwrap();
    let blocks = fs.stat(inum).unwrap().blocks().to_vec();

    fs.unlink(ROOT_INODE, "f").unwrap();

    assert!(matches!(fs.lookup(ROOT_INODE, "f"), Err(UfsError::NotFound)));
    assert_eq!(fs.stat(ROOT_INODE).unwrap().file_size(), 64);
    assert_eq!(free_data_blocks(&fs), free_data);
    assert_eq!(free_inodes(&fs), free);

    let sb = fs.read_super_block().unwrap();
    let data_bitmap = fs.read_data_bitmap().unwrap();
    for block in blocks {
        assert!(!get_bit(&data_bitmap, (block - sb.data_region_addr as u32) as usize));
    }
    assert!(!get_bit(&fs.read_inode_bitmap().unwrap(), inum as usize));
}

#[test]
fn test_unlink_missing_name_is_a_no_op() {
    let mut fs = new_filesystem();
    fs.create(ROOT_INODE, InodeType::RegularFile, "present").unwrap();

    let before = fs.disk().dump_disk();
    let commits = fs.disk().commits;

    fs.unlink(ROOT_INODE, "absent").unwrap();

    assert_eq!(fs.disk().dump_disk(), before);
    assert_eq!(fs.disk().commits, commits);
}

#[test]
fn test_unlink_not_allowed() {
    let mut fs = new_filesystem();

    assert!(matches!(fs.unlink(ROOT_INODE, "."), Err(UfsError::UnlinkNotAllowed)));
    assert!(matches!(fs.unlink(ROOT_INODE, ".."), Err(UfsError::UnlinkNotAllowed)));
    assert!(matches!(fs.unlink(ROOT_INODE, ""), Err(UfsError::InvalidName)));
    assert!(matches!(fs.unlink(77, "x"), Err(UfsError::InvalidInode)));
}

#[test]
fn test_unlink_directory() {
    let mut fs = new_filesystem();
    let free_data = free_data_blocks(&fs);

    let dir = fs.create(ROOT_INODE, InodeType::Directory, "d").unwrap();
    fs.create(dir, InodeType::RegularFile, "inner").unwrap();

    assert!(matches!(fs.unlink(ROOT_INODE, "d"), Err(UfsError::DirNotEmpty)));
    assert_eq!(fs.lookup(ROOT_INODE, "d").unwrap(), dir);

    fs.unlink(dir, "inner").unwrap();
    fs.unlink(ROOT_INODE, "d").unwrap();

    assert!(matches!(fs.lookup(ROOT_INODE, "d"), Err(UfsError::NotFound)));
    assert_eq!(free_data_blocks(&fs), free_data);
}

#[test]
fn test_unlink_keeps_entry_order() {
    let mut fs = new_filesystem();

    for name in ["a", "b", "c", "d"].iter() {
        fs.create(ROOT_INODE, InodeType::RegularFile, name).unwrap();
    }

    fs.unlink(ROOT_INODE, "b").unwrap();

    let names: Vec<String> = fs
        .read_dir(ROOT_INODE)
        .unwrap()
        .iter()
        .map(|e| e.name().to_string())
        .collect();

    assert_eq!(names, vec![".", "..", "a", "c", "d"]);
}

#[test]
fn test_unlink_frees_parent_trailing_block() {
    let mut fs = new_filesystem_with(256, 32);
    let free_data = free_data_blocks(&fs);

    for i in 0..127 {
        fs.create(ROOT_INODE, InodeType::RegularFile, &format!("f{}", i))
            .unwrap();
    }

    assert_eq!(fs.stat(ROOT_INODE).unwrap().block_count(), 2);
    assert_eq!(free_data_blocks(&fs), free_data - 1);

    // Removing an entry from the first block moves the last entry back into it.
    fs.unlink(ROOT_INODE, "f0").unwrap();

    let root = fs.stat(ROOT_INODE).unwrap();
    assert_eq!(root.file_size(), BLOCK_SIZE);
    assert_eq!(root.block_count(), 1);
    assert_eq!(free_data_blocks(&fs), free_data);

    assert_eq!(fs.lookup(ROOT_INODE, "f126").unwrap(), 127);
    assert_eq!(fs.lookup(ROOT_INODE, "f1").unwrap(), 2);
    assert!(matches!(fs.lookup(ROOT_INODE, "f0"), Err(UfsError::NotFound)));
}

#[test]
fn test_inode_is_reused() {
    let mut fs = new_filesystem();

    let first = fs.create(ROOT_INODE, InodeType::RegularFile, "one").unwrap();
    fs.create(ROOT_INODE, InodeType::RegularFile, "two").unwrap();
    fs.unlink(ROOT_INODE, "one").unwrap();

    let reused = fs.create(ROOT_INODE, InodeType::Directory, "three").unwrap();
    assert_eq!(reused, first);
    assert!(fs.stat(reused).unwrap().is_directory());
}
