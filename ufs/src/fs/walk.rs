use super::LocalFileSystem;
use crate::{DirEntry, DiskHandler, InodeNumber, UfsResult};
use log::warn;

/// Directories nested deeper than this below the starting point are not listed.
pub const MAX_WALK_DEPTH: usize = 64;

/// One directory visited by [`LocalFileSystem::walk`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Slash separated path relative to the walk's starting point, always ending in `/`.
    pub path: String,
    pub inum: InodeNumber,
    /// Every entry, `.` and `..` included, sorted by name.
    pub entries: Vec<DirEntry>,
}

impl<D: DiskHandler> LocalFileSystem<D> {
    /// Lists `root` and every directory below it, depth first in name order.
    pub fn walk(&self, root: InodeNumber) -> UfsResult<Vec<DirectoryListing>> {
        let mut listings = Vec::new();
        self.walk_directory(root, "/".to_string(), 0, &mut listings)?;

        return Ok(listings);
    }

    fn walk_directory(
        &self,
        inum: InodeNumber,
        path: String,
        depth: usize,
        listings: &mut Vec<DirectoryListing>,
    ) -> UfsResult<()> {
        let mut entries = self.read_dir(inum)?;
        entries.sort_by(|a, b| a.name().cmp(b.name()));

        let children: Vec<DirEntry> = entries
            .iter()
            .filter(|e| !e.is_dot_entry())
            .cloned()
            .collect();

        listings.push(DirectoryListing {
            path: path.clone(),
            inum,
            entries,
        });

        for child in children {
            let is_directory = match self.stat(child.inum()) {
                Ok(inode) => inode.is_directory(),
                Err(e) => {
                    warn!("skipping {}{} (#{}): {}", path, child.name(), child.inum(), e);
                    continue;
                }
            };

            if !is_directory {
                continue;
            }

            let child_path = format!("{}{}/", path, child.name());

            if depth + 1 > MAX_WALK_DEPTH {
                warn!("not descending into {}: deeper than {} levels", child_path, MAX_WALK_DEPTH);
                continue;
            }

            if let Err(e) = self.walk_directory(child.inum(), child_path.clone(), depth + 1, listings) {
                warn!("skipping {}: {}", child_path, e);
            }
        }

        return Ok(());
    }
}
