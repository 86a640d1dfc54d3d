use crate::{ByteSerializable, InodeNumber, UfsError, UfsResult, DIR_ENT_NAME_SIZE};
use byteorder::{ByteOrder, LittleEndian};

/// Inode number stored in directory slots that do not hold an entry.
pub const UNUSED_INODE: InodeNumber = -1;

/// A name to inode binding inside a directory. It is of length 32 bytes: a NUL terminated,
/// NUL padded name at offset 0 and the inode number (`i32`) at offset 28.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    name: String,
    inum: InodeNumber,
}

impl DirEntry {
    /// Fails with `InvalidName` when the name is empty, contains a NUL byte or does not fit the
    /// fixed field together with its terminator.
    pub fn new(name: &str, inum: InodeNumber) -> UfsResult<Self> {
        Self::validate_name(name)?;

        return Ok(Self {
            name: name.to_string(),
            inum,
        });
    }

    /// A placeholder for the unused slots trailing the last entry of a directory block.
    pub fn unused() -> Self {
        return Self {
            name: String::new(),
            inum: UNUSED_INODE,
        };
    }

    pub fn validate_name(name: &str) -> UfsResult<()> {
        if name.is_empty() || name.len() >= DIR_ENT_NAME_SIZE || name.contains('\0') {
            return Err(UfsError::InvalidName);
        }

        return Ok(());
    }

    #[inline]
    pub fn name(&self) -> &str {
        return &self.name;
    }

    #[inline]
    pub fn inum(&self) -> InodeNumber {
        return self.inum;
    }

    #[inline]
    pub fn is_used(&self) -> bool {
        return self.inum != UNUSED_INODE;
    }

    /// `.` and `..` are present in every directory.
    pub fn is_dot_entry(&self) -> bool {
        return self.name == "." || self.name == "..";
    }
}

impl ByteSerializable for DirEntry {
    type BytesArrayType = [u8; 32];

    fn to_bytes(&self) -> Self::BytesArrayType {
        let mut bytes = [0u8; 32];

        let name = self.name.as_bytes();
        let len = name.len().min(DIR_ENT_NAME_SIZE - 1);
        bytes[..len].copy_from_slice(&name[..len]);

        LittleEndian::write_i32(&mut bytes[DIR_ENT_NAME_SIZE..], self.inum);

        return bytes;
    }

    /// The name ends at the first NUL byte (or the end of the field). Names that are not UTF-8 are
    /// decoded lossily.
    fn from_bytes(bytes: &[u8]) -> Option<Self>
    where
        Self: std::marker::Sized,
    {
        if bytes.len() < Self::size() {
            return None;
        }

        let field = &bytes[..DIR_ENT_NAME_SIZE];
        let end = field.iter().position(|b| *b == 0).unwrap_or(DIR_ENT_NAME_SIZE);
        let name = String::from_utf8_lossy(&field[..end]).into_owned();

        let inum = LittleEndian::read_i32(&bytes[DIR_ENT_NAME_SIZE..]);

        return Some(Self { name, inum });
    }

    fn generic_bytes_rep(bytes: &Self::BytesArrayType) -> &[u8] {
        return bytes;
    }

    fn size() -> usize {
        return 32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bytes() {
        let entry = DirEntry::new("a.txt", 0x0203).unwrap();
        let bytes = entry.to_bytes();

        assert_eq!(&bytes[0..6], b"a.txt\0");
        assert!(bytes[5..28].iter().all(|b| *b == 0));
        assert_eq!(&bytes[28..32], &[0x03, 0x02, 0, 0]);

        assert_eq!(DirEntry::from_bytes(&bytes).unwrap(), entry);
    }

    #[test]
    fn test_unused() {
        let bytes = DirEntry::unused().to_bytes();

        assert_eq!(&bytes[28..32], &[0xff; 4]);
        assert!(!DirEntry::from_bytes(&bytes).unwrap().is_used());
    }

    #[test]
    fn test_name_limits() {
        let longest = "x".repeat(DIR_ENT_NAME_SIZE - 1);
        assert!(DirEntry::new(&longest, 1).is_ok());

        let too_long = "x".repeat(DIR_ENT_NAME_SIZE);
        assert!(matches!(DirEntry::new(&too_long, 1), Err(UfsError::InvalidName)));
        assert!(matches!(DirEntry::new("", 1), Err(UfsError::InvalidName)));
        assert!(matches!(DirEntry::new("a\0b", 1), Err(UfsError::InvalidName)));
    }

    #[test]
    fn test_unterminated_name_field() {
        let mut bytes = [b'y'; 32];
        LittleEndian::write_i32(&mut bytes[28..], 4);

        let entry = DirEntry::from_bytes(&bytes).unwrap();
        assert_eq!(entry.name(), "y".repeat(28));
        assert_eq!(entry.inum(), 4);
    }

    #[test]
    fn test_dot_entries() {
        assert!(DirEntry::new(".", 0).unwrap().is_dot_entry());
        assert!(DirEntry::new("..", 0).unwrap().is_dot_entry());
        assert!(!DirEntry::new("...", 0).unwrap().is_dot_entry());
    }
}
