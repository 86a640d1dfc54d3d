mod error;
mod handler;
mod logger;

pub use error::{ToolError, ToolResult};
pub use handler::ImageHandler;
pub use logger::{init_logger, level_for_verbosity, StderrLogger};
use byte_unit::Byte;
use log::debug;
use ufs::{DiskHandler, LocalFileSystem};

/// Opens the image at `path` and checks it holds a valid super block.
pub fn open_filesystem(path: &str) -> ToolResult<LocalFileSystem<ImageHandler>> {
    let handler = ImageHandler::open(path)?;
    debug!("opened {} ({} blocks)", path, handler.block_count());

    let fs = LocalFileSystem::new(handler);
    fs.read_super_block()?;

    return Ok(fs);
}

pub fn sized_string_to_u64(string: &str) -> Option<u64> {
    return match Byte::from_str(string) {
        Ok(b) => Some(b.get_bytes() as u64),
        Err(_) => None,
    };
}

pub fn u64_to_sized_string(n: u64) -> String {
    return Byte::from(n).get_appropriate_unit(true).to_string();
}

/// Parses a non-negative integer argument, naming the argument in the error.
pub fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> ToolResult<T> {
    return match value.parse::<T>() {
        Ok(n) => Ok(n),
        Err(_) => Err(ToolError::InvalidArgument(format!(
            "{} must be a number, got \"{}\"",
            name, value
        ))),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_suffix() {
        assert_eq!(sized_string_to_u64("12").unwrap(), 12)
    }

    #[test]
    fn test_kib() {
        assert_eq!(sized_string_to_u64("4KiB").unwrap(), 4096)
    }

    #[test]
    fn test_mib() {
        assert_eq!(sized_string_to_u64("1MiB").unwrap(), 1_048_576)
    }

    #[test]
    fn test_fail() {
        assert!(sized_string_to_u64("123AB").is_none())
    }

    #[test]
    fn test_fail_2() {
        assert!(sized_string_to_u64("MiB").is_none())
    }

    #[test]
    fn test_sized_string() {
        assert!(u64_to_sized_string(4096).ends_with("KiB"));
        assert!(u64_to_sized_string(3 * 1_048_576).ends_with("MiB"));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<i32>("inode", "12").unwrap(), 12);
        assert!(matches!(
            parse_number::<u32>("inodes", "-3"),
            Err(ToolError::InvalidArgument(_))
        ));
    }
}
