use clap::{App, Arg};
use log::info;
use std::process::exit;
use ufs::{LocalFileSystem, SuperBlock};
use ufs_tool_lib::{init_logger, parse_number, u64_to_sized_string, ImageHandler, ToolError, ToolResult};

fn main() {
    let arguments = App::new("ds3mkfs")
        .version("0.1.0")
        .about("This program creates a new, empty ufs image.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the image to create"),
        )
        .arg(
            Arg::with_name("inodes")
                .short("i")
                .long("inodes")
                .takes_value(true)
                .default_value("32")
                .help("The number of inodes"),
        )
        .arg(
            Arg::with_name("data")
                .short("d")
                .long("data")
                .takes_value(true)
                .default_value("32")
                .help("The number of data blocks"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Increase logging verbosity."),
        )
        .get_matches();

    if let Err(e) = init_logger(arguments.occurrences_of("verbose")) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let result = make_image(
        arguments.value_of("image").unwrap_or_default(),
        arguments.value_of("inodes").unwrap_or_default(),
        arguments.value_of("data").unwrap_or_default(),
    );

    if let Err(e) = result {
        eprintln!("Failed to create image: {}", e);
        exit(1);
    }
}

fn make_image(path: &str, inodes: &str, data: &str) -> ToolResult<()> {
    let num_inodes = parse_number::<u32>("inodes", inodes)?;
    let num_data = parse_number::<u32>("data", data)?;

    if num_inodes == 0 || num_data == 0 {
        return Err(ToolError::InvalidArgument(
            "an image needs at least one inode and one data block".to_string(),
        ));
    }

    if num_inodes > i32::MAX as u32 || num_data > i32::MAX as u32 {
        return Err(ToolError::InvalidArgument(format!(
            "counts are limited to {}",
            i32::MAX
        )));
    }

    let layout = SuperBlock::with_capacity(num_inodes, num_data);
    let handler = ImageHandler::create(path, layout.total_blocks())?;
    info!("created {} with {} blocks", path, layout.total_blocks());

    LocalFileSystem::format(handler, num_inodes, num_data)?;

    println!(
        "Created {} ({}): {} inodes, {} data blocks.",
        path,
        u64_to_sized_string(layout.total_blocks() as u64 * ufs::BLOCK_SIZE as u64),
        num_inodes,
        num_data
    );

    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_oversized_counts() {
        let image = std::env::temp_dir().join("ds3mkfs-never-created.img");
        let path = image.to_string_lossy().to_string();

        assert!(matches!(
            make_image(&path, "1", "4294967295"),
            Err(ToolError::InvalidArgument(_))
        ));
        assert!(matches!(
            make_image(&path, "2147483648", "1"),
            Err(ToolError::InvalidArgument(_))
        ));
        assert!(!image.exists());
    }
}
