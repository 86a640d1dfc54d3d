use clap::{App, Arg};
use std::io::Write;
use std::process::exit;
use ufs::MAX_FILE_SIZE;
use ufs_tool_lib::{init_logger, open_filesystem, parse_number, ToolResult};

fn main() {
    let arguments = App::new("ds3cat")
        .version("0.1.0")
        .about("This program prints the blocks and contents of an inode in a ufs image.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the image"),
        )
        .arg(
            Arg::with_name("inode")
                .required(true)
                .takes_value(true)
                .help("The inode number to print"),
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

    let path = arguments.value_of("image").unwrap_or_default();
    let inode = arguments.value_of("inode").unwrap_or_default();

    if let Err(e) = cat(path, inode) {
        eprintln!("An error occurred: {}", e);
        exit(1);
    }
}

fn cat(path: &str, inode: &str) -> ToolResult<()> {
    let fs = open_filesystem(path)?;
    let inum = parse_number::<i32>("inode", inode)?;

    let inode = fs.stat(inum)?;
    let contents = fs.read(inum, MAX_FILE_SIZE)?;

    println!("File blocks");
    for block in inode.blocks() {
        println!("{}", block);
    }
    println!();

    println!("File data");
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(&contents)?;
    out.flush()?;

    return Ok(());
}
