use clap::{App, Arg};
use std::process::exit;
use ufs_tool_lib::{init_logger, open_filesystem, parse_number, ToolResult};

fn main() {
    let arguments = App::new("ds3unlink")
        .version("0.1.0")
        .about("This program removes an entry from a directory of a ufs image.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the image"),
        )
        .arg(
            Arg::with_name("parent")
                .required(true)
                .takes_value(true)
                .help("The inode number of the parent directory"),
        )
        .arg(
            Arg::with_name("name")
                .required(true)
                .takes_value(true)
                .help("The name of the entry to remove"),
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

    let result = unlink(
        arguments.value_of("image").unwrap_or_default(),
        arguments.value_of("parent").unwrap_or_default(),
        arguments.value_of("name").unwrap_or_default(),
    );

    if let Err(e) = result {
        match e.fs_code() {
            Some(code) => eprintln!("Error while unlinking: {} ({})", e, code),
            None => eprintln!("Error while unlinking: {}", e),
        }
        exit(1);
    }
}

fn unlink(path: &str, parent: &str, name: &str) -> ToolResult<()> {
    let mut fs = open_filesystem(path)?;
    let parent = parse_number::<i32>("parent", parent)?;

    fs.unlink(parent, name)?;

    return Ok(());
}
