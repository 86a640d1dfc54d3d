use clap::{App, Arg};
use std::convert::TryFrom;
use std::process::exit;
use ufs::InodeType;
use ufs_tool_lib::{init_logger, open_filesystem, parse_number, ToolResult};

fn main() {
    let arguments = App::new("ds3create")
        .version("0.1.0")
        .about("This program creates a file or directory in a ufs image.")
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
            Arg::with_name("type")
                .required(true)
                .takes_value(true)
                .help("0 for a directory, 1 for a regular file"),
        )
        .arg(
            Arg::with_name("name")
                .required(true)
                .takes_value(true)
                .help("The name of the new entry"),
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

    let result = create(
        arguments.value_of("image").unwrap_or_default(),
        arguments.value_of("parent").unwrap_or_default(),
        arguments.value_of("type").unwrap_or_default(),
        arguments.value_of("name").unwrap_or_default(),
    );

    match result {
        Ok(inum) => println!("Created inode {}", inum),
        Err(e) => {
            match e.fs_code() {
                Some(code) => eprintln!("Error while creating: {} ({})", e, code),
                None => eprintln!("Error while creating: {}", e),
            }
            exit(1);
        }
    }
}

fn create(path: &str, parent: &str, file_type: &str, name: &str) -> ToolResult<i32> {
    let mut fs = open_filesystem(path)?;

    let parent = parse_number::<i32>("parent", parent)?;
    let file_type = InodeType::try_from(parse_number::<i32>("type", file_type)?)?;

    return Ok(fs.create(parent, file_type, name)?);
}
