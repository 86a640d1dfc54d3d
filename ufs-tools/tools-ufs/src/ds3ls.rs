use clap::{App, Arg};
use std::process::exit;
use ufs::ROOT_INODE;
use ufs_tool_lib::{init_logger, open_filesystem, u64_to_sized_string, ToolResult};

fn main() {
    let arguments = App::new("ds3ls")
        .version("0.1.0")
        .about("This program recursively lists the directories of a ufs image.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the image"),
        )
        .arg(
            Arg::with_name("list")
                .short("l")
                .required(false)
                .takes_value(false)
                .help("List the entries with their sizes."),
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

    let path = match arguments.value_of("image") {
        Some(p) => p,
        None => {
            eprintln!("An image is required.");
            exit(1);
        }
    };

    if let Err(e) = list(path, arguments.is_present("list")) {
        eprintln!("An error occurred: {}", e);
        exit(1);
    }
}

fn list(path: &str, with_sizes: bool) -> ToolResult<()> {
    let fs = open_filesystem(path)?;

    for listing in fs.walk(ROOT_INODE)? {
        println!("Directory {}", listing.path);

        for entry in listing.entries.iter() {
            if with_sizes {
                let size = fs.stat(entry.inum())?.file_size();
                println!(
                    "{}\t{:>10}\t{}",
                    entry.inum(),
                    u64_to_sized_string(size as u64),
                    entry.name()
                );
            } else {
                println!("{}\t{}", entry.inum(), entry.name());
            }
        }

        println!();
    }

    return Ok(());
}
