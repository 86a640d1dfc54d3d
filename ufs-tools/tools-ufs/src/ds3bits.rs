use clap::{App, Arg};
use std::process::exit;
use ufs_tool_lib::{init_logger, open_filesystem, ToolResult};

fn main() {
    let arguments = App::new("ds3bits")
        .version("0.1.0")
        .about("This program prints the super block and allocation bitmaps of a ufs image.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the image"),
        )
        .arg(
            Arg::with_name("hex")
                .short("x")
                .long("hex")
                .takes_value(false)
                .help("Print the bitmaps as hex instead of decimal."),
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

    if let Err(e) = print_bits(path, arguments.is_present("hex")) {
        eprintln!("An error occurred: {}", e);
        exit(1);
    }
}

fn print_bits(path: &str, as_hex: bool) -> ToolResult<()> {
    let fs = open_filesystem(path)?;
    let sb = fs.read_super_block()?;

    println!("Super");
    println!("inode_region_addr {}", sb.inode_region_addr);
    println!("data_region_addr {}", sb.data_region_addr);
    println!();

    println!("Inode bitmap");
    println!("{}", format_bitmap(&fs.read_inode_bitmap()?, as_hex));
    println!();

    println!("Data bitmap");
    println!("{}", format_bitmap(&fs.read_data_bitmap()?, as_hex));

    return Ok(());
}

fn format_bitmap(bitmap: &[u8], as_hex: bool) -> String {
    let mut line = String::with_capacity(bitmap.len() * 4);

    for byte in bitmap {
        if as_hex {
            line.push_str(&hex::encode([*byte]));
        } else {
            line.push_str(&byte.to_string());
        }
        line.push(' ');
    }

    return line;
}
