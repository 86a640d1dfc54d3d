use clap::{App, Arg, ArgMatches};
use ufs_tool_lib::{parse_number, sized_string_to_u64, ToolError, ToolResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub image: String,
    pub port: u16,
    pub threads: usize,
    pub buffers: usize,
    pub max_body: u64,
    pub verbosity: u64,
}

pub fn app() -> App<'static, 'static> {
    return App::new("gunrock-ufs")
        .version("0.1.0")
        .about("This program serves a ufs image over HTTP under /ds3.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the image"),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .takes_value(true)
                .default_value("8080")
                .help("The port to listen on"),
        )
        .arg(
            Arg::with_name("threads")
                .short("t")
                .long("threads")
                .takes_value(true)
                .default_value("1")
                .help("The number of worker threads"),
        )
        .arg(
            Arg::with_name("buffers")
                .short("b")
                .long("buffers")
                .takes_value(true)
                .default_value("1")
                .help("How many accepted connections may wait for a worker"),
        )
        .arg(
            Arg::with_name("max-body")
                .long("max-body")
                .takes_value(true)
                .default_value("1MiB")
                .help("The largest request body accepted, e.g. 512KiB"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Increase logging verbosity."),
        );
}

impl ServerConfig {
    pub fn from_matches(matches: &ArgMatches) -> ToolResult<Self> {
        let image = match matches.value_of("image") {
            Some(i) => i.to_string(),
            None => return Err(ToolError::InvalidArgument("An image is required.".to_string())),
        };

        let threads = parse_number::<usize>("threads", matches.value_of("threads").unwrap_or("1"))?;
        let buffers = parse_number::<usize>("buffers", matches.value_of("buffers").unwrap_or("1"))?;

        if threads == 0 || buffers == 0 {
            return Err(ToolError::InvalidArgument(
                "threads and buffers must be at least 1".to_string(),
            ));
        }

        let max_body_arg = matches.value_of("max-body").unwrap_or("1MiB");
        let max_body = match sized_string_to_u64(max_body_arg) {
            Some(n) => n,
            None => {
                return Err(ToolError::InvalidArgument(format!(
                    "max-body must be a size, got \"{}\"",
                    max_body_arg
                )))
            }
        };

        return Ok(Self {
            image,
            port: parse_number::<u16>("port", matches.value_of("port").unwrap_or("8080"))?,
            threads,
            buffers,
            max_body,
            verbosity: matches.occurrences_of("verbose"),
        });
    }
}
