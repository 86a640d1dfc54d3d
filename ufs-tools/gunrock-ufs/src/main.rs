mod config;
mod http;
mod pool;

use config::ServerConfig;
use log::{debug, error, info, warn};
use pool::ConnectionQueue;
use std::io::BufReader;
use std::net::{TcpListener, TcpStream};
use std::process::exit;
use std::sync::{Arc, Mutex};
use std::thread;
use ufs::ds3::{Ds3Response, Ds3Service};
use ufs_tool_lib::{init_logger, open_filesystem, ImageHandler, ToolResult};

type SharedService = Arc<Mutex<Ds3Service<ImageHandler>>>;

fn main() {
    let matches = config::app().get_matches();

    let config = match ServerConfig::from_matches(&matches) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    };

    if let Err(e) = init_logger(config.verbosity) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    if let Err(e) = serve(&config) {
        error!("{}", e);
        eprintln!("An error occurred: {}", e);
        exit(1);
    }
}

fn serve(config: &ServerConfig) -> ToolResult<()> {
    let fs = open_filesystem(&config.image)?;
    let service: SharedService = Arc::new(Mutex::new(Ds3Service::new(fs)));
    let queue = Arc::new(ConnectionQueue::new(config.buffers));

    for id in 0..config.threads {
        let service = Arc::clone(&service);
        let queue = Arc::clone(&queue);
        let max_body = config.max_body;

        thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || loop {
                let stream = queue.pop();
                handle_connection(stream, &service, max_body);
            })?;
    }

    let listener = TcpListener::bind(("0.0.0.0", config.port))?;
    info!(
        "serving {} on port {} with {} workers",
        config.image, config.port, config.threads
    );

    for stream in listener.incoming() {
        match stream {
            Ok(s) => {
                queue.push(s);
                debug!("{} of {} queue slots in use", queue.len(), queue.capacity());
            }
            Err(e) => warn!("accept failed: {}", e),
        }
    }

    return Ok(());
}

fn handle_connection(stream: TcpStream, service: &SharedService, max_body: u64) {
    let peer = match stream.peer_addr() {
        Ok(a) => a.to_string(),
        Err(_) => "unknown peer".to_string(),
    };

    let mut reader = BufReader::new(&stream);
    let response = match http::read_request(&mut reader, max_body) {
        Ok(request) => {
            let response = match service.lock() {
                Ok(mut s) => s.handle(&request),
                Err(poisoned) => poisoned.into_inner().handle(&request),
            };

            info!(
                "{} {:?} {} -> {}",
                peer,
                request.method,
                request.path,
                response.status.code()
            );
            response
        }
        Err(e) => match e.status() {
            Some(status) => {
                debug!("{}: {}", peer, e);
                Ds3Response {
                    status,
                    body: status.reason().as_bytes().to_vec(),
                    content_type: "text/plain",
                }
            }
            None => {
                debug!("{}: dropping connection: {}", peer, e);
                return;
            }
        },
    };

    if let Err(e) = http::write_response(&mut &stream, &response) {
        debug!("{}: failed to write response: {}", peer, e);
    }
}
