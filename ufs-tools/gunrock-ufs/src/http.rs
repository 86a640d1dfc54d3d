use std::io::{self, BufRead, Read, Write};
use thiserror::Error;
use ufs::ds3::{Ds3Request, Ds3Response, Method, Status};

/// Longest request or header line accepted.
const MAX_LINE: usize = 8 * 1024;
const MAX_HEADERS: usize = 100;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("connection error: {0}")]
    Io(#[from] io::Error),
    #[error("connection closed before a request was read")]
    Closed,
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error("body of {0} bytes exceeds the limit")]
    BodyTooLarge(u64),
}

impl HttpError {
    /// The status to answer with, if the client is still worth answering.
    pub fn status(&self) -> Option<Status> {
        return match self {
            HttpError::Malformed(_) => Some(Status::BadRequest),
            HttpError::BodyTooLarge(_) => Some(Status::InsufficientStorage),
            HttpError::Io(_) | HttpError::Closed => None,
        };
    }
}

/// Reads one HTTP/1.x request. Only `Content-Length` delimited bodies are supported.
pub fn read_request<R: BufRead>(reader: &mut R, max_body: u64) -> Result<Ds3Request, HttpError> {
    let request_line = match read_line(reader)? {
        Some(line) => line,
        None => return Err(HttpError::Closed),
    };

    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v)) if v.starts_with("HTTP/") => (m.to_string(), t.to_string()),
        _ => return Err(HttpError::Malformed(format!("request line \"{}\"", request_line))),
    };

    let mut content_length: u64 = 0;
    let mut headers = 0;

    loop {
        let line = match read_line(reader)? {
            Some(l) => l,
            None => return Err(HttpError::Malformed("truncated headers".to_string())),
        };

        if line.is_empty() {
            break;
        }

        headers += 1;
        if headers > MAX_HEADERS {
            return Err(HttpError::Malformed("too many headers".to_string()));
        }

        let (name, value) = match line.find(':') {
            Some(i) => (line[..i].trim(), line[i + 1..].trim()),
            None => return Err(HttpError::Malformed(format!("header \"{}\"", line))),
        };

        if name.eq_ignore_ascii_case("content-length") {
            content_length = match value.parse() {
                Ok(n) => n,
                Err(_) => return Err(HttpError::Malformed(format!("content length \"{}\"", value))),
            };
        }
    }

    if content_length > max_body {
        return Err(HttpError::BodyTooLarge(content_length));
    }

    let mut body = vec![0u8; content_length as usize];
    reader.read_exact(&mut body)?;

    return Ok(Ds3Request {
        method: Method::parse(&method),
        path: target,
        body,
    });
}

/// A line without its terminator, or `None` at end of stream.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, HttpError> {
    let mut line = Vec::new();
    let read = reader.by_ref().take(MAX_LINE as u64 + 1).read_until(b'\n', &mut line)?;

    if read == 0 {
        return Ok(None);
    }

    if line.len() > MAX_LINE {
        return Err(HttpError::Malformed("line too long".to_string()));
    }

    while line.last() == Some(&b'\n') || line.last() == Some(&b'\r') {
        line.pop();
    }

    return match String::from_utf8(line) {
        Ok(s) => Ok(Some(s)),
        Err(_) => Err(HttpError::Malformed("line is not UTF-8".to_string())),
    };
}

pub fn write_response<W: Write>(writer: &mut W, response: &Ds3Response) -> io::Result<()> {
    write!(
        writer,
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status.code(),
        response.status.reason(),
        response.content_type,
        response.body.len()
    )?;
    writer.write_all(&response.body)?;
    writer.flush()?;

    return Ok(());
}
