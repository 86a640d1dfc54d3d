//! The DS3 adapter: a REST-like view of the file system mounted under `/ds3`.
//!
//! `GET` returns a file's content or a directory listing, `PUT` replaces a file's content
//! (creating any missing directories on the way), `DELETE` unlinks an entry. The adapter is
//! transport agnostic, a server hands it a parsed [`Ds3Request`] and writes back the
//! [`Ds3Response`].

mod status;

pub use status::Status;

use crate::{DiskHandler, InodeNumber, InodeType, LocalFileSystem, UfsError, MAX_FILE_SIZE, ROOT_INODE};
use log::{debug, warn};
use status::{status_for, Phase};

/// Prefix every path served by the adapter must start with.
pub const DS3_PREFIX: &str = "/ds3";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Put,
    Delete,
    Other(String),
}

impl Method {
    pub fn parse(method: &str) -> Self {
        return match method {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            other => Method::Other(other.to_string()),
        };
    }
}

#[derive(Clone, Debug)]
pub struct Ds3Request {
    pub method: Method,
    /// The request target, query string included if the client sent one.
    pub path: String,
    pub body: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ds3Response {
    pub status: Status,
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

impl Ds3Response {
    fn ok(body: Vec<u8>, content_type: &'static str) -> Self {
        return Self {
            status: Status::Ok,
            body,
            content_type,
        };
    }

    fn error(status: Status) -> Self {
        return Self {
            status,
            body: status.reason().as_bytes().to_vec(),
            content_type: "text/plain",
        };
    }
}

type Ds3Result<T> = Result<T, Status>;

pub struct Ds3Service<D: DiskHandler> {
    fs: LocalFileSystem<D>,
}

impl<D: DiskHandler> Ds3Service<D> {
    pub fn new(fs: LocalFileSystem<D>) -> Self {
        return Self { fs };
    }

    pub fn file_system(&self) -> &LocalFileSystem<D> {
        return &self.fs;
    }

    pub fn into_file_system(self) -> LocalFileSystem<D> {
        return self.fs;
    }

    /// Serve one request. Engine failures never escape, they become error responses.
    pub fn handle(&mut self, request: &Ds3Request) -> Ds3Response {
        let segments = match mounted_segments(&request.path) {
            Some(s) => s,
            None => {
                debug!("{} is outside {}", request.path, DS3_PREFIX);
                return Ds3Response::error(Status::NotFound);
            }
        };

        let result = match &request.method {
            Method::Get => self.get(&segments),
            Method::Head => self.get(&segments).map(|mut r| {
                r.body.clear();
                r
            }),
            Method::Put => self.put(&segments, &request.body),
            Method::Delete => self.delete(&segments),
            Method::Other(m) => {
                debug!("unsupported method {}", m);
                Err(Status::NotImplemented)
            }
        };

        return match result {
            Ok(response) => response,
            Err(status) => Ds3Response::error(status),
        };
    }

    fn get(&self, segments: &[&str]) -> Ds3Result<Ds3Response> {
        let inum = self.resolve(segments)?;
        let inode = self.fs.stat(inum).map_err(|e| status_for(&e, Phase::Resolve))?;

        if inode.file_type() == InodeType::RegularFile {
            let content = self
                .fs
                .read(inum, inode.file_size())
                .map_err(|e| status_for(&e, Phase::Resolve))?;
            let name = segments.last().copied().unwrap_or("");

            return Ok(Ds3Response::ok(content, content_type_for(name)));
        }

        let mut entries = self.fs.read_dir(inum).map_err(|e| status_for(&e, Phase::Resolve))?;
        entries.sort_by(|a, b| a.name().cmp(b.name()));

        let mut listing = String::new();
        for entry in entries.iter().filter(|e| !e.is_dot_entry()) {
            let child = self
                .fs
                .stat(entry.inum())
                .map_err(|e| status_for(&e, Phase::Resolve))?;

            listing.push_str(entry.name());
            if child.is_directory() {
                listing.push('/');
            }
            listing.push('\n');
        }

        return Ok(Ds3Response::ok(listing.into_bytes(), "text/plain"));
    }

    /// Intermediate segments become directories, the last one a regular file. Directories
    /// created along the way stay behind if a later step fails.
    fn put(&mut self, segments: &[&str], body: &[u8]) -> Ds3Result<Ds3Response> {
        let (name, parents) = match segments.split_last() {
            Some(s) => s,
            None => return Err(Status::BadRequest),
        };

        if body.len() > MAX_FILE_SIZE {
            debug!("refusing {} byte body for {}", body.len(), name);
            return Err(Status::InsufficientStorage);
        }

        let mut parent = ROOT_INODE;
        for segment in parents {
            parent = self
                .fs
                .create(parent, InodeType::Directory, segment)
                .map_err(|e| status_for(&e, Phase::Create))?;
        }

        let inum = self
            .fs
            .create(parent, InodeType::RegularFile, name)
            .map_err(|e| status_for(&e, Phase::Create))?;

        self.fs
            .write(inum, body)
            .map_err(|e| status_for(&e, Phase::Write))?;

        return Ok(Ds3Response::ok(Vec::new(), "text/plain"));
    }

    fn delete(&mut self, segments: &[&str]) -> Ds3Result<Ds3Response> {
        let (name, parents) = match segments.split_last() {
            Some(s) => s,
            None => return Err(Status::BadRequest),
        };

        let parent = self.resolve(parents)?;

        self.fs.unlink(parent, name).map_err(|e| {
            if let UfsError::DirNotEmpty = e {
                debug!("refusing to delete non-empty directory {}", name);
            }
            status_for(&e, Phase::Unlink)
        })?;

        return Ok(Ds3Response::ok(Vec::new(), "text/plain"));
    }

    fn resolve(&self, segments: &[&str]) -> Ds3Result<InodeNumber> {
        let mut inum = ROOT_INODE;

        for segment in segments {
            inum = match self.fs.lookup(inum, segment) {
                Ok(i) => i,
                Err(e) => {
                    if let UfsError::Disk(_) = e {
                        warn!("lookup of {} failed: {}", segment, e);
                    }
                    return Err(status_for(&e, Phase::Resolve));
                }
            };
        }

        return Ok(inum);
    }
}

/// Path segments below the mount point, or `None` when the path is not under it. Empty segments
/// (doubled or trailing slashes) are dropped and any query string is ignored.
fn mounted_segments(path: &str) -> Option<Vec<&str>> {
    let path = path.split('?').next().unwrap_or("");
    let rest = path.strip_prefix(DS3_PREFIX)?;

    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }

    return Some(rest.split('/').filter(|s| !s.is_empty()).collect());
}

fn content_type_for(name: &str) -> &'static str {
    if name.ends_with(".css") {
        return "text/css";
    }

    if name.ends_with(".js") {
        return "text/javascript";
    }

    return "text/plain";
}
