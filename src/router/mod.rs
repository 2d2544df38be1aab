//! Request routing
//!
//! Maps method and path onto a handler and produces exactly one response
//! per request. Unroutable requests are answered with 400, 404 or 405;
//! the only failure that escapes is a filesystem fault, which the
//! connection treats as fatal.
//!
//! | Method | Path              | Handler                         |
//! |--------|-------------------|---------------------------------|
//! | GET    | `/`               | empty 200                       |
//! | GET    | `/echo/<message>` | message as `text/plain`         |
//! | GET    | `/user-agent`     | User-Agent header as text       |
//! | GET    | `/files/<name>`   | file contents                   |
//! | POST   | `/files/<name>`   | create/overwrite file, 201      |

pub mod encoding;
pub mod handlers;

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::files::{DiskStore, FileError, FileStore};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("file handler failed: {0}")]
    Io(#[from] FileError),
}

/// Dispatch table for the server's routes.
///
/// Holds nothing but the optional file store, so one router is shared by
/// every connection.
#[derive(Clone, Default)]
pub struct Router {
    files: Option<Arc<dyn FileStore>>,
}

impl Router {
    /// Creates a router. Without a store every `/files/` route answers 404.
    pub fn new(files: Option<Arc<dyn FileStore>>) -> Self {
        Self { files }
    }

    /// Creates a router serving files from `directory` on disk.
    pub fn with_directory(directory: Option<PathBuf>) -> Self {
        let files = directory.map(|dir| Arc::new(DiskStore::new(dir)) as Arc<dyn FileStore>);
        Self::new(files)
    }

    pub fn serves_files(&self) -> bool {
        self.files.is_some()
    }

    /// Produces the response for `req`.
    pub fn route(&self, req: &Request) -> Result<Response, RouteError> {
        let mut response = match &req.method {
            Method::GET => self.route_get(req)?,
            Method::POST => self.route_post(req)?,
            Method::Other(method) => {
                tracing::warn!(method = %method, path = %req.path, "Unsupported method");
                Response::empty(&req.version, StatusCode::MethodNotAllowed)
            }
        };

        encoding::negotiate(req, &mut response);
        Ok(response)
    }

    fn route_get(&self, req: &Request) -> Result<Response, RouteError> {
        let path = req.path.as_str();

        if path == "/" {
            return Ok(Response::empty(&req.version, StatusCode::Ok));
        }
        if let Some(message) = path.strip_prefix("/echo/") {
            return Ok(handlers::echo(req, message));
        }
        if path.starts_with("/user-agent") {
            return Ok(handlers::user_agent(req));
        }
        if let Some(name) = path.strip_prefix("/files/") {
            return handlers::read_file(self.files.as_deref(), req, name);
        }

        Ok(Response::not_found(&req.version))
    }

    fn route_post(&self, req: &Request) -> Result<Response, RouteError> {
        match req.path.strip_prefix("/files/") {
            Some(name) => handlers::write_file(self.files.as_deref(), req, name),
            None => Ok(Response::empty(&req.version, StatusCode::BadRequest)),
        }
    }
}
