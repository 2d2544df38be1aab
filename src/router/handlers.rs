use crate::files::{FileError, FileStore};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::router::RouteError;

pub fn echo(req: &Request, message: &str) -> Response {
    Response::text(&req.version, message)
}

/// Reflects the User-Agent header, or an empty body when it is absent.
pub fn user_agent(req: &Request) -> Response {
    Response::text(&req.version, req.header("User-Agent").unwrap_or_default())
}

/// Serves the file stored under `name`.
///
/// Missing files and names that would leave the root are a 404; any other
/// failure is returned as an error.
pub fn read_file(
    store: Option<&dyn FileStore>,
    req: &Request,
    name: &str,
) -> Result<Response, RouteError> {
    let Some(store) = store else {
        tracing::warn!(file = name, "File requested but no directory is configured");
        return Ok(Response::not_found(&req.version));
    };

    match store.read(name) {
        Ok(data) => {
            tracing::debug!(file = name, size = data.len(), "Serving file");
            Ok(Response::file(&req.version, data))
        }
        Err(FileError::InvalidName(_)) => {
            tracing::warn!(file = name, "Rejected file name");
            Ok(Response::not_found(&req.version))
        }
        Err(FileError::NotFound(path)) => {
            tracing::warn!(path = %path.display(), "File not found");
            Ok(Response::not_found(&req.version))
        }
        Err(e) => {
            tracing::error!(file = name, error = %e, "Failed to read file");
            Err(e.into())
        }
    }
}

/// Stores exactly `Content-Length` bytes of the body under `name`.
pub fn write_file(
    store: Option<&dyn FileStore>,
    req: &Request,
    name: &str,
) -> Result<Response, RouteError> {
    let Some(store) = store else {
        tracing::warn!(file = name, "File upload but no directory is configured");
        return Ok(Response::not_found(&req.version));
    };

    let Some(content) = req.content_length().and_then(|len| req.body.get(..len)) else {
        tracing::warn!(
            file = name,
            content_length = ?req.header("Content-Length"),
            "Missing or invalid Content-Length"
        );
        return Ok(Response::empty(&req.version, StatusCode::BadRequest));
    };

    match store.write(name, content) {
        Ok(()) => {
            tracing::debug!(file = name, size = content.len(), "File created");
            Ok(Response::empty(&req.version, StatusCode::Created))
        }
        Err(FileError::InvalidName(_)) => {
            tracing::warn!(file = name, "Rejected file name");
            Ok(Response::empty(&req.version, StatusCode::BadRequest))
        }
        Err(e) => {
            tracing::error!(file = name, error = %e, "Failed to write file");
            Err(e.into())
        }
    }
}
