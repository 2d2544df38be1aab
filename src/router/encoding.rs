//! Response body compression.

use std::io::{self, Write};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::http::request::Request;
use crate::http::response::Response;

/// Compresses the response body when the client asked for exactly `gzip`.
///
/// The `Content-Encoding` header is only set once the body has actually been
/// compressed. Empty bodies are left alone.
pub fn negotiate(req: &Request, response: &mut Response) {
    let Some(accepted) = req.header("Accept-Encoding") else {
        return;
    };

    if accepted != "gzip" {
        tracing::warn!(encoding = accepted, "Encoding not supported");
        return;
    }

    if response.body.is_empty() {
        return;
    }

    match gzip(&response.body) {
        Ok(compressed) => {
            response.replace_body(compressed);
            response.set_header("Content-Encoding", "gzip");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Compression failed, sending identity body");
        }
    }
}

pub fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
