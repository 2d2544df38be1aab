use std::sync::Arc;

use anyhow::Context;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::http::parser::{ParseError, parse_http_request};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::observe::Observer;
use crate::router::Router;

/// Size of each read from the socket.
const READ_CHUNK: usize = 1024;

/// Default cap on a single buffered request (head and body).
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

pub struct Connection<S> {
    stream: S,
    peer: String,
    buffer: BytesMut,
    state: ConnectionState,
    router: Arc<Router>,
    observer: Arc<dyn Observer>,
    max_request_bytes: usize,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, Response, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        stream: S,
        peer: impl Into<String>,
        router: Arc<Router>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            stream,
            peer: peer.into(),
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            router,
            observer,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }

    pub fn with_max_request_bytes(mut self, max: usize) -> Self {
        self.max_request_bytes = max;
        self
    }

    /// Serves requests until the client closes, asks to close, or a fault
    /// makes the connection unusable.
    ///
    /// A clean end of stream returns `Ok`. Malformed requests and I/O faults
    /// return `Err` without any response having been written for them.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await? {
                    Some(req) => ConnectionState::Processing(req),
                    None => ConnectionState::Closed,
                },

                ConnectionState::Processing(req) => {
                    let (response, keep_alive) = self.handle_request(req).await?;

                    let writer = ResponseWriter::new(&response);
                    ConnectionState::Writing(writer, response, keep_alive)
                }

                ConnectionState::Writing(mut writer, response, keep_alive) => {
                    writer
                        .write_to_stream(&mut self.stream)
                        .await
                        .context("failed to send response")?;

                    self.observer.on_response(&self.peer, &response);

                    if keep_alive {
                        ConnectionState::Reading // go back for next request
                    } else {
                        tracing::debug!(client = %self.peer, "Client requested close");
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            };
        }

        Ok(())
    }

    /// Reads until one full request is buffered.
    ///
    /// Returns `None` when the client closes the stream. Bytes left over
    /// after the request are dropped.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.observer.on_request(&self.peer, &request, consumed);
                    self.buffer.clear();
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => {
                    // Malformed request → protocol error
                    return Err(anyhow::Error::new(e).context("failed to parse request"));
                }
            }

            if self.buffer.len() >= self.max_request_bytes {
                anyhow::bail!(
                    "request exceeds {} bytes without completing",
                    self.max_request_bytes
                );
            }

            // Read more data
            self.buffer.reserve(READ_CHUNK);
            let n = self
                .stream
                .read_buf(&mut self.buffer)
                .await
                .context("failed to read request")?;

            if n == 0 {
                if !self.buffer.is_empty() {
                    tracing::warn!(
                        client = %self.peer,
                        buffered = self.buffer.len(),
                        "Client closed mid-request"
                    );
                }
                return Ok(None);
            }
        }
    }

    async fn handle_request(&self, req: Request) -> anyhow::Result<(Response, bool)> {
        let keep_alive = req.keep_alive();
        let router = Arc::clone(&self.router);

        // File handlers block on disk I/O
        let routed = tokio::task::spawn_blocking(move || router.route(&req))
            .await
            .context("request handler panicked")?;

        let mut response = routed.context("request handler failed")?;

        // The last response on a closing connection is always a 200
        if !keep_alive {
            if response.status != StatusCode::Ok {
                response = Response::empty(&response.version, StatusCode::Ok);
            }
            response.set_header("Connection", "close");
        }

        Ok((response, keep_alive))
    }
}
