use std::{future::Future, io, net::SocketAddr, time::Duration};

use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;
use tracing::Instrument as _;

use crate::{net::Listener, responder};

/// Pause after an accept error that is not about a single connection, such as
/// running out of file descriptors, so the loop does not spin on it.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

pub struct Server {
    listener: Listener,
    header_read_timeout: Duration,
}

impl Server {
    pub fn new(listener: Listener, header_read_timeout: Duration) -> Self {
        Self {
            listener,
            header_read_timeout,
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` resolves, then drops the listener.
    /// Connections already handed to their own task keep running.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(ok) => ok,
                        Err(err) => {
                            handle_accept_error(err).await;
                            continue;
                        }
                    };
                    let span = tracing::debug_span!("connection", peer = %peer);
                    tokio::spawn(serve_connection(stream, self.header_read_timeout).instrument(span));
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutting down");
                    break;
                }
            }
        }
        Ok(())
    }
}

async fn handle_accept_error(err: io::Error) {
    if is_connection_error(&err) {
        tracing::debug!(error = %err, "Connection failed before accept");
        return;
    }
    tracing::warn!(error = %err, "Accept failed");
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}

fn is_connection_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}

async fn serve_connection(stream: TcpStream, header_read_timeout: Duration) {
    tracing::debug!("Accepted connection");

    let result = http1::Builder::new()
        .timer(TokioTimer::new())
        .header_read_timeout(header_read_timeout)
        .serve_connection(TokioIo::new(stream), service_fn(responder::handle))
        .await;

    match result {
        Ok(()) => tracing::debug!("Closed connection"),
        Err(err) => tracing::debug!(error = %err, "Connection ended with error"),
    }
}
