//! Hyper server setup and request handling.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming as IncomingBody};
use hyper::{Request, Response, Result as HyperResult};
use hyper_util::rt::TokioExecutor;
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto::Builder as ConnectionBuilder;
use tokio::net::{TcpListener, TcpStream};

use crate::router::Router;

/// First delay after a failed accept; doubles up to `MAX_ACCEPT_BACKOFF`.
const MIN_ACCEPT_BACKOFF: Duration = Duration::from_millis(5);
const MAX_ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// Source of incoming TCP connections.
trait Acceptor {
    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send;
}

impl Acceptor for TcpListener {
    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        TcpListener::accept(self)
    }
}

/// HTTP server for the customer API.
pub struct Server {
    addr: SocketAddr,
    router: Arc<Router>,
}

impl Server {
    /// Creates a new server instance.
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to
    /// * `router` - Request router
    pub fn new(addr: SocketAddr, router: Router) -> Self {
        Self {
            addr,
            router: Arc::new(router),
        }
    }

    /// Binds the configured address and starts the HTTP server.
    ///
    /// # Returns
    /// `Result<(), std::io::Error>` if the address cannot be bound.
    pub async fn serve(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_listener(listener).await
    }

    /// Serves connections accepted from an already-bound listener.
    ///
    /// Each connection is driven on its own task; a failed connection is
    /// logged and does not stop the accept loop.
    pub async fn serve_listener(self, listener: TcpListener) -> Result<(), std::io::Error> {
        tracing::info!("Server listening on http://{}", listener.local_addr()?);
        self.accept_loop(listener).await;
        Ok(())
    }

    /// Accepts forever. Accept errors (fd exhaustion, aborted handshakes)
    /// are logged and retried with exponential backoff.
    async fn accept_loop<A: Acceptor>(self, acceptor: A) {
        let mut backoff = MIN_ACCEPT_BACKOFF;

        loop {
            let (stream, peer) = match acceptor.accept().await {
                Ok(accepted) => {
                    backoff = MIN_ACCEPT_BACKOFF;
                    accepted
                }
                Err(err) => {
                    tracing::warn!("Accept error: {}; retrying in {:?}", err, backoff);
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_ACCEPT_BACKOFF);
                    continue;
                }
            };

            let io = TokioIo::new(stream);
            let router = Arc::clone(&self.router);

            tokio::task::spawn(async move {
                let builder = ConnectionBuilder::new(TokioExecutor::new());
                if let Err(err) = builder
                    .serve_connection(
                        io,
                        hyper::service::service_fn(move |req| handle_request(req, router.clone())),
                    )
                    .await
                {
                    tracing::warn!("Error serving connection from {}: {}", peer, err);
                }
            });
        }
    }
}

/// Handles an incoming HTTP request.
async fn handle_request(
    req: Request<IncomingBody>,
    router: Arc<Router>,
) -> HyperResult<Response<Full<Bytes>>> {
    let response = match router.route(req).await {
        Ok(response) => response,
        Err(err) => {
            if err.status().is_server_error() {
                tracing::error!("Error handling request: {}", err);
            } else {
                tracing::debug!("Request rejected with {}: {}", err.status(), err);
            }
            Response::from(err)
        }
    };
    Ok(response.map(Full::new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crm_core::config::ServerConfig;
    use crm_core::CustomerStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Listener whose first `failures` accepts fail before delegating.
    struct FlakyListener {
        inner: TcpListener,
        failures: AtomicUsize,
    }

    impl Acceptor for FlakyListener {
        async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(io::Error::new(
                    io::ErrorKind::ConnectionAborted,
                    "simulated accept failure",
                ));
            }
            self.inner.accept().await
        }
    }

    #[tokio::test]
    async fn test_accept_errors_do_not_stop_server() {
        let inner = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = inner.local_addr().unwrap();
        let listener = FlakyListener {
            inner,
            failures: AtomicUsize::new(3),
        };
        let router = Router::new(
            Arc::new(CustomerStore::new()),
            Arc::new(ServerConfig::default()),
        );
        let server = Server::new(addr, router);
        let handle = tokio::spawn(server.accept_loop(listener));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /customers/1 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
            .await
            .unwrap()
            .unwrap();
        let response = String::from_utf8(response).unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"), "{}", response);
        assert!(response.contains("John Doe"));
        assert!(!handle.is_finished());
        handle.abort();
    }
}
