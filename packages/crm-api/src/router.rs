//! Matchit routing configuration.

use std::sync::Arc;

use hyper::{body::Bytes, Method, Request, Response, StatusCode};
use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::handlers;
use crm_core::{config::ServerConfig, CustomerStore};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Customer record store
    pub store: Arc<CustomerStore>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a new router with the customer routes.
    ///
    /// # Panics
    /// Only if the fixed route table is itself invalid.
    pub fn new(store: Arc<CustomerStore>, config: Arc<ServerConfig>) -> Self {
        let mut router = MatchitRouter::new();

        router
            .insert("/customers", RouteHandler::Collection)
            .expect("Failed to insert /customers route");
        // Catch-all so "/customers/1/2" reaches the handler and fails id parsing
        router
            .insert("/customers/{*id}", RouteHandler::Item)
            .expect("Failed to insert /customers/{*id} route");

        Self {
            inner: router,
            state: AppState { store, config },
        }
    }

    /// Routes an incoming request to the appropriate handler.
    ///
    /// Paths outside the customer API fall through to static file serving.
    ///
    /// # Arguments
    /// * `req` - HTTP request
    ///
    /// # Returns
    /// `Result<Response<Bytes>, RouterError>` containing the response or an error.
    pub async fn route<B>(&self, req: Request<B>) -> Result<Response<Bytes>, RouterError>
    where
        B: hyper::body::Body,
        B::Error: std::fmt::Display,
    {
        let path = req.uri().path().to_string();
        tracing::debug!(method = %req.method(), path = %path, "routing request");

        // The catch-all never matches an empty segment
        if path == "/customers/" {
            return RouteHandler::Item
                .handle(req, String::new(), self.state.clone())
                .await;
        }

        match self.inner.at(&path) {
            Ok(matched) => {
                let id = matched.params.get("id").map(decode_id).unwrap_or_default();
                matched.value.handle(req, id, self.state.clone()).await
            }
            Err(_) => handlers::serve_static(req, &self.state).await,
        }
    }
}

/// Percent-decodes the raw id segment.
///
/// Undecodable input is passed through untouched and fails id parsing later.
fn decode_id(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Route handler function.
#[derive(Debug)]
enum RouteHandler {
    /// `/customers`
    Collection,
    /// `/customers/{id}`
    Item,
}

impl RouteHandler {
    /// Handles a request with the decoded id segment (empty for `/customers`).
    async fn handle<B>(
        &self,
        req: Request<B>,
        id: String,
        state: AppState,
    ) -> Result<Response<Bytes>, RouterError>
    where
        B: hyper::body::Body,
        B::Error: std::fmt::Display,
    {
        match (self, req.method().clone(), id) {
            (RouteHandler::Collection, Method::GET, _) => handlers::list_customers(state).await,
            (RouteHandler::Collection, Method::POST, _) => {
                handlers::create_customer(req, state).await
            }
            (RouteHandler::Item, Method::GET, id) => handlers::get_customer(&id, state).await,
            (RouteHandler::Item, Method::PUT, id) => {
                handlers::update_customer(req, &id, state).await
            }
            (RouteHandler::Item, Method::DELETE, id) => {
                handlers::delete_customer(&id, state).await
            }
            _ => Err(RouterError::MethodNotAllowed),
        }
    }
}

/// Router error type.
///
/// The display text is the plain-text body sent to the client.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    InternalError(String),
    #[error("Request Timeout")]
    Timeout,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
}

impl RouterError {
    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RouterError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RouterError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RouterError::Timeout => StatusCode::REQUEST_TIMEOUT,
            RouterError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RouterError::Forbidden(_) => StatusCode::FORBIDDEN,
            RouterError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let status = err.status();
        let body = format!("{}\n", err);

        Response::builder()
            .status(status)
            .header("Content-Type", "text/plain; charset=utf-8")
            .header("X-Content-Type-Options", "nosniff")
            .body(Bytes::from(body))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(Bytes::from("Internal Server Error\n"));
                *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = vec![
            (RouterError::MethodNotAllowed, 405),
            (RouterError::InternalError("boom".to_string()), 500),
            (RouterError::Timeout, 408),
            (RouterError::BadRequest("bad".to_string()), 400),
            (RouterError::Forbidden("no".to_string()), 403),
            (RouterError::NotFound("gone".to_string()), 404),
        ];
        for (err, code) in cases {
            assert_eq!(err.status().as_u16(), code, "status for {:?}", err);
        }
    }

    #[test]
    fn test_error_into_plain_text_response() {
        let response: Response<Bytes> =
            RouterError::NotFound("Customer with ID 9 not found".to_string()).into();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            response.body(),
            &Bytes::from("Customer with ID 9 not found\n")
        );
    }

    #[test]
    fn test_route_table_matches_item_paths() {
        let router = Router::new(
            Arc::new(CustomerStore::new()),
            Arc::new(ServerConfig::default()),
        );
        let matched = router.inner.at("/customers/42").unwrap();
        assert_eq!(matched.params.get("id"), Some("42"));

        let nested = router.inner.at("/customers/1/2").unwrap();
        assert_eq!(nested.params.get("id"), Some("1/2"));

        assert!(router.inner.at("/customers").is_ok());
        assert!(router.inner.at("/index.html").is_err());
    }

    #[test]
    fn test_decode_id() {
        assert_eq!(decode_id("42"), "42");
        assert_eq!(decode_id("%31"), "1");
        assert_eq!(decode_id("1%2F2"), "1/2");
        assert_eq!(decode_id("%ff"), "%ff");
    }
}
