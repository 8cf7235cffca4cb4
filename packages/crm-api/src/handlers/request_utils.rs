//! Request utilities for HTTP endpoints.

use http_body_util::BodyExt;
use hyper::{body::Bytes, Request, Response, StatusCode};
use serde::Serialize;
use tokio::time;

use crate::router::RouterError;
use crm_core::error::StoreError;
use crm_core::Customer;

/// Helper function to read request body with timeout
pub async fn read_request_body_with_timeout<B>(
    req: Request<B>,
    timeout_ms: u64,
) -> Result<Bytes, RouterError>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let body = time::timeout(timeout_duration, req.into_body().collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| {
            tracing::error!("Failed to read request body: {}", e);
            RouterError::InternalError("Failed to read request body".to_string())
        })?;
    Ok(body.to_bytes())
}

/// Parses the raw `{id}` path segment as a customer id.
pub fn parse_customer_id(raw: &str) -> Result<i64, RouterError> {
    raw.parse().map_err(|e| {
        tracing::debug!("Invalid customer ID '{}': {}", raw, e);
        RouterError::BadRequest("Invalid customer ID".to_string())
    })
}

/// Parses a request body as a customer record.
pub fn parse_customer_body(body: &[u8]) -> Result<Customer, RouterError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Invalid JSON body: {}", e);
        RouterError::BadRequest("Invalid JSON format".to_string())
    })
}

/// Map StoreError to appropriate RouterError
pub fn map_store_error_to_router_error(e: StoreError) -> RouterError {
    match e {
        StoreError::CustomerNotFound { .. } => RouterError::NotFound(e.to_string()),
        StoreError::LockPoisoned => {
            tracing::error!("Customer store unavailable: {}", e);
            RouterError::InternalError(format!("Store error: {}", e))
        }
    }
}

/// Serializes `data` and wraps it in a JSON response with `status`.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    data: &T,
) -> Result<Response<Bytes>, RouterError> {
    let json = serde_json::to_vec(data)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    build_response(status, json)
}

/// Helper to build HTTP response with proper error handling
pub fn build_response(status: StatusCode, json: Vec<u8>) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Bytes::from(json))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Helper to build empty HTTP response (for 204 No Content)
pub fn build_empty_response(status: StatusCode) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .body(Bytes::new())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}
