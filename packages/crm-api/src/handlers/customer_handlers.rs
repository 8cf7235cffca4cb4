//! Customer CRUD (Create, Read, Update, Delete) handlers.

use hyper::{body::Bytes, Request, Response, StatusCode};

use crate::router::{AppState, RouterError};

use super::request_utils::{
    build_empty_response, json_response, map_store_error_to_router_error, parse_customer_body,
    parse_customer_id, read_request_body_with_timeout,
};

/// Lists all customers.
///
/// # Endpoint
/// `GET /customers`
///
/// # Response
/// - **200 OK**: JSON array of every customer in insertion order
///
/// # Example
/// ```bash
/// curl http://localhost:3000/customers
/// ```
pub async fn list_customers(state: AppState) -> Result<Response<Bytes>, RouterError> {
    let customers = state
        .store
        .list()
        .map_err(map_store_error_to_router_error)?;
    json_response(StatusCode::OK, &customers)
}

/// Reads a single customer.
///
/// # Endpoint
/// `GET /customers/{id}`
///
/// # Response
/// - **200 OK**: The customer as JSON
/// ```json
/// {
///   "id": 1,
///   "name": "John Doe",
///   "role": "Admin",
///   "email": "john@example.com",
///   "phone": "1234567890",
///   "contacted": false
/// }
/// ```
///
/// # Errors
/// - **400 Bad Request**: Non-numeric id
/// - **404 Not Found**: No customer with that id
pub async fn get_customer(raw_id: &str, state: AppState) -> Result<Response<Bytes>, RouterError> {
    let id = parse_customer_id(raw_id)?;
    let (customer, _) = state
        .store
        .find_by_id(id)
        .map_err(map_store_error_to_router_error)?;
    json_response(StatusCode::OK, &customer)
}

/// Creates a new customer.
///
/// # Endpoint
/// `POST /customers`
///
/// # Request Body
/// ```json
/// {
///   "name": "Bob Stone",
///   "role": "User",
///   "email": "bob@example.com",
///   "phone": "5551234567",
///   "contacted": false
/// }
/// ```
///
/// # Response
/// - **201 Created**: JSON array of all customers, including the new one
///
/// # Errors
/// - **400 Bad Request**: Body is not a customer JSON object
/// - **500 Internal Server Error**: Body could not be read
///
/// # Notes
/// - Any `id` in the body is ignored; ids are assigned by the store
/// - Clients rely on getting the whole collection back, not just the new record
///
/// # Example
/// ```bash
/// curl -X POST http://localhost:3000/customers \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Bob Stone", "role": "User"}'
/// ```
pub async fn create_customer<B>(
    req: Request<B>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let body_bytes = read_request_body_with_timeout(req, state.config.request_timeout_ms).await?;
    let customer = parse_customer_body(&body_bytes)?;

    let (created, customers) = state
        .store
        .create_with_snapshot(customer)
        .map_err(map_store_error_to_router_error)?;
    tracing::info!(id = created.id, "Created customer");

    json_response(StatusCode::CREATED, &customers)
}

/// Fully replaces a customer.
///
/// # Endpoint
/// `PUT /customers/{id}`
///
/// # Response
/// - **200 OK**: The updated customer; its id is always the path id
///
/// # Errors
/// - **400 Bad Request**: Non-numeric id or invalid JSON
/// - **404 Not Found**: No customer with that id
/// - **500 Internal Server Error**: Body could not be read
///
/// # Notes
/// - Fields missing from the body are reset to their empty values
pub async fn update_customer<B>(
    req: Request<B>,
    raw_id: &str,
    state: AppState,
) -> Result<Response<Bytes>, RouterError>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let id = parse_customer_id(raw_id)?;

    let body_bytes = read_request_body_with_timeout(req, state.config.request_timeout_ms).await?;
    let customer = parse_customer_body(&body_bytes)?;

    let updated = state
        .store
        .replace(id, customer)
        .map_err(map_store_error_to_router_error)?;
    tracing::info!(id, "Updated customer");

    json_response(StatusCode::OK, &updated)
}

/// Deletes a customer.
///
/// # Endpoint
/// `DELETE /customers/{id}`
///
/// # Response
/// - **204 No Content**: Customer removed
///
/// # Errors
/// - **400 Bad Request**: Non-numeric id
/// - **404 Not Found**: No customer with that id
pub async fn delete_customer(
    raw_id: &str,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let id = parse_customer_id(raw_id)?;
    state
        .store
        .delete(id)
        .map_err(map_store_error_to_router_error)?;
    tracing::info!(id, "Deleted customer");

    build_empty_response(StatusCode::NO_CONTENT)
}
