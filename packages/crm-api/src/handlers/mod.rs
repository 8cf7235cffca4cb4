//! HTTP endpoint implementations for customer CRUD and static files.

pub mod customer_handlers;
pub mod request_utils;
pub mod static_files;

pub use customer_handlers::{
    create_customer, delete_customer, get_customer, list_customers, update_customer,
};
pub use static_files::serve_static;
