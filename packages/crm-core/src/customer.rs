//! Customer record model and seed data.

use serde::{Deserialize, Serialize};

/// A single customer record.
///
/// Every field defaults when absent from incoming JSON, so a body such as
/// `{"name": "X"}` parses into a customer with empty strings elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    /// Store-assigned identifier
    pub id: i64,
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
    /// Whether the customer has been contacted
    pub contacted: bool,
}

impl Customer {
    /// Creates a customer with the given id and field values.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        role: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        contacted: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            role: role.into(),
            email: email.into(),
            phone: phone.into(),
            contacted,
        }
    }
}

/// Returns the three customers present when the server starts.
pub fn seed_customers() -> Vec<Customer> {
    vec![
        Customer::new(1, "John Doe", "Admin", "john@example.com", "1234567890", false),
        Customer::new(2, "Jane Smith", "User", "jane@example.com", "0987654321", true),
        Customer::new(
            3,
            "Alice Brown",
            "Manager",
            "alice@example.com",
            "1112223333",
            false,
        ),
    ]
}
