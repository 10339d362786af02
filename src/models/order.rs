use std::sync::Arc;

use serde_json::{json, Value};

use crate::constants::{ORDER_BLOB_FRAGMENT, ORDER_BLOB_REPEAT, ORDER_MAX_PRICE};

/// Medium row for the `orders` table
///
/// `user_id` is random and never checked against `users`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub user_id: i32,
    pub price: f64,
    pub raw_data: Arc<Value>,
}

impl OrderRow {
    pub const INSERT_SQL: &'static str =
        "INSERT INTO orders (user_id, price, raw_data) VALUES ($1, $2, $3)";

    /// JSON blob shared by every order row (~2KB)
    pub fn raw_data() -> Arc<Value> {
        Arc::new(json!({ "details": ORDER_BLOB_FRAGMENT.repeat(ORDER_BLOB_REPEAT) }))
    }

    /// Build a row from a drawn user id and a unit-interval price fraction
    pub fn from_draw(raw_data: &Arc<Value>, user_id: u32, unit: f64) -> Self {
        Self {
            user_id: i32::try_from(user_id).unwrap_or(i32::MAX),
            price: unit * ORDER_MAX_PRICE,
            raw_data: Arc::clone(raw_data),
        }
    }
}
