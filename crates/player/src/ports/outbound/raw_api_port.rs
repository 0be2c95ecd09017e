//! Raw API Port - Object-safe HTTP boundary
//!
//! `RawApiPort` is the object-safe boundary implemented by adapters and stored
//! behind `Arc<dyn ...>`. The application layer provides a typed wrapper
//! (`CombatApi`) on top.

use serde_json::Value;

use super::ApiError;

#[async_trait::async_trait]
pub trait RawApiPort: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError>;

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError>;

    /// POST without a request body, returning the JSON response
    async fn post_empty_with_response_json(&self, path: &str) -> Result<Value, ApiError>;
}
