//! Checkout tool.

use async_trait::async_trait;
use shopbot_core::error::ToolError;
use shopbot_core::store::StoreApi;
use shopbot_core::tool::{Tool, ToolOutcome};
use std::sync::Arc;
use crate::outcome::report;

pub const CHECKOUT_TOOL: &str = "checkout_basket";

pub struct CheckoutTool {
    store: Arc<dyn StoreApi>,
}

impl CheckoutTool {
    pub fn new(store: Arc<dyn StoreApi>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CheckoutTool {
    fn name(&self) -> &str {
        CHECKOUT_TOOL
    }

    fn description(&self) -> &str {
        "Place the order for the current basket with its applied coupon. Fails on an empty basket."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        Ok(report("checkout_basket()", self.store.checkout().await))
    }
}
