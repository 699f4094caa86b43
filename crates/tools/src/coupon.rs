//! Coupon tools. At most one coupon is active; applying replaces it.

use async_trait::async_trait;
use serde::Deserialize;
use shopbot_core::error::ToolError;
use shopbot_core::store::StoreApi;
use shopbot_core::tool::{Tool, ToolOutcome};
use std::sync::Arc;
use crate::outcome::{decode, non_blank, report};

pub struct ApplyCouponTool {
    store: Arc<dyn StoreApi>,
}

impl ApplyCouponTool {
    pub fn new(store: Arc<dyn StoreApi>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct Args {
    coupon: String,
}

#[async_trait]
impl Tool for ApplyCouponTool {
    fn name(&self) -> &str {
        "apply_coupon"
    }

    fn description(&self) -> &str {
        "Apply a coupon code to the basket, replacing any coupon already applied. \
         Returns the Discount; 0 means the coupon does not apply to the current basket contents."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "coupon": {
                    "type": "string",
                    "description": "Coupon code"
                }
            },
            "required": ["coupon"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let args: Args = decode(self.name(), arguments)?;
        let code = non_blank(self.name(), "coupon", &args.coupon)?;

        let signature = format!("apply_coupon(coupon={code:?})");
        Ok(report(&signature, self.store.apply_coupon(code).await))
    }
}

pub struct RemoveCouponTool {
    store: Arc<dyn StoreApi>,
}

impl RemoveCouponTool {
    pub fn new(store: Arc<dyn StoreApi>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RemoveCouponTool {
    fn name(&self) -> &str {
        "remove_coupon"
    }

    fn description(&self) -> &str {
        "Remove the coupon currently applied to the basket."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        Ok(report("remove_coupon()", self.store.remove_coupon().await))
    }
}
