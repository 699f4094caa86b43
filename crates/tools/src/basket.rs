//! Basket tools: view, add and remove.

use async_trait::async_trait;
use serde::Deserialize;
use shopbot_core::error::ToolError;
use shopbot_core::store::StoreApi;
use shopbot_core::tool::{Tool, ToolOutcome};
use std::sync::Arc;
use crate::outcome::{decode, non_blank, quantity, report};

pub struct ViewBasketTool {
    store: Arc<dyn StoreApi>,
}

impl ViewBasketTool {
    pub fn new(store: Arc<dyn StoreApi>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ViewBasketTool {
    fn name(&self) -> &str {
        "view_basket"
    }

    fn description(&self) -> &str {
        "Show the basket: Items with quantities, the active Coupon if any, Discount and Total."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        Ok(report("view_basket()", self.store.view_basket().await))
    }
}

/// `{sku, quantity}` shared by add and remove.
#[derive(Debug, Deserialize)]
struct LineArgs {
    sku: String,
    quantity: i64,
}

fn line_schema(verb: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "sku": {
                "type": "string",
                "description": "Product SKU from list_products"
            },
            "quantity": {
                "type": "integer",
                "description": format!("Number of packages to {verb}"),
                "minimum": 1
            }
        },
        "required": ["sku", "quantity"]
    })
}

pub struct AddProductTool {
    store: Arc<dyn StoreApi>,
}

impl AddProductTool {
    pub fn new(store: Arc<dyn StoreApi>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for AddProductTool {
    fn name(&self) -> &str {
        "add_product_to_basket"
    }

    fn description(&self) -> &str {
        "Add a quantity of a product to the basket. Adding a SKU that is already present increases its quantity."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        line_schema("add")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let args: LineArgs = decode(self.name(), arguments)?;
        let sku = non_blank(self.name(), "sku", &args.sku)?;
        let qty = quantity(self.name(), args.quantity)?;

        let signature = format!("add_product_to_basket(sku={sku:?}, quantity={qty})");
        Ok(report(&signature, self.store.add_product(sku, qty).await))
    }
}

pub struct RemoveItemTool {
    store: Arc<dyn StoreApi>,
}

impl RemoveItemTool {
    pub fn new(store: Arc<dyn StoreApi>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RemoveItemTool {
    fn name(&self) -> &str {
        "remove_item_from_basket"
    }

    fn description(&self) -> &str {
        "Remove a quantity of a product from the basket. The quantity must not exceed what is in the basket; \
         removing the full quantity drops the line."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        line_schema("remove")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let args: LineArgs = decode(self.name(), arguments)?;
        let sku = non_blank(self.name(), "sku", &args.sku)?;
        let qty = quantity(self.name(), args.quantity)?;

        let signature = format!("remove_item_from_basket(sku={sku:?}, quantity={qty})");
        Ok(report(&signature, self.store.remove_item(sku, qty).await))
    }
}
