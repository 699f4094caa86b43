//! Catalog tool: paginated product listing.

use async_trait::async_trait;
use serde::Deserialize;
use shopbot_core::error::ToolError;
use shopbot_core::store::{MAX_PAGE_SIZE, StoreApi};
use shopbot_core::tool::{Tool, ToolOutcome};
use std::sync::Arc;
use crate::outcome::{decode, rejected, report};

pub const DEFAULT_LIMIT: i64 = 10;

pub struct ListProductsTool {
    store: Arc<dyn StoreApi>,
}

impl ListProductsTool {
    pub fn new(store: Arc<dyn StoreApi>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct Args {
    #[serde(default)]
    offset: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
}

#[async_trait]
impl Tool for ListProductsTool {
    fn name(&self) -> &str {
        "list_products"
    }

    fn description(&self) -> &str {
        "List catalog products one page at a time. Returns Products (SKU, Name, Price, PackSize) \
         and NextOffset; NextOffset = -1 means there are no more pages."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "offset": {
                    "type": "integer",
                    "description": "Index of the first product to return (default 0)",
                    "minimum": 0,
                    "default": 0
                },
                "limit": {
                    "type": "integer",
                    "description": "Page size, 1 to 50 (default 10)",
                    "minimum": 1,
                    "maximum": MAX_PAGE_SIZE,
                    "default": DEFAULT_LIMIT
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let args: Args = decode(self.name(), arguments)?;
        let offset = args.offset.unwrap_or(0);
        let limit = args.limit.unwrap_or(DEFAULT_LIMIT);

        let offset = u32::try_from(offset)
            .map_err(|_| rejected(self.name(), format!("offset must be >= 0, got {offset}")))?;
        let limit = u32::try_from(limit)
            .ok()
            .filter(|l| (1..=MAX_PAGE_SIZE).contains(l))
            .ok_or_else(|| {
                rejected(
                    self.name(),
                    format!("limit must be between 1 and {MAX_PAGE_SIZE}, got {limit}"),
                )
            })?;

        let signature = format!("list_products(offset={offset}, limit={limit})");
        Ok(report(&signature, self.store.list_products(offset, limit).await))
    }
}
